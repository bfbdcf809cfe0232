//! Shape decoder.
//!
//! Endpoints answer either with a bare JSON array or with an object that
//! nests the records under one field. Each [`EndpointKind`] names its
//! envelope field and [`decode`] unwraps it before deserializing.

mod models;

pub use models::{
    Journey, JourneySummary, Leg, Line, Location, Movement, Position, Stopover, Trip, TripStop,
};

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;

/// Longest slice of the payload quoted in a decode error.
const EXCERPT_CHARS: usize = 80;

/// Which endpoint a payload came from; selects decoder and column set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    Locations,
    Departures,
    Arrivals,
    Journeys,
    Trip,
    Radar,
}

impl EndpointKind {
    pub const ALL: [EndpointKind; 6] = [
        EndpointKind::Locations,
        EndpointKind::Departures,
        EndpointKind::Arrivals,
        EndpointKind::Journeys,
        EndpointKind::Trip,
        EndpointKind::Radar,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EndpointKind::Locations => "locations",
            EndpointKind::Departures => "departures",
            EndpointKind::Arrivals => "arrivals",
            EndpointKind::Journeys => "journeys",
            EndpointKind::Trip => "trip",
            EndpointKind::Radar => "radar",
        }
    }

    /// Object field holding the records when the payload is not a bare array.
    pub fn envelope(self) -> Option<&'static str> {
        match self {
            EndpointKind::Locations => None,
            EndpointKind::Departures => Some("departures"),
            EndpointKind::Arrivals => Some("arrivals"),
            EndpointKind::Journeys => Some("journeys"),
            EndpointKind::Trip => Some("trip"),
            EndpointKind::Radar => Some("movements"),
        }
    }

    /// Whether a bare top-level array is an acceptable payload.
    fn accepts_array(self) -> bool {
        self != EndpointKind::Trip
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EndpointKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EndpointKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown endpoint kind {s:?}"))
    }
}

/// Decoded records of one response, in payload order.
#[derive(Debug, Clone, PartialEq)]
pub enum Records {
    Locations(Vec<Location>),
    /// Departures or arrivals
    Stopovers(Vec<Stopover>),
    Journeys(Vec<Journey>),
    Trip(Trip),
    Movements(Vec<Movement>),
}

impl Records {
    pub fn len(&self) -> usize {
        match self {
            Records::Locations(v) => v.len(),
            Records::Stopovers(v) => v.len(),
            Records::Journeys(v) => v.len(),
            Records::Trip(trip) => trip.stopovers.len(),
            Records::Movements(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decodes a response body for `kind`.
///
/// A missing or `null` envelope field yields an empty record set.
///
/// # Errors
///
/// Returns [`Error::Decode`] if `bytes` is not valid JSON, the top-level value
/// has the wrong kind, or a record does not match its shape.
pub fn decode(bytes: &[u8], kind: EndpointKind) -> Result<Records, Error> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| decode_error(kind, bytes, e.to_string()))?;
    let payload = unwrap_envelope(kind, value).map_err(|msg| decode_error(kind, bytes, msg))?;

    let records = match kind {
        EndpointKind::Locations => Records::Locations(records(kind, bytes, payload)?),
        EndpointKind::Departures | EndpointKind::Arrivals => {
            Records::Stopovers(records(kind, bytes, payload)?)
        }
        EndpointKind::Journeys => Records::Journeys(records(kind, bytes, payload)?),
        EndpointKind::Trip => Records::Trip(records(kind, bytes, payload)?),
        EndpointKind::Radar => Records::Movements(records(kind, bytes, payload)?),
    };
    tracing::debug!(%kind, count = records.len(), "Decoded records");
    Ok(records)
}

/// Returns the value that holds the records, `None` if the envelope is empty.
fn unwrap_envelope(kind: EndpointKind, value: Value) -> Result<Option<Value>, String> {
    match (value, kind.envelope()) {
        (Value::Array(items), _) if kind.accepts_array() => Ok(Some(Value::Array(items))),
        (Value::Object(mut fields), Some(field)) => {
            Ok(fields.remove(field).filter(|v| !v.is_null()))
        }
        (other, envelope) => {
            let expected = match (kind.accepts_array(), envelope) {
                (true, Some(field)) => format!("an array or an object with a {field:?} field"),
                (true, None) => "an array".to_string(),
                (false, Some(field)) => format!("an object with a {field:?} field"),
                (false, None) => "an object".to_string(),
            };
            Err(format!("expected {expected}, found {}", json_kind(&other)))
        }
    }
}

fn records<T: DeserializeOwned + Default>(
    kind: EndpointKind,
    bytes: &[u8],
    payload: Option<Value>,
) -> Result<T, Error> {
    match payload {
        Some(value) => {
            serde_json::from_value(value).map_err(|e| decode_error(kind, bytes, e.to_string()))
        }
        None => Ok(T::default()),
    }
}

fn decode_error(kind: EndpointKind, bytes: &[u8], message: String) -> Error {
    let text = String::from_utf8_lossy(bytes);
    let excerpt = crate::error::summarize(text.trim(), EXCERPT_CHARS);
    Error::Decode {
        kind,
        message,
        excerpt,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
