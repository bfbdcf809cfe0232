//! Record shapes as the API returns them.
//!
//! Every leaf field is optional; a JSON `null` and a missing key both decode
//! to `None` (or an empty list / `false` for collections and flags).

use serde::{Deserialize, Deserializer};

/// Treats `null` like a missing key for fields with a natural default.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A pair of coordinates, either of which may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Position {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A station, stop, address or point of interest.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Location {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Distance from the query point in meters
    pub distance: Option<u64>,
    /// Stops nest their coordinates here instead of at the top level
    pub location: Option<Position>,
}

impl Location {
    /// Coordinates, preferring top-level fields over the nested `location`.
    pub fn position(&self) -> Position {
        let nested = self.location.unwrap_or_default();
        Position {
            latitude: self.latitude.or(nested.latitude),
            longitude: self.longitude.or(nested.longitude),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Line {
    pub name: Option<String>,
}

/// One departure or arrival event at a stop.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stopover {
    pub when: Option<String>,
    pub planned_when: Option<String>,
    /// Seconds; negative when early
    pub delay: Option<i64>,
    pub platform: Option<String>,
    pub planned_platform: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub cancelled: bool,
    pub direction: Option<String>,
    pub line: Option<Line>,
    pub stop: Option<Location>,
}

impl Stopover {
    pub fn line_name(&self) -> Option<&str> {
        self.line.as_ref()?.name.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    pub origin: Option<Location>,
    pub destination: Option<Location>,
    pub departure: Option<String>,
    pub planned_departure: Option<String>,
    pub arrival: Option<String>,
    pub planned_arrival: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub walking: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Journey {
    #[serde(default, deserialize_with = "nullable")]
    pub legs: Vec<Leg>,
    pub transfers: Option<u64>,
}

/// A journey reduced to its end points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JourneySummary<'a> {
    /// First leg: origin and departure
    pub first: &'a Leg,
    /// Last leg: destination and arrival
    pub last: &'a Leg,
    pub transfers: u64,
}

impl Journey {
    /// `None` for a journey without legs.
    pub fn summary(&self) -> Option<JourneySummary<'_>> {
        Some(JourneySummary {
            first: self.legs.first()?,
            last: self.legs.last()?,
            transfers: self.transfer_count(),
        })
    }

    /// The reported transfer count, else one less than the number of
    /// non-walking legs.
    pub fn transfer_count(&self) -> u64 {
        self.transfers.unwrap_or_else(|| {
            let rides = self.legs.iter().filter(|leg| !leg.walking).count() as u64;
            rides.saturating_sub(1)
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripStop {
    pub stop: Option<Location>,
    pub arrival: Option<String>,
    pub planned_arrival: Option<String>,
    pub departure: Option<String>,
    pub planned_departure: Option<String>,
    pub platform: Option<String>,
    pub planned_platform: Option<String>,
}

/// A single vehicle run with its ordered stops.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Trip {
    pub line: Option<Line>,
    #[serde(default, deserialize_with = "nullable")]
    pub stopovers: Vec<TripStop>,
}

impl Trip {
    pub fn line_name(&self) -> Option<&str> {
        self.line.as_ref()?.name.as_deref()
    }
}

/// A vehicle currently moving inside the queried bounding box.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Movement {
    pub line: Option<Line>,
    pub direction: Option<String>,
    pub location: Option<Position>,
}

impl Movement {
    pub fn line_name(&self) -> Option<&str> {
        self.line.as_ref()?.name.as_deref()
    }

    pub fn position(&self) -> Position {
        self.location.unwrap_or_default()
    }
}
