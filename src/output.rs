//! Output formatting for decoded records and raw payloads.
//!
//! Tables are tab-separated, one newline-terminated line per record, with a
//! column set fixed per endpoint kind.

use std::io::{self, Write};

use crate::decode::{EndpointKind, Records};
use crate::fallback::{
    MISSING, location_label, pick_string, pick_time, render_delay, render_float, render_int,
    render_text,
};

/// Printed instead of a table when a headed table would have no rows.
pub const NO_RESULTS: &str = "no results";

const LOCATION_COLUMNS: &[&str] = &["id", "name", "type", "latitude", "longitude", "distance_m"];
const STOPOVER_COLUMNS: &[&str] = &["time", "line", "direction", "platform", "delay", "status"];
const JOURNEY_COLUMNS: &[&str] = &["departure", "origin", "arrival", "destination", "transfers"];
const TRIP_COLUMNS: &[&str] = &["line", "stop", "arrival", "departure", "platform"];
const RADAR_COLUMNS: &[&str] = &["line", "direction", "latitude", "longitude"];

/// Column names for `kind`, in output order.
pub fn columns(kind: EndpointKind) -> &'static [&'static str] {
    match kind {
        EndpointKind::Locations => LOCATION_COLUMNS,
        EndpointKind::Departures | EndpointKind::Arrivals => STOPOVER_COLUMNS,
        EndpointKind::Journeys => JOURNEY_COLUMNS,
        EndpointKind::Trip => TRIP_COLUMNS,
        EndpointKind::Radar => RADAR_COLUMNS,
    }
}

fn header(records: &Records) -> &'static [&'static str] {
    match records {
        Records::Locations(_) => LOCATION_COLUMNS,
        Records::Stopovers(_) => STOPOVER_COLUMNS,
        Records::Journeys(_) => JOURNEY_COLUMNS,
        Records::Trip(_) => TRIP_COLUMNS,
        Records::Movements(_) => RADAR_COLUMNS,
    }
}

/// Renders `records` as a tab-separated table.
///
/// An empty record set renders as `no results` with a header requested and
/// as the empty string without. Journeys without legs produce no line.
pub fn render(records: &Records, include_header: bool) -> String {
    if records.is_empty() {
        return if include_header {
            format!("{NO_RESULTS}\n")
        } else {
            String::new()
        };
    }

    let mut out = String::new();
    if include_header {
        push_row(&mut out, header(records));
    }

    match records {
        Records::Locations(locations) => {
            for loc in locations {
                let position = loc.position();
                push_row(
                    &mut out,
                    &[
                        render_text(loc.id.as_deref()),
                        render_text(loc.name.as_deref()),
                        render_text(loc.kind.as_deref()),
                        render_float(position.latitude),
                        render_float(position.longitude),
                        render_int(loc.distance),
                    ],
                );
            }
        }
        Records::Stopovers(stopovers) => {
            for s in stopovers {
                let status = if s.cancelled { "cancelled" } else { MISSING };
                push_row(
                    &mut out,
                    &[
                        pick_time(s.when.as_deref(), s.planned_when.as_deref()),
                        render_text(s.line_name()),
                        render_text(s.direction.as_deref()),
                        pick_string(s.platform.as_deref(), s.planned_platform.as_deref()),
                        render_delay(s.delay),
                        status.to_string(),
                    ],
                );
            }
        }
        Records::Journeys(journeys) => {
            for summary in journeys.iter().filter_map(|j| j.summary()) {
                let (first, last) = (summary.first, summary.last);
                push_row(
                    &mut out,
                    &[
                        pick_time(first.departure.as_deref(), first.planned_departure.as_deref()),
                        location_label(first.origin.as_ref()),
                        pick_time(last.arrival.as_deref(), last.planned_arrival.as_deref()),
                        location_label(last.destination.as_ref()),
                        summary.transfers.to_string(),
                    ],
                );
            }
        }
        Records::Trip(trip) => {
            let line = render_text(trip.line_name());
            for stop in &trip.stopovers {
                push_row(
                    &mut out,
                    &[
                        line.clone(),
                        location_label(stop.stop.as_ref()),
                        pick_time(stop.arrival.as_deref(), stop.planned_arrival.as_deref()),
                        pick_time(stop.departure.as_deref(), stop.planned_departure.as_deref()),
                        pick_string(stop.platform.as_deref(), stop.planned_platform.as_deref()),
                    ],
                );
            }
        }
        Records::Movements(movements) => {
            for m in movements {
                let position = m.position();
                push_row(
                    &mut out,
                    &[
                        render_text(m.line_name()),
                        render_text(m.direction.as_deref()),
                        render_float(position.latitude),
                        render_float(position.longitude),
                    ],
                );
            }
        }
    }
    out
}

/// Appends one line; separators inside a cell become spaces.
fn push_row<S: AsRef<str>>(out: &mut String, cells: &[S]) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push('\t');
        }
        out.extend(
            cell.as_ref()
                .chars()
                .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c }),
        );
    }
    out.push('\n');
}

/// Writes a payload verbatim, newline-terminated.
pub fn write_raw<W: Write>(out: &mut W, data: &[u8]) -> io::Result<()> {
    out.write_all(data)?;
    if data.last() != Some(&b'\n') {
        out.write_all(b"\n")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;

    fn table(kind: EndpointKind, body: &str, include_header: bool) -> String {
        render(&decode(body.as_bytes(), kind).unwrap(), include_header)
    }

    #[test]
    fn test_locations_table() {
        let body = r#"[{"id":"123","name":"Berlin Hbf","type":"station","latitude":52.525,"longitude":13.369,"distance":120}]"#;
        assert_eq!(
            table(EndpointKind::Locations, body, true),
            "id\tname\ttype\tlatitude\tlongitude\tdistance_m\n\
             123\tBerlin Hbf\tstation\t52.525000\t13.369000\t120\n"
        );
        assert_eq!(
            table(EndpointKind::Locations, body, false),
            "123\tBerlin Hbf\tstation\t52.525000\t13.369000\t120\n"
        );
    }

    #[test]
    fn test_missing_fields_render_dashes() {
        assert_eq!(
            table(EndpointKind::Locations, r#"[{"id":"9"}]"#, false),
            "9\t-\t-\t-\t-\t-\n"
        );
    }

    #[test]
    fn test_empty_records() {
        let empty = Records::Locations(Vec::new());
        assert_eq!(render(&empty, true), "no results\n");
        assert_eq!(render(&empty, false), "");
        assert_eq!(table(EndpointKind::Trip, r#"{"trip":{"stopovers":[]}}"#, true), "no results\n");
    }

    #[test]
    fn test_stopovers_table() {
        let body = r#"{"departures":[
            {"when":"10:02","plannedWhen":"10:00","delay":120,"platform":"7","plannedPlatform":"6",
             "line":{"name":"ICE 1000"},"direction":"Hamburg Hbf"},
            {"plannedWhen":"10:05","plannedPlatform":"3","delay":-90,"cancelled":true,
             "line":{"name":"RE 1"},"direction":"Magdeburg"},
            {"delay":0}
        ]}"#;
        assert_eq!(
            table(EndpointKind::Departures, body, true),
            "time\tline\tdirection\tplatform\tdelay\tstatus\n\
             10:02\tICE 1000\tHamburg Hbf\t7\t+2m\t-\n\
             10:05\tRE 1\tMagdeburg\t3\t-90s\tcancelled\n\
             -\t-\t-\t-\t0m\t-\n"
        );
    }

    #[test]
    fn test_journeys_without_legs_are_skipped() {
        let body = r#"{"journeys":[
            {"legs":[{"origin":{"id":"1","name":"Berlin Hbf"},"departure":"08:00",
                      "destination":{"id":"2","name":"Hannover Hbf"}},
                     {"origin":{"id":"2"},"destination":{"id":"3","name":""},
                      "plannedArrival":"10:30"}],
             "transfers":1},
            {"legs":[],"transfers":0},
            {"legs":[{"origin":{"name":"A"},"destination":{"name":"B"},
                      "plannedDeparture":"11:00","arrival":"12:00"}]}
        ]}"#;
        assert_eq!(
            table(EndpointKind::Journeys, body, false),
            "08:00\tBerlin Hbf\t10:30\t3\t1\n\
             11:00\tA\t12:00\tB\t0\n"
        );
    }

    #[test]
    fn test_only_empty_journeys_leave_header() {
        let body = r#"{"journeys":[{"legs":[]}]}"#;
        assert_eq!(
            table(EndpointKind::Journeys, body, true),
            "departure\torigin\tarrival\tdestination\ttransfers\n"
        );
    }

    #[test]
    fn test_trip_table() {
        let body = r#"{"trip":{"line":{"name":"S5"},"stopovers":[
            {"stop":{"id":"1","name":"Alexanderplatz"},"plannedDeparture":"10:00","platform":"2"},
            {"stop":{"id":"2"},"arrival":"10:05","plannedArrival":"10:04","plannedPlatform":"1"},
            {}
        ]}}"#;
        assert_eq!(
            table(EndpointKind::Trip, body, true),
            "line\tstop\tarrival\tdeparture\tplatform\n\
             S5\tAlexanderplatz\t-\t10:00\t2\n\
             S5\t2\t10:05\t-\t1\n\
             S5\t-\t-\t-\t-\n"
        );
    }

    #[test]
    fn test_radar_table() {
        let body = r#"{"movements":[
            {"line":{"name":"U2"},"direction":"Pankow","location":{"latitude":52.5,"longitude":13.4}},
            {"line":null,"direction":null,"location":null}
        ]}"#;
        assert_eq!(
            table(EndpointKind::Radar, body, false),
            "U2\tPankow\t52.500000\t13.400000\n-\t-\t-\t-\n"
        );
    }

    #[test]
    fn test_cells_never_split_columns() {
        let body = r#"[{"id":"1","name":"Tab\there\nnewline","type":"stop"}]"#;
        let out = table(EndpointKind::Locations, body, false);
        assert_eq!(out, "1\tTab here newline\tstop\t-\t-\t-\n");
    }

    #[test]
    fn test_columns_per_kind() {
        assert_eq!(columns(EndpointKind::Departures), columns(EndpointKind::Arrivals));
        assert_eq!(columns(EndpointKind::Radar).len(), 4);
        for kind in EndpointKind::ALL {
            assert!(!columns(kind).is_empty());
        }
    }

    #[test]
    fn test_write_raw_appends_newline_once() {
        let mut buf = Vec::new();
        write_raw(&mut buf, br#"{"a":1}"#).unwrap();
        assert_eq!(buf, b"{\"a\":1}\n");

        let mut buf = Vec::new();
        write_raw(&mut buf, b"[]\n").unwrap();
        assert_eq!(buf, b"[]\n");

        let mut buf = Vec::new();
        write_raw(&mut buf, b"").unwrap();
        assert_eq!(buf, b"\n");
    }
}
