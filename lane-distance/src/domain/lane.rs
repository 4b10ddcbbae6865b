//! Lane rows: the unit of work handed to the batch processor.

use serde::{Deserialize, Serialize};

use super::{Resolution, ResolutionMethod};

/// An input lane row.
///
/// `origin` and `destination` are required but kept optional here so that a
/// malformed row can be reported against its position instead of failing the
/// whole batch at deserialization time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneRecord {
    #[serde(default, alias = "Origin")]
    pub origin: Option<String>,

    #[serde(default, alias = "Destination")]
    pub destination: Option<String>,

    #[serde(default, alias = "Origin LOCODE", alias = "origin_locode")]
    pub origin_code: Option<String>,

    #[serde(default, alias = "Destination LOCODE", alias = "destination_locode")]
    pub destination_code: Option<String>,

    #[serde(default, alias = "Shipments")]
    pub shipments: Option<u32>,
}

impl LaneRecord {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
            destination: Some(destination.into()),
            ..Self::default()
        }
    }

    /// Attach UN/LOCODEs for both ends.
    pub fn with_codes(mut self, origin: impl Into<String>, destination: impl Into<String>) -> Self {
        self.origin_code = Some(origin.into());
        self.destination_code = Some(destination.into());
        self
    }

    pub fn with_shipments(mut self, shipments: u32) -> Self {
        self.shipments = Some(shipments);
        self
    }

    /// Names of required fields that are missing or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());

        let mut missing = Vec::new();
        if blank(&self.origin) {
            missing.push("origin");
        }
        if blank(&self.destination) {
            missing.push("destination");
        }
        missing
    }
}

/// A lane row after resolution.
///
/// Each endpoint is either fully resolved or absent. `distance_miles` is
/// only set when both endpoints resolved, and never alongside `error`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedLane {
    pub record: LaneRecord,
    pub origin: Option<Resolution>,
    pub destination: Option<Resolution>,
    pub distance_miles: Option<f64>,
    pub error: Option<String>,
}

impl EnrichedLane {
    /// A row that failed before or during resolution.
    pub fn failed(
        record: LaneRecord,
        origin: Option<Resolution>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            record,
            origin,
            destination: None,
            distance_miles: None,
            error: Some(message.into()),
        }
    }

    /// A fully resolved row.
    pub fn resolved(
        record: LaneRecord,
        origin: Resolution,
        destination: Resolution,
        distance_miles: f64,
    ) -> Self {
        Self {
            record,
            origin: Some(origin),
            destination: Some(destination),
            distance_miles: Some(distance_miles),
            error: None,
        }
    }

    /// True only when both ends came from the UN/LOCODE table.
    pub fn used_code(&self) -> bool {
        let by_code = |e: &Option<Resolution>| {
            e.is_some_and(|e| e.method == ResolutionMethod::Code)
        };
        by_code(&self.origin) && by_code(&self.destination)
    }

    pub fn ambiguous_origin(&self) -> bool {
        self.origin.is_some_and(|e| e.ambiguous)
    }

    pub fn ambiguous_destination(&self) -> bool {
        self.destination.is_some_and(|e| e.ambiguous)
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Split a `"City, Country"` place into its city and country parts.
///
/// Only the first two comma-separated parts are considered; the country is
/// empty when absent.
pub fn split_place(place: &str) -> (&str, &str) {
    let mut parts = place.split(',').map(str::trim);
    let city = parts.next().unwrap_or_default();
    let country = parts.next().unwrap_or_default();
    (city, country)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinates;

    fn endpoint(method: ResolutionMethod, ambiguous: bool) -> Resolution {
        Resolution::new(Coordinates::new(10.0, 20.0).unwrap(), method, ambiguous)
    }

    #[test]
    fn split_place_variants() {
        assert_eq!(split_place("New York, US"), ("New York", "US"));
        assert_eq!(split_place("  Paris ,fr "), ("Paris", "fr"));
        assert_eq!(split_place("Tokyo"), ("Tokyo", ""));
        assert_eq!(split_place("Springfield, IL, US"), ("Springfield", "IL"));
        assert_eq!(split_place(""), ("", ""));
    }

    #[test]
    fn missing_fields_reports_blank_and_absent() {
        assert!(LaneRecord::new("A, US", "B, US").missing_fields().is_empty());

        let record = LaneRecord {
            origin: Some("   ".into()),
            ..LaneRecord::default()
        };
        assert_eq!(record.missing_fields(), vec!["origin", "destination"]);

        let record = LaneRecord {
            origin: Some("Paris, FR".into()),
            ..LaneRecord::default()
        };
        assert_eq!(record.missing_fields(), vec!["destination"]);
    }

    #[test]
    fn deserializes_documented_column_names() {
        let json = r#"{
            "Origin": "New York, US",
            "Destination": "Los Angeles, US",
            "Origin LOCODE": "USNYC",
            "Destination LOCODE": "USLAX",
            "Shipments": 12
        }"#;
        let record: LaneRecord = serde_json::from_str(json).unwrap();
        assert_eq!(
            record,
            LaneRecord::new("New York, US", "Los Angeles, US")
                .with_codes("USNYC", "USLAX")
                .with_shipments(12)
        );
    }

    #[test]
    fn used_code_requires_both_ends() {
        let record = LaneRecord::new("A", "B");
        let lane = EnrichedLane::resolved(
            record.clone(),
            endpoint(ResolutionMethod::Code, false),
            endpoint(ResolutionMethod::Code, false),
            0.0,
        );
        assert!(lane.used_code());

        let lane = EnrichedLane::resolved(
            record,
            endpoint(ResolutionMethod::Code, false),
            endpoint(ResolutionMethod::Cache, false),
            0.0,
        );
        assert!(!lane.used_code());
    }

    #[test]
    fn failed_lane_has_no_distance() {
        let lane = EnrichedLane::failed(
            LaneRecord::new("A", "B"),
            Some(endpoint(ResolutionMethod::Geocoder, true)),
            "destination: not found",
        );
        assert!(!lane.is_ok());
        assert!(lane.distance_miles.is_none());
        assert!(lane.ambiguous_origin());
        assert!(!lane.ambiguous_destination());
        assert!(!lane.used_code());
    }
}
