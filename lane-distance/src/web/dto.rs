//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::batch::{BatchOutput, BatchSummary};
use crate::distance::round_miles;
use crate::domain::{EnrichedLane, LaneRecord, Resolution, ResolutionMethod};

/// Request to enrich a batch of lanes.
#[derive(Debug, Deserialize)]
pub struct LanesRequest {
    pub lanes: Vec<LaneRecord>,
}

/// An enriched lane, using the spreadsheet column names lane files carry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneRow {
    #[serde(rename = "Origin")]
    pub origin: Option<String>,

    #[serde(rename = "Destination")]
    pub destination: Option<String>,

    #[serde(rename = "Origin LOCODE")]
    pub origin_code: Option<String>,

    #[serde(rename = "Destination LOCODE")]
    pub destination_code: Option<String>,

    #[serde(rename = "Shipments", skip_serializing_if = "Option::is_none")]
    pub shipments: Option<u32>,

    #[serde(rename = "Origin latitude")]
    pub origin_latitude: Option<f64>,

    #[serde(rename = "Origin longitude")]
    pub origin_longitude: Option<f64>,

    #[serde(rename = "Destination latitude")]
    pub destination_latitude: Option<f64>,

    #[serde(rename = "Destination longitude")]
    pub destination_longitude: Option<f64>,

    /// Great-circle distance, rounded to 2 decimals
    #[serde(rename = "Distance_miles")]
    pub distance_miles: Option<f64>,

    #[serde(rename = "Used UNLOCODEs")]
    pub used_codes: bool,

    #[serde(rename = "Ambiguous Origin")]
    pub ambiguous_origin: bool,

    #[serde(rename = "Ambiguous Destination")]
    pub ambiguous_destination: bool,

    #[serde(rename = "Origin method")]
    pub origin_method: Option<ResolutionMethod>,

    #[serde(rename = "Destination method")]
    pub destination_method: Option<ResolutionMethod>,

    /// Empty when the row resolved
    #[serde(rename = "Error_msg")]
    pub error: String,
}

impl LaneRow {
    pub fn from_lane(lane: &EnrichedLane) -> Self {
        let lat = |r: &Option<Resolution>| r.map(|r| r.coordinates.latitude());
        let lon = |r: &Option<Resolution>| r.map(|r| r.coordinates.longitude());

        Self {
            origin: lane.record.origin.clone(),
            destination: lane.record.destination.clone(),
            origin_code: lane.record.origin_code.clone(),
            destination_code: lane.record.destination_code.clone(),
            shipments: lane.record.shipments,
            origin_latitude: lat(&lane.origin),
            origin_longitude: lon(&lane.origin),
            destination_latitude: lat(&lane.destination),
            destination_longitude: lon(&lane.destination),
            distance_miles: lane.distance_miles.map(round_miles),
            used_codes: lane.used_code(),
            ambiguous_origin: lane.ambiguous_origin(),
            ambiguous_destination: lane.ambiguous_destination(),
            origin_method: lane.origin.map(|r| r.method),
            destination_method: lane.destination.map(|r| r.method),
            error: lane.error.clone().unwrap_or_default(),
        }
    }
}

/// Response to a batch request.
#[derive(Debug, Serialize)]
pub struct LanesResponse {
    pub lanes: Vec<LaneRow>,
    pub summary: BatchSummary,
}

impl LanesResponse {
    pub fn from_output(output: &BatchOutput) -> Self {
        Self {
            lanes: output.lanes.iter().map(LaneRow::from_lane).collect(),
            summary: output.summary.clone(),
        }
    }
}

/// Query for resolving a single place.
///
/// Without `country`, `name` may be a `"City, CC"` string.
#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    #[serde(default)]
    pub name: String,
    pub country: Option<String>,
    pub code: Option<String>,
}

/// A single resolved place.
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub method: ResolutionMethod,
    pub ambiguous: bool,
}

impl From<Resolution> for ResolveResponse {
    fn from(r: Resolution) -> Self {
        Self {
            latitude: r.coordinates.latitude(),
            longitude: r.coordinates.longitude(),
            method: r.method,
            ambiguous: r.ambiguous,
        }
    }
}

/// Query for a code-to-code distance.
#[derive(Debug, Deserialize)]
pub struct DistanceQuery {
    pub from: String,
    pub to: String,
}

/// Distance between two table entries.
#[derive(Debug, Serialize)]
pub struct DistanceResponse {
    pub from: String,
    pub to: String,
    pub distance_miles: f64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinates;

    fn resolution(lat: f64, lon: f64, method: ResolutionMethod, ambiguous: bool) -> Resolution {
        Resolution::new(Coordinates::new(lat, lon).unwrap(), method, ambiguous)
    }

    #[test]
    fn resolved_row() {
        let lane = EnrichedLane::resolved(
            LaneRecord::new("New York, US", "Los Angeles, US")
                .with_codes("USNYC", "USLAX")
                .with_shipments(12),
            resolution(40.7, -74.0, ResolutionMethod::Code, false),
            resolution(34.05, -118.25, ResolutionMethod::Code, false),
            2446.3512,
        );
        let row = LaneRow::from_lane(&lane);

        assert_eq!(row.distance_miles, Some(2446.35));
        assert!(row.used_codes);
        assert_eq!(row.origin_latitude, Some(40.7));
        assert_eq!(row.destination_longitude, Some(-118.25));
        assert_eq!(row.origin_method, Some(ResolutionMethod::Code));
        assert_eq!(row.shipments, Some(12));
        assert!(row.error.is_empty());
    }

    #[test]
    fn failed_row() {
        let lane = EnrichedLane::failed(
            LaneRecord::new("Paris, FR", "Atlantis, ZZ"),
            Some(resolution(48.78, 2.33, ResolutionMethod::Geocoder, true)),
            "destination: no match found for 'ATLANTIS, ZZ'",
        );
        let row = LaneRow::from_lane(&lane);

        assert_eq!(row.distance_miles, None);
        assert_eq!(row.origin_latitude, Some(48.78));
        assert_eq!(row.destination_latitude, None);
        assert_eq!(row.destination_method, None);
        assert!(row.ambiguous_origin);
        assert!(!row.used_codes);
        assert_eq!(row.error, "destination: no match found for 'ATLANTIS, ZZ'");
    }

    #[test]
    fn row_uses_column_names() {
        let lane = EnrichedLane::failed(LaneRecord::default(), None, "missing origin, destination");
        let json = serde_json::to_value(LaneRow::from_lane(&lane)).unwrap();

        for column in [
            "Origin",
            "Destination",
            "Origin LOCODE",
            "Destination LOCODE",
            "Origin latitude",
            "Origin longitude",
            "Destination latitude",
            "Destination longitude",
            "Distance_miles",
            "Used UNLOCODEs",
            "Ambiguous Origin",
            "Ambiguous Destination",
            "Error_msg",
        ] {
            assert!(json.get(column).is_some(), "missing column {column}");
        }
        assert!(json.get("Shipments").is_none());
        assert_eq!(json["Error_msg"], "missing origin, destination");
    }

    #[test]
    fn lanes_request_accepts_column_names() {
        let json = r#"{"lanes": [
            {"Origin": "Tokyo, JP", "Destination": "Seoul, KR", "Origin LOCODE": "JPTYO"},
            {"origin": "Lyon, FR", "destination": "Paris, FR", "shipments": 3}
        ]}"#;
        let req: LanesRequest = serde_json::from_str(json).unwrap();

        assert_eq!(req.lanes.len(), 2);
        assert_eq!(req.lanes[0].origin_code.as_deref(), Some("JPTYO"));
        assert_eq!(req.lanes[0].destination_code, None);
        assert_eq!(req.lanes[1].shipments, Some(3));
    }
}
