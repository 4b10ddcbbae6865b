//! Mapbox forward-geocoding response types.
//!
//! Only the fields the resolver needs are modelled; everything else in the
//! GeoJSON payload is ignored.

use serde::Deserialize;

/// Top-level `FeatureCollection` response.
#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// A single matched place.
#[derive(Debug, Deserialize)]
pub struct Feature {
    /// Full display name, e.g. "Paris, Île-de-France, France".
    #[serde(default)]
    pub place_name: Option<String>,

    /// Match confidence in [0, 1].
    #[serde(default)]
    pub relevance: Option<f64>,

    /// Representative point as `[lon, lat]`.
    #[serde(default)]
    pub center: Option<[f64; 2]>,

    #[serde(default)]
    pub geometry: Option<Geometry>,
}

/// GeoJSON point geometry.
#[derive(Debug, Deserialize)]
pub struct Geometry {
    /// `[lon, lat]`.
    pub coordinates: [f64; 2],
}

impl Feature {
    /// The feature's point as `(lat, lon)`, preferring the geometry.
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        self.geometry
            .as_ref()
            .map(|g| g.coordinates)
            .or(self.center)
            .map(|[lon, lat]| (lat, lon))
    }
}
