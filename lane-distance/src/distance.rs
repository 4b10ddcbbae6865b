//! Great-circle distance between two coordinates.

use crate::domain::Coordinates;

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Great-circle distance in miles using the haversine formula.
///
/// Symmetric in its arguments and zero for identical points.
///
/// # Example
///
/// ```
/// use lane_distance::distance::great_circle_miles;
/// use lane_distance::domain::Coordinates;
///
/// let a = Coordinates::new(0.0, 0.0).unwrap();
/// let b = Coordinates::new(0.0, 1.0).unwrap();
///
/// // One degree of longitude on the equator
/// assert!((great_circle_miles(a, b) - 69.09).abs() < 0.01);
/// ```
pub fn great_circle_miles(from: Coordinates, to: Coordinates) -> f64 {
    let phi1 = from.latitude().to_radians();
    let phi2 = to.latitude().to_radians();
    // Absolute differences keep the result bit-for-bit symmetric.
    let d_phi = (to.latitude() - from.latitude()).abs().to_radians();
    let d_lambda = (to.longitude() - from.longitude()).abs().to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let a = a.min(1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Round a distance to hundredths of a mile for display.
pub fn round_miles(miles: f64) -> f64 {
    (miles * 100.0).round() / 100.0
}
