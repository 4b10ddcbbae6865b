//! UN/LOCODE coordinate notation.
//!
//! The official code list stores positions as degrees and minutes with a
//! hemisphere letter, e.g. `4042N 07400W`: latitude as `DDMM[NS]`, longitude
//! as `DDDMM[EW]`.

use crate::domain::Coordinates;

/// Parse one `DDMM[NSEW]` / `DDDMM[NSEW]` component into decimal degrees.
///
/// Returns `None` for anything that doesn't match the notation.
pub fn parse_component(s: &str) -> Option<f64> {
    let s = s.trim();
    let hemisphere = s.chars().last()?;
    let digits = &s[..s.len() - hemisphere.len_utf8()];

    if !(4..=5).contains(&digits.len()) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let (deg, min) = digits.split_at(digits.len() - 2);
    let deg: f64 = deg.parse().ok()?;
    let min: f64 = min.parse().ok()?;
    if min >= 60.0 {
        return None;
    }

    let value = deg + min / 60.0;
    match hemisphere {
        'N' | 'E' => Some(value),
        'S' | 'W' => Some(-value),
        _ => None,
    }
}

/// Parse a `4042N 07400W` pair into coordinates.
pub fn parse_pair(s: &str) -> Option<Coordinates> {
    let mut parts = s.split_whitespace();
    let lat = parts.next()?;
    let lon = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    if !lat.ends_with(['N', 'S']) || !lon.ends_with(['E', 'W']) {
        return None;
    }

    Coordinates::new(parse_component(lat)?, parse_component(lon)?).ok()
}
