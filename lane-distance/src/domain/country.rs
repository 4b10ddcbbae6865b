//! Country and place-part normalization.

use isocountry::CountryCode;

/// Trim whitespace and trailing punctuation from one part of a place, so
/// `"US.."` and `"US"` agree. Inner punctuation is kept.
pub fn clean_part(s: &str) -> &str {
    s.trim()
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?') || c.is_whitespace())
}

/// ISO 3166-1 alpha-2 code for a country written as alpha-2, alpha-3 or
/// its English short name, ignoring case. `None` when unknown.
pub fn iso2(country: &str) -> Option<String> {
    let country = clean_part(country);
    let upper = country.to_ascii_uppercase();

    let by_code = match upper.len() {
        2 => CountryCode::for_alpha2(&upper).ok().map(|c| c.alpha2().to_string()),
        3 => CountryCode::for_alpha3(&upper).ok().map(|c| c.alpha2().to_string()),
        _ => None,
    };

    by_code.or_else(|| {
        CountryCode::iter()
            .find(|c| c.name().eq_ignore_ascii_case(country))
            .map(|c| c.alpha2().to_string())
    })
}

/// Country part as used in cache keys: the alpha-2 code when the country is
/// recognized, otherwise the cleaned, uppercased input.
pub fn country_key(country: &str) -> String {
    iso2(country).unwrap_or_else(|| {
        clean_part(country)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase()
    })
}
