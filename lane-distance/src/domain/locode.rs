//! UN/LOCODE location code type.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when parsing an invalid UN/LOCODE.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid UN/LOCODE: {reason}")]
pub struct InvalidLocode {
    reason: &'static str,
}

/// A valid 5-character UN/LOCODE.
///
/// The first two characters are the ISO 3166 country code (uppercase
/// letters), the remaining three identify the location within the country
/// (uppercase letters or digits 2-9 in the official list; any digit is
/// accepted here).
///
/// # Examples
///
/// ```
/// use lane_distance::domain::Locode;
///
/// let nyc = Locode::parse("USNYC").unwrap();
/// assert_eq!(nyc.as_str(), "USNYC");
/// assert_eq!(nyc.country(), "US");
///
/// // Strict parsing rejects lowercase and whitespace
/// assert!(Locode::parse("usnyc").is_err());
/// assert!(Locode::parse(" USNYC").is_err());
///
/// // Normalized parsing accepts them
/// assert_eq!(Locode::parse_normalized(" usnyc ").unwrap(), nyc);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locode([u8; 5]);

impl Locode {
    /// Parse a LOCODE from a string.
    ///
    /// The input must be exactly 2 uppercase ASCII letters followed by
    /// 3 uppercase ASCII letters or digits.
    pub fn parse(s: &str) -> Result<Self, InvalidLocode> {
        let bytes = s.as_bytes();

        if bytes.len() != 5 {
            return Err(InvalidLocode {
                reason: "must be exactly 5 characters",
            });
        }

        if !bytes[..2].iter().all(u8::is_ascii_uppercase) {
            return Err(InvalidLocode {
                reason: "country part must be uppercase ASCII letters A-Z",
            });
        }

        if !bytes[2..]
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            return Err(InvalidLocode {
                reason: "location part must be uppercase ASCII letters or digits",
            });
        }

        Ok(Locode([bytes[0], bytes[1], bytes[2], bytes[3], bytes[4]]))
    }

    /// Parse a LOCODE after trimming whitespace and uppercasing.
    ///
    /// Lane files routinely carry codes like `" usnyc"`; this is the entry
    /// point for user-supplied codes.
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidLocode> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII bytes are ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// Returns the two-letter country part.
    pub fn country(&self) -> &str {
        &self.as_str()[..2]
    }
}

impl fmt::Debug for Locode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Locode({})", self.as_str())
    }
}

impl fmt::Display for Locode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Locode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Locode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Locode::parse_normalized(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_locodes() {
        assert!(Locode::parse("USNYC").is_ok());
        assert!(Locode::parse("GBLON").is_ok());
        assert!(Locode::parse("DE2HA").is_ok());
        assert!(Locode::parse("AE123").is_ok());
    }

    #[test]
    fn reject_lowercase() {
        assert!(Locode::parse("usnyc").is_err());
        assert!(Locode::parse("USnyc").is_err());
        assert!(Locode::parse("UsNYC").is_err());
    }

    #[test]
    fn reject_wrong_length() {
        assert!(Locode::parse("").is_err());
        assert!(Locode::parse("US").is_err());
        assert!(Locode::parse("USNY").is_err());
        assert!(Locode::parse("USNYCX").is_err());
    }

    #[test]
    fn reject_digit_in_country() {
        assert!(Locode::parse("U1NYC").is_err());
        assert!(Locode::parse("12345").is_err());
    }

    #[test]
    fn reject_punctuation() {
        assert!(Locode::parse("US-NY").is_err());
        assert!(Locode::parse("US NY").is_err());
        assert!(Locode::parse("USNYÇ").is_err());
    }

    #[test]
    fn normalized_trims_and_uppercases() {
        let code = Locode::parse_normalized("  gblon\t").unwrap();
        assert_eq!(code.as_str(), "GBLON");
        assert!(Locode::parse_normalized("london").is_err());
    }

    #[test]
    fn country_part() {
        let code = Locode::parse("JPTYO").unwrap();
        assert_eq!(code.country(), "JP");
    }

    #[test]
    fn display_and_debug() {
        let code = Locode::parse("FRPAR").unwrap();
        assert_eq!(format!("{}", code), "FRPAR");
        assert_eq!(format!("{:?}", code), "Locode(FRPAR)");
    }

    #[test]
    fn serde_uses_plain_string() {
        let code = Locode::parse("KRSEL").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"KRSEL\"");

        let parsed: Locode = serde_json::from_str("\"krsel\"").unwrap();
        assert_eq!(parsed, code);

        assert!(serde_json::from_str::<Locode>("\"SEO1!\"").is_err());
        assert!(serde_json::from_str::<Locode>("\"Seo\"").is_err());
    }
}
