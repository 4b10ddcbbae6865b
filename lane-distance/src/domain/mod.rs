//! Domain types for lane distance resolution.
//!
//! Types here enforce their invariants at construction time: a `Locode` is
//! always well-formed and `Coordinates` are always within range, so code that
//! receives them can trust their validity.

mod coords;
mod country;
mod lane;
mod locode;
mod resolution;

pub use coords::{Coordinates, InvalidCoordinates};
pub use country::{clean_part, country_key, iso2};
pub use lane::{EnrichedLane, LaneRecord, split_place};
pub use locode::{InvalidLocode, Locode};
pub use resolution::{Resolution, ResolutionMethod};
