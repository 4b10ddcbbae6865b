//! UN/LOCODE reference table.
//!
//! Provides code → (name, country, coordinates) lookup. A seed table is
//! compiled into the binary; a fuller extract of the official code list can
//! be layered on top at startup.

pub mod dms;
mod error;
mod table;

pub use error::TableError;
pub use table::{LocationCode, LocodeTable};
