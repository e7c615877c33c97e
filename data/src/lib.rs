//! Species stats, CP multipliers and hundo CP curves.

mod curve;
pub use curve::*;
mod error;
pub use error::*;
mod modifier;
pub use modifier::*;
mod stats;
pub use stats::*;

pub mod schema;
pub mod source;
pub mod store;
pub use store::{CurveRecord, CurveStore, Lookup, StoreHandle};

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 50;

/// IV on each of attack, defense and stamina for a perfect ("hundo") Pokémon.
pub const HUNDO_BONUS: u32 = 15;

/// Canonical form of a species name for store keys and lookups.
///
/// Lower-cases, turns dashes into spaces and collapses whitespace, so the OCR'd
/// `"Mr Mime"` and the catalog's `"mr-mime"` meet.
pub fn normalize_name(name: &str) -> String {
	name.replace('-', " ")
		.split_whitespace()
		.collect::<Vec<_>>()
		.join(" ")
		.to_lowercase()
}
