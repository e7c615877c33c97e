//! CP multiplier (CPM) table.

use std::{collections::BTreeMap, path::Path};

use crate::{ConfigError, MAX_LEVEL, MIN_LEVEL};

const REFERENCE: &str = include_str!("../assets/cpm.json");

/// Level → CP multiplier, complete for every whole level in `MIN_LEVEL..=MAX_LEVEL`.
///
/// A table can only be constructed complete, positive and non-decreasing.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierTable {
	values: [f64; MAX_LEVEL as usize],
}

impl ModifierTable {
	/// The embedded whole-level table shipped with the crate.
	pub fn reference() -> Self {
		// The embedded file is covered by tests; failing here is a build defect.
		Self::from_json(REFERENCE).expect("embedded cpm.json is valid")
	}

	/// Load a table from a JSON object of `"level": multiplier` pairs.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
			path: path.to_path_buf(),
			source,
		})?;
		let table = Self::from_json(&json)?;
		tracing::info!("Loaded CP multiplier table from {}", path.display());
		Ok(table)
	}

	/// Parse a table. Non-integer keys (half levels like `"1.5"`) are skipped.
	pub fn from_json(json: &str) -> Result<Self, ConfigError> {
		let raw: BTreeMap<String, f64> = serde_json::from_str(json)?;

		let mut entries = BTreeMap::new();
		for (key, value) in raw {
			match key.trim().parse::<u8>() {
				Ok(level) => {
					entries.insert(level, value);
				}
				Err(_) => tracing::trace!(key, "skipping non-integer level"),
			}
		}
		Self::from_entries(entries)
	}

	pub fn from_entries(entries: BTreeMap<u8, f64>) -> Result<Self, ConfigError> {
		let missing = (MIN_LEVEL..=MAX_LEVEL)
			.filter(|level| !entries.contains_key(level))
			.collect::<Vec<_>>();
		if !missing.is_empty() {
			return Err(ConfigError::MissingLevels(missing));
		}

		let mut values = [0.0; MAX_LEVEL as usize];
		let mut prev = 0.0;
		for level in MIN_LEVEL..=MAX_LEVEL {
			let value = entries[&level];
			if !value.is_finite() || value <= 0.0 {
				return Err(ConfigError::NonPositive { level, value });
			}
			if value < prev {
				return Err(ConfigError::Decreasing { level });
			}
			values[(level - MIN_LEVEL) as usize] = value;
			prev = value;
		}

		Ok(Self { values })
	}

	/// Multiplier for `level`.
	///
	/// # Panics
	/// If `level` is outside `MIN_LEVEL..=MAX_LEVEL`.
	#[inline]
	pub fn get(&self, level: u8) -> f64 {
		assert!((MIN_LEVEL..=MAX_LEVEL).contains(&level), "level {level} out of range");
		self.values[(level - MIN_LEVEL) as usize]
	}

	pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
		(MIN_LEVEL..=MAX_LEVEL).zip(self.values.iter().copied())
	}
}
