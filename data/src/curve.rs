//! Per-level hundo CP curves.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{DerivedAttributes, ModifierTable, MAX_LEVEL, MIN_LEVEL};

/// No Pokémon displays less than this.
pub const MIN_CP: u32 = 10;

/// CP of a Pokémon with `stats`, the same `bonus` on every IV, at multiplier `cpm`.
pub fn cp(stats: &DerivedAttributes, bonus: u32, cpm: f64) -> u32 {
	let attack = (stats.attack + bonus) as f64;
	let defense = ((stats.defense + bonus) as f64).sqrt();
	let stamina = ((stats.stamina + bonus) as f64).sqrt();
	let value = (attack * defense * stamina * cpm * cpm / 10.0).floor() as u32;
	value.max(MIN_CP)
}

/// CP for every whole level, indexed from `MIN_LEVEL`.
///
/// Values never decrease with level. Equal neighbours are common at low levels
/// because of the `MIN_CP` clamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, u32>", into = "BTreeMap<u8, u32>")]
pub struct PowerCurve {
	values: Vec<u32>,
}

impl PowerCurve {
	pub fn build(stats: &DerivedAttributes, table: &ModifierTable, bonus: u32) -> Self {
		let values = table.iter().map(|(_, cpm)| cp(stats, bonus, cpm)).collect();
		Self { values }
	}

	/// CP at `level`, if it is on the curve.
	pub fn at(&self, level: u8) -> Option<u32> {
		let index = level.checked_sub(MIN_LEVEL)?;
		self.values.get(index as usize).copied()
	}

	/// Lowest level whose CP is exactly `cp`.
	pub fn level_for(&self, cp: u32) -> Option<u8> {
		// Sorted, so the first hit of a binary partition is the lowest level.
		let index = self.values.partition_point(|v| *v < cp);
		(self.values.get(index) == Some(&cp)).then(|| index as u8 + MIN_LEVEL)
	}

	pub fn iter(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
		(MIN_LEVEL..=MAX_LEVEL).zip(self.values.iter().copied())
	}
}

#[derive(Debug, thiserror::Error)]
pub enum CurveError {
	#[error("curve is missing levels {0:?}")]
	MissingLevels(Vec<u8>),
	#[error("curve has level {0} outside {MIN_LEVEL}..={MAX_LEVEL}")]
	UnknownLevel(u8),
	#[error("curve decreases at level {0}")]
	Decreasing(u8),
	#[error("curve key `{0}` is not a level")]
	NotALevel(String),
}

/// JSON object keys are strings; they must spell whole levels.
impl TryFrom<BTreeMap<String, u32>> for PowerCurve {
	type Error = CurveError;

	fn try_from(map: BTreeMap<String, u32>) -> Result<Self, Self::Error> {
		map.into_iter()
			.map(|(key, cp)| match key.parse::<u8>() {
				Ok(level) => Ok((level, cp)),
				Err(_) => Err(CurveError::NotALevel(key)),
			})
			.collect::<Result<BTreeMap<u8, u32>, _>>()
			.and_then(Self::try_from)
	}
}

impl TryFrom<BTreeMap<u8, u32>> for PowerCurve {
	type Error = CurveError;

	fn try_from(map: BTreeMap<u8, u32>) -> Result<Self, Self::Error> {
		if let Some(level) = map.keys().find(|level| !(MIN_LEVEL..=MAX_LEVEL).contains(*level)) {
			return Err(CurveError::UnknownLevel(*level));
		}
		let missing = (MIN_LEVEL..=MAX_LEVEL)
			.filter(|level| !map.contains_key(level))
			.collect::<Vec<_>>();
		if !missing.is_empty() {
			return Err(CurveError::MissingLevels(missing));
		}

		let values = map.into_values().collect::<Vec<_>>();
		if let Some(i) = values.windows(2).position(|w| w[1] < w[0]) {
			return Err(CurveError::Decreasing(i as u8 + MIN_LEVEL + 1));
		}
		Ok(Self { values })
	}
}

impl From<PowerCurve> for BTreeMap<u8, u32> {
	fn from(curve: PowerCurve) -> Self {
		curve.iter().collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Balance, SpeciesAttributes, HUNDO_BONUS};

	fn go(name: &str, attack: u32, defense: u32, stamina: u32) -> DerivedAttributes {
		DerivedAttributes {
			name: name.to_string(),
			attack,
			defense,
			stamina,
			balance: Balance::Unchanged,
		}
	}

	#[test]
	fn dialga_reference_values() {
		let table = ModifierTable::reference();
		let curve = PowerCurve::build(&go("dialga", 275, 211, 205), &table, HUNDO_BONUS);
		assert_eq!(curve.at(20), Some(2307));
		assert_eq!(curve.at(25), Some(2884));
		assert_eq!(curve.at(40), Some(4038));
		assert_eq!(curve.at(50), Some(4565));
		assert_eq!(curve.at(0), None);
		assert_eq!(curve.at(51), None);
	}

	#[test]
	fn end_to_end_curve_is_complete_and_monotonic() {
		let table = ModifierTable::reference();
		let stats = SpeciesAttributes {
			name: "example".to_string(),
			hp: 91,
			attack: 130,
			defense: 95,
			sp_attack: 145,
			sp_defense: 90,
			speed: 58,
		}
		.derive()
		.balanced(&table);
		let curve = PowerCurve::build(&stats, &table, HUNDO_BONUS);

		let values = curve.iter().map(|(_, cp)| cp).collect::<Vec<_>>();
		assert_eq!(values.len(), 50);
		assert!(values.iter().all(|cp| *cp >= MIN_CP));
		assert!(values.windows(2).all(|w| w[0] <= w[1]));
	}

	#[test]
	fn weak_species_clamps_and_matches_lowest_level() {
		let table = ModifierTable::reference();
		let curve = PowerCurve::build(&go("tiny", 1, 1, 1), &table, 0);
		assert_eq!(curve.at(1), Some(MIN_CP));
		assert_eq!(curve.at(2), Some(MIN_CP));
		assert_eq!(curve.level_for(MIN_CP), Some(1));
	}

	#[test]
	fn own_values_round_trip() {
		let table = ModifierTable::reference();
		let curve = PowerCurve::build(&go("dialga", 275, 211, 205), &table, HUNDO_BONUS);
		for (level, cp) in curve.iter() {
			let found = curve.level_for(cp).unwrap();
			assert!(found <= level);
			assert_eq!(curve.at(found), Some(cp));
		}
		assert_eq!(curve.level_for(2337), None);
		assert_eq!(curve.level_for(2307), Some(20));
	}

	#[test]
	fn json_keys_are_levels() {
		let table = ModifierTable::reference();
		let curve = PowerCurve::build(&go("dialga", 275, 211, 205), &table, HUNDO_BONUS);
		let json = serde_json::to_value(&curve).unwrap();
		assert_eq!(json["40"], 4038);

		let back: PowerCurve = serde_json::from_value(json).unwrap();
		assert_eq!(back, curve);
	}

	#[test]
	fn incomplete_json_is_rejected() {
		let err = serde_json::from_str::<PowerCurve>(r#"{"1": 10, "2": 12}"#).unwrap_err();
		assert!(err.to_string().contains("missing levels"));
	}

	#[test]
	fn non_level_keys_are_rejected() {
		let mut json = serde_json::Map::new();
		for level in MIN_LEVEL..=MAX_LEVEL {
			json.insert(level.to_string(), (level as u32 * 10).into());
		}
		json.insert("1.5".to_string(), 15.into());
		let err = serde_json::from_value::<PowerCurve>(json.into()).unwrap_err();
		assert!(err.to_string().contains("not a level"), "{err}");
	}
}
