//! Main-series base stats and their Pokémon GO counterparts.
//!
//! All `round()` calls in this module round half away from zero (`f64::round`).
//! The distinction matters: Dialga's scaled attack is exactly `292.5`, and only
//! rounding up reproduces the in-game 275 attack after the nerf.

use serde::{Deserialize, Serialize};

use crate::{curve, ModifierTable, HUNDO_BONUS};

/// CP at level 40 (hundo) above which a species receives the balance nerf.
pub const NERF_CP_THRESHOLD: u32 = 4000;
/// Factor applied to all three GO stats of a nerfed species.
pub const NERF_FACTOR: f64 = 0.91;
/// Level whose modifier decides the nerf.
pub const NERF_LEVEL: u8 = 40;

/// The six main-series base stats of one species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesAttributes {
	pub name: String,
	pub hp: u32,
	#[serde(rename = "atk")]
	pub attack: u32,
	#[serde(rename = "def")]
	pub defense: u32,
	#[serde(rename = "sp_atk")]
	pub sp_attack: u32,
	#[serde(rename = "sp_def")]
	pub sp_defense: u32,
	pub speed: u32,
}

/// Whether the nerf decision has been taken for a set of derived stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Balance {
	#[default]
	Unchecked,
	Unchanged,
	Nerfed,
}

/// Pokémon GO base stats (attack, defense, stamina).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAttributes {
	pub name: String,
	#[serde(rename = "atk")]
	pub attack: u32,
	#[serde(rename = "def")]
	pub defense: u32,
	#[serde(rename = "sta")]
	pub stamina: u32,
	#[serde(default)]
	pub balance: Balance,
}

impl SpeciesAttributes {
	/// Convert main-series stats to GO stats, without the nerf.
	pub fn derive(&self) -> DerivedAttributes {
		let speed_mod = 1.0 + (self.speed as f64 - 75.0) / 500.0;

		let (atk_hi, atk_lo) = hi_lo(self.attack, self.sp_attack);
		let scaled_atk = (2.0 * (7.0 / 8.0 * atk_hi + 1.0 / 8.0 * atk_lo)).round();

		let (def_hi, def_lo) = hi_lo(self.defense, self.sp_defense);
		let scaled_def = (2.0 * (5.0 / 8.0 * def_hi + 3.0 / 8.0 * def_lo)).round();

		DerivedAttributes {
			name: self.name.clone(),
			attack: to_stat(scaled_atk * speed_mod),
			defense: to_stat(scaled_def * speed_mod),
			stamina: (1.75 * self.hp as f64 + 50.0).floor() as u32,
			balance: Balance::Unchecked,
		}
	}
}

impl DerivedAttributes {
	/// Hundo CP at level 40 for these stats as they are.
	pub fn ceiling_cp(&self, table: &ModifierTable) -> u32 {
		curve::cp(self, HUNDO_BONUS, table.get(NERF_LEVEL))
	}

	/// Take the nerf decision.
	///
	/// Only acts on `Balance::Unchecked` stats, so it can be applied any number
	/// of times without compounding the factor.
	pub fn balanced(self, table: &ModifierTable) -> Self {
		if self.balance != Balance::Unchecked {
			return self;
		}

		let ceiling = self.ceiling_cp(table);
		if ceiling <= NERF_CP_THRESHOLD {
			return Self {
				balance: Balance::Unchanged,
				..self
			};
		}

		tracing::debug!(name = %self.name, ceiling, "applying balance nerf");
		Self {
			attack: to_stat(self.attack as f64 * NERF_FACTOR),
			defense: to_stat(self.defense as f64 * NERF_FACTOR),
			stamina: to_stat(self.stamina as f64 * NERF_FACTOR),
			balance: Balance::Nerfed,
			..self
		}
	}
}

fn hi_lo(a: u32, b: u32) -> (f64, f64) {
	(a.max(b) as f64, a.min(b) as f64)
}

#[inline]
fn to_stat(v: f64) -> u32 {
	v.round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
	use super::*;

	fn attrs(name: &str, hp: u32, attack: u32, defense: u32, sp_attack: u32, sp_defense: u32, speed: u32) -> SpeciesAttributes {
		SpeciesAttributes {
			name: name.to_string(),
			hp,
			attack,
			defense,
			sp_attack,
			sp_defense,
			speed,
		}
	}

	#[test]
	fn dialga_rounds_half_up_and_gets_nerfed() {
		let table = ModifierTable::reference();
		let raw = attrs("dialga", 100, 120, 120, 150, 100, 90).derive();
		assert_eq!((raw.attack, raw.defense, raw.stamina), (302, 232, 225));
		assert_eq!(raw.ceiling_cp(&table), 4820);

		let go = raw.balanced(&table);
		assert_eq!((go.attack, go.defense, go.stamina), (275, 211, 205));
		assert_eq!(go.balance, Balance::Nerfed);
	}

	#[test]
	fn nerf_is_applied_once() {
		let table = ModifierTable::reference();
		let once = attrs("dialga", 100, 120, 120, 150, 100, 90).derive().balanced(&table);
		let twice = once.clone().balanced(&table);
		assert_eq!(once, twice);
	}

	#[test]
	fn below_threshold_is_unchanged() {
		let table = ModifierTable::reference();
		let raw = attrs("example", 91, 130, 95, 145, 90, 58).derive();
		assert_eq!((raw.attack, raw.defense, raw.stamina), (276, 180, 209));

		let go = raw.clone().balanced(&table);
		assert_eq!(go.balance, Balance::Unchanged);
		assert_eq!((go.attack, go.defense, go.stamina), (raw.attack, raw.defense, raw.stamina));
	}

	#[test]
	fn stamina_floors() {
		// 1.75 * 45 + 50 = 128.75
		let raw = attrs("bulbasaur", 45, 49, 49, 65, 65, 45).derive();
		assert_eq!(raw.stamina, 128);
		assert_eq!((raw.attack, raw.defense), (118, 111));
	}
}
