//! Where main-series base stats come from.

use crate::{schema::pokeapi, FetchError, SpeciesAttributes};

/// Something that can look up a species' base stats.
pub trait AttributeSource: Send + Sync {
	fn attributes(&self, reference: &str) -> Result<SpeciesAttributes, FetchError>;
}

/// One species to process, either still to be fetched or already at hand.
#[derive(Debug, Clone)]
pub enum SpeciesInput {
	/// Catalog name or URL, resolved through an [`AttributeSource`].
	ByReference { name: String, reference: String },
	/// A catalog record fetched earlier (e.g. from a local dump).
	ByValue(pokeapi::Pokemon),
}

impl SpeciesInput {
	pub fn name(&self) -> &str {
		match self {
			Self::ByReference { name, .. } => name,
			Self::ByValue(record) => display_name(record),
		}
	}

	pub fn resolve(&self, source: &dyn AttributeSource) -> Result<SpeciesAttributes, FetchError> {
		match self {
			Self::ByReference { reference, .. } => source.attributes(reference),
			Self::ByValue(record) => attributes_from_record(record),
		}
	}
}

impl From<pokeapi::Pokemon> for SpeciesInput {
	fn from(record: pokeapi::Pokemon) -> Self {
		Self::ByValue(record)
	}
}

impl From<pokeapi::NamedResource> for SpeciesInput {
	fn from(entry: pokeapi::NamedResource) -> Self {
		let reference = entry.url.unwrap_or_else(|| entry.name.clone());
		Self::ByReference {
			name: entry.name,
			reference,
		}
	}
}

/// The default form's name when present (`forms[0]`), else the record name.
fn display_name(record: &pokeapi::Pokemon) -> &str {
	record
		.forms
		.first()
		.map(|form| form.name.as_str())
		.unwrap_or(&record.name)
}

/// Pull the six base stats out of a catalog record.
pub fn attributes_from_record(record: &pokeapi::Pokemon) -> Result<SpeciesAttributes, FetchError> {
	let name = display_name(record);
	let stat = |key: &str| {
		record
			.stats
			.iter()
			.find(|entry| entry.stat.name == key)
			.map(|entry| entry.base_stat)
			.ok_or_else(|| FetchError::Malformed {
				reference: name.to_string(),
				message: format!("missing stat `{key}`"),
			})
	};

	Ok(SpeciesAttributes {
		name: name.to_string(),
		hp: stat("hp")?,
		attack: stat("attack")?,
		defense: stat("defense")?,
		sp_attack: stat("special-attack")?,
		sp_defense: stat("special-defense")?,
		speed: stat("speed")?,
	})
}

/// The public PokeAPI catalog.
#[derive(Debug, Clone)]
pub struct PokeApi {
	base_url: String,
}

impl Default for PokeApi {
	fn default() -> Self {
		Self::new(pokeapi::URL)
	}
}

impl PokeApi {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
		}
	}

	fn url(&self, reference: &str) -> String {
		if reference.starts_with("http://") || reference.starts_with("https://") {
			reference.to_string()
		} else {
			format!("{}{}", self.base_url, reference.trim().to_ascii_lowercase())
		}
	}

	pub fn record(&self, reference: &str) -> Result<pokeapi::Pokemon, FetchError> {
		let url = self.url(reference);
		tracing::debug!(url, "GET pokemon");

		let mut res = ureq::get(&url).call().map_err(|err| classify(reference, err))?;
		res.body_mut()
			.read_json::<pokeapi::Pokemon>()
			.map_err(|err| classify(reference, err))
	}
}

impl AttributeSource for PokeApi {
	fn attributes(&self, reference: &str) -> Result<SpeciesAttributes, FetchError> {
		attributes_from_record(&self.record(reference)?)
	}
}

fn classify(reference: &str, err: ureq::Error) -> FetchError {
	match err {
		ureq::Error::StatusCode(404) => FetchError::NotFound(reference.to_string()),
		ureq::Error::Json(err) => FetchError::Malformed {
			reference: reference.to_string(),
			message: err.to_string(),
		},
		err => FetchError::Transient {
			reference: reference.to_string(),
			source: Box::new(err),
		},
	}
}
