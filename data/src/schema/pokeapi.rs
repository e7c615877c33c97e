use serde::Deserialize;

pub const URL: &str = "https://pokeapi.co/api/v2/pokemon/";

/// The subset of a `/pokemon/{id}` response we use.
#[derive(Debug, Clone, Deserialize)]
pub struct Pokemon {
	pub name: String,
	#[serde(default)]
	pub forms: Vec<NamedResource>,
	pub stats: Vec<StatEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatEntry {
	pub base_stat: u32,
	pub stat: NamedResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedResource {
	pub name: String,
	#[serde(default)]
	pub url: Option<String>,
}

/// `/pokemon?limit=N` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
	pub results: Vec<NamedResource>,
}
