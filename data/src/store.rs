//! Persisted hundo curves and the read-only store served at request time.
//!
//! Two on-disk layouts hold the same records:
//! - a JSONL file, one `CurveRecord` per line, for batch pipelines;
//! - a directory with one JSON document per species, named after the
//!   normalized species name, for serving.
//!
//! Writers always produce a complete temporary copy and rename it into place,
//! so readers see either the old store or the new one.

use std::{
	collections::HashMap,
	fs::File,
	io::{BufRead, BufReader, BufWriter, Write},
	path::{Path, PathBuf},
	sync::Arc,
};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{normalize_name, PowerCurve, StoreError};

/// One species' persisted curve.
///
/// Serialized flat: `{"ndex": 483, "name": "dialga", "1": 57, ..., "50": 4565}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveRecord {
	pub ndex: u32,
	pub name: String,
	#[serde(flatten)]
	pub curve: PowerCurve,
}

/// Result of matching a reported CP against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result", content = "level")]
pub enum Lookup {
	/// The lowest level whose hundo CP equals the reported CP.
	Matched(u8),
	/// The species is known but no level has that CP.
	NoMatch,
	UnknownSpecies,
}

/// Normalized species name → curve.
#[derive(Debug, Clone, Default)]
pub struct CurveStore {
	records: HashMap<String, CurveRecord>,
}

impl CurveStore {
	pub fn from_records(records: impl IntoIterator<Item = CurveRecord>) -> Self {
		let mut store = Self::default();
		for record in records {
			let key = normalize_name(&record.name);
			if let Some(prev) = store.records.insert(key, record) {
				tracing::warn!(name = %prev.name, "duplicate species in curve store; keeping the later record");
			}
		}
		store
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	pub fn get(&self, name: &str) -> Option<&CurveRecord> {
		self.records.get(&normalize_name(name))
	}

	/// Exact-CP lookup for `name`.
	pub fn match_level(&self, name: &str, cp: u32) -> Lookup {
		match self.get(name) {
			None => Lookup::UnknownSpecies,
			Some(record) => record.curve.level_for(cp).map_or(Lookup::NoMatch, Lookup::Matched),
		}
	}

	/// Records ordered by `ndex`.
	pub fn records(&self) -> Vec<&CurveRecord> {
		let mut records = self.records.values().collect::<Vec<_>>();
		records.sort_by_key(|record| (record.ndex, record.name.as_str()));
		records
	}

	pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Self, StoreError> {
		let records = read_jsonl::<CurveRecord>(path.as_ref())?;
		Ok(Self::from_records(records))
	}

	/// Load a document directory written by [`CurveStore::save_documents`].
	pub fn load_documents(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
		let dir = dir.as_ref();
		let read_err = |source| StoreError::Read {
			path: dir.to_path_buf(),
			source,
		};

		let mut records = Vec::new();
		for entry in std::fs::read_dir(dir).map_err(read_err)? {
			let path = entry.map_err(read_err)?.path();
			if path.extension().and_then(|e| e.to_str()) != Some("json") {
				continue;
			}
			let file = File::open(&path).map_err(|source| StoreError::Read {
				path: path.clone(),
				source,
			})?;
			let record = serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Malformed {
				path: path.clone(),
				line: source.line(),
				source,
			})?;
			records.push(record);
		}

		tracing::info!("Loaded {} curves from {}", records.len(), dir.display());
		Ok(Self::from_records(records))
	}

	/// Load either layout, picking by whether `path` is a directory.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
		let path = path.as_ref();
		if path.is_dir() {
			Self::load_documents(path)
		} else {
			Self::load_jsonl(path)
		}
	}

	pub fn save_jsonl(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
		write_jsonl(path.as_ref(), self.records())
	}

	/// Replace `dir` with one document per species, all-or-nothing.
	pub fn save_documents(&self, dir: impl AsRef<Path>) -> Result<(), StoreError> {
		let dir = dir.as_ref();
		let tmp = sibling(dir, "tmp");
		let write_err = |path: &Path| {
			let path = path.to_path_buf();
			move |source| StoreError::Write { path, source }
		};

		if tmp.exists() {
			std::fs::remove_dir_all(&tmp).map_err(write_err(&tmp))?;
		}
		std::fs::create_dir_all(&tmp).map_err(write_err(&tmp))?;

		for record in self.records() {
			let path = tmp.join(document_file_name(&record.name));
			let file = File::create(&path).map_err(write_err(&path))?;
			let mut writer = BufWriter::new(file);
			serde_json::to_writer(&mut writer, record).map_err(|err| StoreError::Write {
				path: path.clone(),
				source: err.into(),
			})?;
			writer.flush().map_err(write_err(&path))?;
		}

		// Swap the complete directory in. A leftover `.old` is from an interrupted swap.
		let old = sibling(dir, "old");
		if old.exists() {
			std::fs::remove_dir_all(&old).map_err(write_err(&old))?;
		}
		if dir.exists() {
			std::fs::rename(dir, &old).map_err(write_err(dir))?;
		}
		std::fs::rename(&tmp, dir).map_err(write_err(dir))?;
		if old.exists() {
			let _ = std::fs::remove_dir_all(&old);
		}

		tracing::info!("Wrote {} curve documents to {}", self.len(), dir.display());
		Ok(())
	}
}

/// File name of a species' document: normalized name with spaces as dashes.
pub fn document_file_name(name: &str) -> String {
	format!("{}.json", normalize_name(name).replace(' ', "-"))
}

/// A published `CurveStore` that can be swapped while being read.
///
/// Readers take an `Arc` snapshot and keep using it for the whole request;
/// `publish` replaces the snapshot in one step.
#[derive(Debug, Clone, Default)]
pub struct StoreHandle {
	current: Arc<RwLock<Arc<CurveStore>>>,
}

impl StoreHandle {
	pub fn new(store: CurveStore) -> Self {
		Self {
			current: Arc::new(RwLock::new(Arc::new(store))),
		}
	}

	pub fn snapshot(&self) -> Arc<CurveStore> {
		self.current.read().clone()
	}

	pub fn publish(&self, store: CurveStore) {
		let store = Arc::new(store);
		tracing::info!("Publishing curve store with {} species", store.len());
		*self.current.write() = store;
	}
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
	let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
	name.push(format!(".{suffix}"));
	path.with_file_name(name)
}

/// Read newline-delimited JSON, skipping blank lines.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
	let file = File::open(path).map_err(|source| StoreError::Read {
		path: path.to_path_buf(),
		source,
	})?;

	let mut out = Vec::new();
	for (i, line) in BufReader::new(file).lines().enumerate() {
		let line = line.map_err(|source| StoreError::Read {
			path: path.to_path_buf(),
			source,
		})?;
		if line.trim().is_empty() {
			continue;
		}
		let value = serde_json::from_str(&line).map_err(|source| StoreError::Malformed {
			path: path.to_path_buf(),
			line: i + 1,
			source,
		})?;
		out.push(value);
	}
	Ok(out)
}

/// Write newline-delimited JSON through a temp file renamed over `path`.
pub fn write_jsonl<T: Serialize>(path: &Path, values: impl IntoIterator<Item = T>) -> Result<(), StoreError> {
	let write_err = |source| StoreError::Write {
		path: path.to_path_buf(),
		source,
	};

	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		std::fs::create_dir_all(parent).map_err(write_err)?;
	}

	let tmp = sibling(path, "tmp");
	let file = File::create(&tmp).map_err(write_err)?;
	let mut writer = BufWriter::new(file);
	for value in values {
		serde_json::to_writer(&mut writer, &value).map_err(|err| write_err(err.into()))?;
		writer.write_all(b"\n").map_err(write_err)?;
	}
	writer.flush().map_err(write_err)?;
	drop(writer);

	// Replace existing file (Windows-friendly).
	if std::fs::rename(&tmp, path).is_err() {
		let _ = std::fs::remove_file(path);
		std::fs::rename(&tmp, path).map_err(write_err)?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Balance, DerivedAttributes, ModifierTable, HUNDO_BONUS};

	fn record(ndex: u32, name: &str, attack: u32, defense: u32, stamina: u32) -> CurveRecord {
		let stats = DerivedAttributes {
			name: name.to_string(),
			attack,
			defense,
			stamina,
			balance: Balance::Unchanged,
		};
		CurveRecord {
			ndex,
			name: name.to_string(),
			curve: PowerCurve::build(&stats, &ModifierTable::reference(), HUNDO_BONUS),
		}
	}

	fn sample() -> CurveStore {
		CurveStore::from_records([
			record(1, "bulbasaur", 118, 111, 128),
			record(122, "mr-mime", 192, 205, 120),
			record(483, "dialga", 275, 211, 205),
		])
	}

	#[test]
	fn lookup_distinguishes_outcomes() {
		let store = sample();
		assert_eq!(store.match_level("Dialga", 2307), Lookup::Matched(20));
		assert_eq!(store.match_level("dialga", 2337), Lookup::NoMatch);
		assert_eq!(store.match_level("palkia", 2307), Lookup::UnknownSpecies);
		assert!(store.get("Mr Mime").is_some());
	}

	#[test]
	fn jsonl_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("hundo.jsonl");
		let store = sample();
		store.save_jsonl(&path).unwrap();

		let text = std::fs::read_to_string(&path).unwrap();
		assert_eq!(text.lines().count(), 3);
		assert!(text.lines().next().unwrap().contains("\"ndex\":1"));

		let loaded = CurveStore::load(&path).unwrap();
		assert_eq!(loaded.get("dialga"), store.get("dialga"));
	}

	#[test]
	fn records_are_flat() {
		let json = serde_json::to_value(record(483, "dialga", 275, 211, 205)).unwrap();
		assert_eq!(json["ndex"], 483);
		assert_eq!(json["name"], "dialga");
		assert_eq!(json["20"], 2307);
		assert_eq!(json["50"], 4565);
		assert!(json.get("curve").is_none());
		assert_eq!(json.as_object().unwrap().len(), 52);

		let back: CurveRecord = serde_json::from_value(json).unwrap();
		assert_eq!(back.curve.at(40), Some(4038));
	}

	#[test]
	fn documents_replace_previous_store() {
		let dir = tempfile::tempdir().unwrap();
		let docs = dir.path().join("store");

		CurveStore::from_records([record(25, "pikachu", 112, 96, 111)])
			.save_documents(&docs)
			.unwrap();
		sample().save_documents(&docs).unwrap();

		assert!(docs.join("mr-mime.json").is_file());
		assert!(!docs.join("pikachu.json").exists());
		assert!(!dir.path().join("store.tmp").exists());
		assert!(!dir.path().join("store.old").exists());

		let loaded = CurveStore::load(&docs).unwrap();
		assert_eq!(loaded.len(), 3);
		assert_eq!(loaded.match_level("dialga", 4038), Lookup::Matched(40));
	}

	#[test]
	fn malformed_line_reports_position() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("bad.jsonl");
		std::fs::write(&path, "\n{\"ndex\": 1}\n").unwrap();
		match CurveStore::load_jsonl(&path) {
			Err(StoreError::Malformed { line, .. }) => assert_eq!(line, 2),
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn readers_keep_their_snapshot() {
		let handle = StoreHandle::new(sample());
		let before = handle.snapshot();

		let reader = {
			let handle = handle.clone();
			std::thread::spawn(move || (0..1000).all(|_| handle.snapshot().len() == 3 || handle.snapshot().len() == 1))
		};
		handle.publish(CurveStore::from_records([record(25, "pikachu", 112, 96, 111)]));

		assert!(reader.join().unwrap());
		assert_eq!(before.len(), 3);
		assert_eq!(handle.snapshot().len(), 1);
		assert_eq!(handle.snapshot().match_level("dialga", 2307), Lookup::UnknownSpecies);
	}
}
