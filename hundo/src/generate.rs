//! Offline batch: species stats → hundo CP curves on disk.
//!
//! Fetching is sequential (it talks to a public API); stat conversion and curve
//! building run on the rayon pool. Outputs are only written once every species
//! has been processed, each through a temp file or directory.

use std::{io::ErrorKind, path::Path, time::Duration};

use rayon::prelude::*;

use data::{
    schema::pokeapi,
    source::{AttributeSource, PokeApi, SpeciesInput},
    store::{read_jsonl, write_jsonl},
    ConfigError, CurveRecord, CurveStore, DerivedAttributes, FetchError, ModifierTable, PowerCurve, SpeciesAttributes,
    StoreError,
};

use crate::config::{Config, GenerateConfig, InputKind};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("input {path} could not be read")]
    InputMissing {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("input {path} is malformed")]
    InputMalformed {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to write output {path}")]
    OutputWrite {
        path: String,
        #[source]
        source: BoxError,
    },
}

impl BatchError {
    /// Process exit code for this failure class.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InputMissing { .. } => 1,
            Self::InputMalformed { .. } => 2,
            Self::OutputWrite { .. } => 3,
        }
    }

    /// An input that could not be opened is missing; one that opened but is
    /// not valid UTF-8 or JSON is malformed.
    fn from_io(path: &Path, err: std::io::Error) -> Self {
        let path = path.display().to_string();
        match err.kind() {
            ErrorKind::InvalidData | ErrorKind::UnexpectedEof => Self::InputMalformed {
                path,
                source: err.into(),
            },
            _ => Self::InputMissing {
                path,
                source: err.into(),
            },
        }
    }

    fn from_input(path: &Path, err: StoreError) -> Self {
        match err {
            StoreError::Read { source, .. } => Self::from_io(path, source),
            StoreError::Malformed { .. } | StoreError::Write { .. } => Self::InputMalformed {
                path: path.display().to_string(),
                source: err.into(),
            },
        }
    }

    fn from_config(path: &Path, err: ConfigError) -> Self {
        let path = path.display().to_string();
        match err {
            ConfigError::Read { .. } => Self::InputMissing {
                path,
                source: err.into(),
            },
            _ => Self::InputMalformed {
                path,
                source: err.into(),
            },
        }
    }

    fn output(path: &Path, err: StoreError) -> Self {
        Self::OutputWrite {
            path: path.display().to_string(),
            source: err.into(),
        }
    }
}

/// Everything one batch run produced, in input order.
#[derive(Debug, Default)]
pub struct Generated {
    pub records: Vec<CurveRecord>,
    pub main_stats: Vec<SpeciesAttributes>,
    pub base_stats: Vec<DerivedAttributes>,
    /// Species that could not be fetched, with the reason.
    pub skipped: Vec<(String, FetchError)>,
}

/// Read the batch input as a list of species to process.
pub fn load_inputs(config: &GenerateConfig) -> Result<Vec<SpeciesInput>, BatchError> {
    let path = &config.input;
    let inputs = match config.input_kind {
        InputKind::Records => read_jsonl::<pokeapi::Pokemon>(path)
            .map_err(|err| BatchError::from_input(path, err))?
            .into_iter()
            .map(SpeciesInput::from)
            .collect::<Vec<_>>(),
        InputKind::Listing => {
            let json = std::fs::read_to_string(path).map_err(|err| BatchError::from_io(path, err))?;
            let listing: pokeapi::Listing = serde_json::from_str(&json).map_err(|err| BatchError::InputMalformed {
                path: path.display().to_string(),
                source: err.into(),
            })?;
            listing.results.into_iter().map(SpeciesInput::from).collect()
        }
    };

    tracing::info!("Loaded {} species from {}", inputs.len(), path.display());
    Ok(inputs)
}

/// Resolve, convert and build curves for every input.
///
/// A species whose stats cannot be fetched is logged and skipped; its position
/// still counts towards `ndex`.
pub fn build(
    inputs: &[SpeciesInput],
    source: &dyn AttributeSource,
    table: &ModifierTable,
    bonus: u32,
    fetch_delay: Duration,
) -> Generated {
    let mut generated = Generated::default();

    let mut fetched_before = false;
    let mut resolved = Vec::with_capacity(inputs.len());
    for (i, input) in inputs.iter().enumerate() {
        let ndex = i as u32 + 1;
        if matches!(input, SpeciesInput::ByReference { .. }) {
            if fetched_before && !fetch_delay.is_zero() {
                std::thread::sleep(fetch_delay);
            }
            fetched_before = true;
        }

        tracing::info!("Processing #{ndex}: {}", input.name());
        match input.resolve(source) {
            Ok(attrs) => resolved.push((ndex, attrs)),
            Err(err) => {
                tracing::warn!(name = input.name(), error = %err, "skipping species");
                generated.skipped.push((input.name().to_string(), err));
            }
        }
    }

    let built = resolved
        .into_par_iter()
        .map(|(ndex, attrs)| {
            let stats = attrs.derive().balanced(table);
            let record = CurveRecord {
                ndex,
                name: attrs.name.clone(),
                curve: PowerCurve::build(&stats, table, bonus),
            };
            (attrs, stats, record)
        })
        .collect::<Vec<_>>();

    for (attrs, stats, record) in built {
        generated.main_stats.push(attrs);
        generated.base_stats.push(stats);
        generated.records.push(record);
    }
    generated
}

/// Write every configured output.
///
/// The curve JSONL goes last, so it is only replaced once the document store
/// built from the same records is in place.
pub fn write(generated: &Generated, config: &GenerateConfig) -> Result<(), BatchError> {
    if let Some(path) = &config.main_stats_output {
        write_jsonl(path, &generated.main_stats).map_err(|err| BatchError::output(path, err))?;
    }
    if let Some(path) = &config.base_stats_output {
        write_jsonl(path, &generated.base_stats).map_err(|err| BatchError::output(path, err))?;
    }

    if let Some(dir) = &config.store_dir {
        CurveStore::from_records(generated.records.iter().cloned())
            .save_documents(dir)
            .map_err(|err| BatchError::output(dir, err))?;
    }

    write_jsonl(&config.output, &generated.records).map_err(|err| BatchError::output(&config.output, err))?;
    tracing::info!("Hundo CP data for {} species written to {}", generated.records.len(), config.output.display());
    Ok(())
}

/// The whole batch with the catalog from the config.
pub fn run(config: &Config) -> Result<Generated, BatchError> {
    let source = PokeApi::new(config.generate.catalog_url.clone());
    run_with(config, &source)
}

pub fn run_with(config: &Config, source: &dyn AttributeSource) -> Result<Generated, BatchError> {
    let table = config.modifier_table().map_err(|err| {
        let path = config.cpm_table.as_deref().unwrap_or(Path::new("<embedded>"));
        BatchError::from_config(path, err)
    })?;

    let settings = &config.generate;
    let inputs = load_inputs(settings)?;
    let generated = build(
        &inputs,
        source,
        &table,
        settings.bonus,
        Duration::from_millis(settings.fetch_delay_ms),
    );
    if !generated.skipped.is_empty() {
        tracing::warn!("{} species skipped", generated.skipped.len());
    }

    write(&generated, settings)?;
    Ok(generated)
}
