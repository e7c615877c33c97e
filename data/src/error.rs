use std::path::PathBuf;

/// Invalid or unreadable configuration. Always fatal for the run.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read {path}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("malformed CP multiplier table")]
	Parse(#[from] serde_json::Error),

	#[error("CP multiplier table is missing levels {0:?}")]
	MissingLevels(Vec<u8>),

	#[error("CP multiplier for level {level} is not positive ({value})")]
	NonPositive { level: u8, value: f64 },

	#[error("CP multiplier table decreases at level {level}")]
	Decreasing { level: u8 },
}

/// Failure to obtain one species' stats. The batch skips the species and continues.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
	#[error("species not found: {0}")]
	NotFound(String),

	#[error("failed to fetch {reference}")]
	Transient {
		reference: String,
		#[source]
		source: Box<dyn std::error::Error + Send + Sync>,
	},

	#[error("unusable record for {reference}: {message}")]
	Malformed { reference: String, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("failed to read curve store {path}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("malformed curve record in {path} (line {line})")]
	Malformed {
		path: PathBuf,
		line: usize,
		#[source]
		source: serde_json::Error,
	},

	#[error("failed to write curve store {path}")]
	Write {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}
