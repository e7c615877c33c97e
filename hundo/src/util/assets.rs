//! Locating the OCR model files shipped next to the binaries.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

/// Model files for one recognition language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrAssets {
	pub detection: PathBuf,
	pub recognition: PathBuf,
	pub charset: PathBuf,
}

impl OcrAssets {
	/// Paths the models would have inside `ocr_dir`.
	fn in_dir(ocr_dir: &Path, lang_code: &str) -> Self {
		Self {
			detection: ocr_dir.join("detection.mnn"),
			recognition: ocr_dir.join(format!("{lang_code}_recognition.mnn")),
			charset: ocr_dir.join(format!("{lang_code}_charset.txt")),
		}
	}

	fn complete(&self) -> bool {
		[&self.detection, &self.recognition, &self.charset]
			.into_iter()
			.all(|path| path.is_file())
	}
}

/// `base` itself when it holds the models, else `base/ocr`.
fn ocr_dir(base: PathBuf) -> PathBuf {
	if base.join("detection.mnn").is_file() {
		base
	} else {
		base.join("ocr")
	}
}

/// Search order: `HUNDO_ASSETS_DIR`, the executable's directory, the working
/// directory, and in debug builds the workspace root.
fn search_roots() -> Vec<PathBuf> {
	let mut roots = Vec::new();
	roots.extend(std::env::var_os("HUNDO_ASSETS_DIR").map(PathBuf::from));
	roots.extend(
		std::env::current_exe()
			.ok()
			.and_then(|exe| exe.parent().map(Path::to_path_buf)),
	);
	roots.extend(std::env::current_dir().ok());
	#[cfg(debug_assertions)]
	roots.push(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(".."));
	roots
}

fn find_in(roots: impl IntoIterator<Item = PathBuf>, lang_code: &str) -> Result<OcrAssets> {
	let mut searched = Vec::new();
	for root in roots {
		let dir = ocr_dir(root);
		let assets = OcrAssets::in_dir(&dir, lang_code);
		if assets.complete() {
			tracing::debug!(dir = %dir.display(), "found OCR models");
			return Ok(assets);
		}
		searched.push(format!("  - {}", dir.display()));
	}

	bail!(
		"OCR models for `{lang_code}` not found (need detection.mnn, {lang_code}_recognition.mnn, {lang_code}_charset.txt).\n\
		 Searched:\n{}\n\
		 Put an `ocr/` folder next to the executable or point HUNDO_ASSETS_DIR at it.",
		searched.join("\n")
	)
}

/// Find the OCR models for `lang_code` (e.g. `latin`).
pub fn resolve_ocr_assets(lang_code: &str) -> Result<OcrAssets> {
	find_in(search_roots(), lang_code)
}
