//! `hundo`: check whether screenshots show a perfect-IV Pokémon.
//!
//! Usage: `hundo <screenshot>...`. One JSON report per file is printed to
//! stdout; logs go to stderr.

use std::process::ExitCode;

use anyhow::{Context, Result};

use data::{CurveStore, StoreHandle};
use hundo::{util::assets, Checker, Config, Report};

fn main() -> ExitCode {
    hundo::init_tracing();

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Whether every screenshot could be read as an image.
fn run() -> Result<bool> {
    let files = std::env::args().skip(1).collect::<Vec<_>>();
    if files.is_empty() {
        anyhow::bail!("usage: hundo <screenshot>...");
    }

    let config = Config::load_or_default();
    let store = CurveStore::load(&config.store)
        .with_context(|| format!("load curve store {:?}", config.store))?;
    tracing::info!("Loaded hundo curves for {} species", store.len());

    let ocr = assets::resolve_ocr_assets("latin")?;
    let ie = ie::Ie::try_new(config.banner.clone(), ocr.detection, ocr.recognition, ocr.charset)?;
    let checker = Checker::new(ie, StoreHandle::new(store));

    let mut all_checked = true;
    for file in &files {
        let line = match std::fs::read(file)
            .with_context(|| format!("read {file}"))
            .and_then(|bytes| checker.check(&bytes).with_context(|| format!("check {file}")))
        {
            Ok(verdict) => serde_json::to_string(&Report::new(file, &verdict))?,
            Err(err) => {
                all_checked = false;
                tracing::warn!("{err:#}");
                serde_json::json!({ "file": file, "error": format!("{err:#}") }).to_string()
            }
        };
        println!("{line}");
    }
    Ok(all_checked)
}
