//! Online check: screenshot in, hundo verdict out.
//!
//! banner crop → text recognition → claim parsing → curve lookup. Each step
//! that can come up empty has its own `Verdict` so the caller can tell the user
//! what went wrong; only a broken image is an error.

use serde::Serialize;

use data::{Lookup, StoreHandle};

/// What we could tell about one screenshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Verdict {
    /// The reported CP is a hundo CP at `level`.
    Hundo { text: String, name: String, cp: u32, level: u8 },
    /// Known species, but no level has this CP at 15/15/15.
    NotHundo { text: String, name: String, cp: u32 },
    UnknownSpecies { text: String, name: String, cp: u32 },
    /// Text was read but has no `<name> CP <number>`.
    Unreadable { text: String, reason: String },
    /// The recognizer returned nothing.
    NoText,
    /// No banner-shaped region in the screenshot.
    NoBanner { reason: String },
}

impl Verdict {
    pub fn is_hundo(&self) -> bool {
        matches!(self, Self::Hundo { .. })
    }

    /// Short message suitable for showing to the user.
    pub fn message(&self) -> String {
        match self {
            Self::Hundo { name, cp, level, .. } => format!("{name} at CP {cp} is a hundo (level {level})"),
            Self::NotHundo { name, cp, .. } => format!("{name} at CP {cp} is not a hundo"),
            Self::UnknownSpecies { name, .. } => format!("unknown species \"{name}\""),
            Self::Unreadable { .. } => "could not extract name and CP from the image".to_string(),
            Self::NoText => "no text detected".to_string(),
            Self::NoBanner { .. } => "could not interpret image".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// Malformed image bytes, or the crop could not be re-encoded.
    #[error(transparent)]
    Image(ie::LocateError),
}

/// One line of `hundo` output.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub file: &'a str,
    pub hundo: bool,
    pub message: String,
    #[serde(flatten)]
    pub verdict: &'a Verdict,
}

impl<'a> Report<'a> {
    pub fn new(file: &'a str, verdict: &'a Verdict) -> Self {
        Self {
            file,
            hundo: verdict.is_hundo(),
            message: verdict.message(),
            verdict,
        }
    }
}

pub struct Checker {
    ie: ie::Ie,
    store: StoreHandle,
}

impl Checker {
    pub fn new(ie: ie::Ie, store: StoreHandle) -> Self {
        Self { ie, store }
    }

    /// Handle for publishing a rebuilt store while checks are running.
    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    pub fn check(&self, screenshot: &[u8]) -> Result<Verdict, CheckError> {
        let banner = match self.ie.banner(screenshot) {
            Ok(banner) => banner,
            Err(err) if err.is_not_found() => {
                tracing::info!(reason = %err, "no banner in screenshot");
                return Ok(Verdict::NoBanner { reason: err.to_string() });
            }
            Err(err) => return Err(CheckError::Image(err)),
        };
        tracing::debug!(rect = ?banner.rect, bytes = banner.bytes.len(), "cropped banner");

        let Some(text) = self.ie.recognize(&banner.bytes) else {
            return Ok(Verdict::NoText);
        };
        tracing::debug!(text, "recognized banner text");

        let claim = match ie::parse_claim(&text) {
            Ok(claim) => claim,
            Err(err) => {
                return Ok(Verdict::Unreadable {
                    text,
                    reason: err.to_string(),
                });
            }
        };

        let name = data::normalize_name(&claim.name);
        let cp = claim.cp;
        let verdict = match self.store.snapshot().match_level(&name, cp) {
            Lookup::Matched(level) => Verdict::Hundo { text, name, cp, level },
            Lookup::NoMatch => Verdict::NotHundo { text, name, cp },
            Lookup::UnknownSpecies => Verdict::UnknownSpecies { text, name, cp },
        };
        tracing::info!(outcome = %verdict.message(), "checked screenshot");
        Ok(verdict)
    }
}
