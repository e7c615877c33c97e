//! Species name and CP from the banner's recognized text.

use std::sync::LazyLock;

use regex::Regex;

static NOISE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\s]").expect("regex"));
static NON_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-zA-Z\s]").expect("regex"));
static NAME_CP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?<name>[a-zA-Z\s]+?)\s*CP\s*(?<cp>\d+)").expect("regex"));

/// What the banner says: species name and CP.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Claim {
    pub name: String,
    pub cp: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimError {
    #[error("no `<name> CP <number>` in the recognized text")]
    NoMatch,
    #[error("CP `{0}` is out of range")]
    CpOutOfRange(String),
    #[error("no species name before the CP")]
    EmptyName,
}

/// Parse `"<name> CP <digits>"` out of OCR output.
///
/// Symbols are dropped first, so `"Mr. Mime CP1234"` reads as `Mr Mime`. The
/// OCR tends to read the gender glyph in front of the name as a lone `e`; a
/// leading `"e "` is removed.
pub fn parse_claim(text: &str) -> Result<Claim, ClaimError> {
    let cleaned = NOISE.replace_all(text, "");
    let caps = NAME_CP.captures(cleaned.trim()).ok_or(ClaimError::NoMatch)?;

    let name = NON_NAME.replace_all(caps["name"].trim(), "");
    let mut name = name.trim();
    if name.len() > 1 && name.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("e ")) {
        name = name[2..].trim_start();
    }
    if name.is_empty() {
        return Err(ClaimError::EmptyName);
    }

    let digits = &caps["cp"];
    let cp = digits
        .parse::<u32>()
        .map_err(|_| ClaimError::CpOutOfRange(digits.to_string()))?;

    tracing::debug!(name, cp, "parsed claim");
    Ok(Claim {
        name: name.to_string(),
        cp,
    })
}
