mod frame;
pub use frame::*;
mod ocr;
pub use ocr::*;
mod claim;
pub use claim::*;

pub mod screen;
pub use screen::banner::{Banner, BannerConfig, CropFormat, LocateError, Rect};

/// Image engine: finds the name/CP banner in a screenshot and reads it.
pub struct Ie {
	banner: BannerConfig,
	recognizer: Box<dyn TextRecognizer>,
}

impl Ie {
	/// Engine backed by the bundled OCR models.
	pub fn try_new(
		banner: BannerConfig,
		ocr_detection: impl AsRef<std::path::Path>,
		ocr_recognition: impl AsRef<std::path::Path>,
		ocr_charsset: impl AsRef<std::path::Path>,
	) -> anyhow::Result<Self> {
		let ocr = Ocr::try_new(ocr_detection, ocr_recognition, ocr_charsset)?;
		Ok(Self::with_recognizer(banner, ocr))
	}

	/// Engine with any text recognizer (a remote service, a test double).
	pub fn with_recognizer(banner: BannerConfig, recognizer: impl TextRecognizer + 'static) -> Self {
		Self {
			banner,
			recognizer: Box::new(recognizer),
		}
	}

	/// Locate and crop the banner of an encoded screenshot.
	pub fn banner(&self, screenshot: &[u8]) -> Result<Banner, LocateError> {
		screen::banner::crop(screenshot, &self.banner)
	}

	pub fn recognize(&self, encoded: &[u8]) -> Option<String> {
		self.recognizer.recognize(encoded)
	}
}
