//! Text recognition.
//!
//! The pipeline only needs "encoded image in, text out", expressed by
//! [`TextRecognizer`]. The bundled implementation is `ocr-rs` (Rust PaddleOCR
//! bindings). OCR engines are sensitive to glyph size, so small crops are
//! upscaled before recognition.

use std::path::Path;

use anyhow::Context;

use crate::OwnedImage;

/// Crops shorter than this are upscaled before OCR.
const MIN_HEIGHT: u32 = 80;

pub trait TextRecognizer: Send + Sync {
    /// Text found in `encoded` (PNG/JPEG bytes), or `None` when recognition
    /// failed or produced nothing.
    fn recognize(&self, encoded: &[u8]) -> Option<String>;
}

pub struct Ocr {
    engine: ocr_rs::OcrEngine,
}

impl Ocr {
    /// Initialize the OCR engine with the given model paths.
    pub fn try_new(
        detection: impl AsRef<Path>,
        recognition: impl AsRef<Path>,
        charsset: impl AsRef<Path>,
    ) -> anyhow::Result<Self> {
        let thread_count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        let engine = ocr_rs::OcrEngine::new(
            detection,
            recognition,
            charsset,
            Some(ocr_rs::OcrEngineConfig {
                backend: ocr_rs::Backend::CPU,
                thread_count: thread_count as i32,
                // Banner text is large and high-contrast; High still helps with
                // the stylized digits at a CPU cost.
                precision_mode: ocr_rs::PrecisionMode::High,
                enable_parallel: thread_count > 1,
                min_result_confidence: 0.5,
                ..Default::default()
            }),
        )
        .context("failed to initialize OCR engine (missing or invalid model files?)")?;

        Ok(Self { engine })
    }

    /// Recognize text in an RGB image, one line per detected text box.
    pub fn get_text(&self, rgb: &image::RgbImage) -> String {
        let image = ocr_rs::preprocess::rgb_to_image(rgb.as_raw(), rgb.width(), rgb.height());

        match self.engine.recognize(&image) {
            Ok(results) => results
                .into_iter()
                .map(|v| v.text)
                .collect::<Vec<_>>()
                .join("\n"),
            Err(err) => {
                tracing::warn!(error = %err, "OCR failed");
                String::new()
            }
        }
    }
}

impl TextRecognizer for Ocr {
    fn recognize(&self, encoded: &[u8]) -> Option<String> {
        let image = match OwnedImage::decode(encoded) {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!(error = %err, "OCR input is not a decodable image");
                return None;
            }
        };

        let image = if image.height() < MIN_HEIGHT {
            image
                .resized_h(MIN_HEIGHT)
                .inspect_err(|err| tracing::warn!(error = %err, "failed to upscale OCR input"))
                .ok()?
        } else {
            image
        };

        let text = self.get_text(image.as_rgb());
        tracing::debug!(text, "OCR result");
        (!text.trim().is_empty()).then_some(text)
    }
}
