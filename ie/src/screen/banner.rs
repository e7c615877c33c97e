//! Name/CP banner localization.
//!
//! The banner is the dark rounded overlay that shows the species name and CP
//! near the top of the capture screen. We look for it as a dark blob: grayscale,
//! blur, threshold, invert, then take the outer contours and keep the highest
//! one that is big enough to not be noise.
//!
//! Every tunable lives in [`BannerConfig`].

use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::filter::gaussian_blur_f32;
use imageproc::point::Point;
use serde::{Deserialize, Serialize};

use crate::{Image, OwnedImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropFormat {
    #[default]
    Jpeg,
    Png,
}

impl CropFormat {
    fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerConfig {
    /// Fraction of the frame height at the top that is never searched (phone status bar).
    pub status_bar_fraction: f32,
    /// Gaussian blur sigma applied before thresholding (1.1 ≈ a 5×5 kernel). `0` disables it.
    pub blur_sigma: f32,
    /// Intensity cutoff; pixels at or below it count as banner.
    pub threshold: u8,
    /// Contours with a polygon area at or below this are noise.
    pub min_area: f64,
    /// Pixels added around the banner's bounding box.
    pub padding: u32,
    pub format: CropFormat,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            status_bar_fraction: 0.08,
            blur_sigma: 1.1,
            threshold: 130,
            min_area: 500.0,
            padding: 8,
            format: CropFormat::Jpeg,
        }
    }
}

/// Axis-aligned rectangle in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    fn right(&self) -> u32 {
        self.x + self.w
    }
    fn bottom(&self) -> u32 {
        self.y + self.h
    }
    fn center_y(&self) -> f64 {
        self.y as f64 + self.h as f64 / 2.0
    }
}

/// The cropped banner, re-encoded.
#[derive(Debug, Clone)]
pub struct Banner {
    pub rect: Rect,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("could not decode image")]
    Decode(#[source] image::ImageError),

    #[error("no dark region found below the status bar")]
    NoContours,

    #[error("none of {candidates} dark regions is larger than {min_area} px²")]
    NoQualifyingRegion { candidates: usize, min_area: f64 },

    #[error("could not encode banner crop")]
    Encode(#[source] image::ImageError),
}

impl LocateError {
    /// The image was fine but has no banner.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoContours | Self::NoQualifyingRegion { .. })
    }
}

/// Decode a screenshot, locate the banner and return it re-encoded.
pub fn crop(bytes: &[u8], config: &BannerConfig) -> Result<Banner, LocateError> {
    let frame = OwnedImage::decode(bytes).map_err(LocateError::Decode)?;
    let rect = locate(frame.as_image(), config)?;

    let bytes = frame
        .as_image()
        .sub_image(rect.x, rect.y, rect.w, rect.h)
        .encode(config.format.image_format())
        .map_err(LocateError::Encode)?;

    Ok(Banner { rect, bytes })
}

/// Padded banner rectangle in `frame` coordinates.
pub fn locate(frame: Image, config: &BannerConfig) -> Result<Rect, LocateError> {
    let (w, h) = (frame.width(), frame.height());

    let excluded = ((h as f32 * config.status_bar_fraction).round().max(0.0) as u32).min(h);
    let search = frame.trimmed_bottom(h - excluded);
    if search.width() == 0 || search.height() == 0 {
        return Err(LocateError::NoContours);
    }

    let gray = search.to_gray_image();
    let gray = if config.blur_sigma > 0.0 {
        gaussian_blur_f32(&gray, config.blur_sigma)
    } else {
        gray
    };
    let mut bin = threshold(&gray, config.threshold, ThresholdType::Binary);
    // Dark banner → white foreground.
    image::imageops::invert(&mut bin);

    let contours = find_contours::<i32>(&bin);
    let external = contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .collect::<Vec<_>>();
    if external.is_empty() {
        return Err(LocateError::NoContours);
    }

    let mut best: Option<Rect> = None;
    for contour in &external {
        if polygon_area(&contour.points) <= config.min_area {
            continue;
        }
        let Some(rect) = bounding_rect(contour) else {
            continue;
        };
        // Strict comparison: on equal centers the earlier contour stays.
        if best.is_none_or(|b| rect.center_y() < b.center_y()) {
            best = Some(rect);
        }
    }

    let Some(best) = best else {
        tracing::debug!(candidates = external.len(), "no contour passed the area filter");
        return Err(LocateError::NoQualifyingRegion {
            candidates: external.len(),
            min_area: config.min_area,
        });
    };

    // Back to frame coordinates, padded and clamped.
    let best = Rect {
        y: best.y + excluded,
        ..best
    };
    let x1 = best.x.saturating_sub(config.padding);
    let y1 = best.y.saturating_sub(config.padding);
    let x2 = best.right().saturating_add(config.padding).min(w);
    let y2 = best.bottom().saturating_add(config.padding).min(h);
    let rect = Rect {
        x: x1,
        y: y1,
        w: x2 - x1,
        h: y2 - y1,
    };

    tracing::debug!(?rect, "banner located");
    Ok(rect)
}

fn bounding_rect(contour: &Contour<i32>) -> Option<Rect> {
    let mut min_x = i32::MAX;
    let mut min_y = i32::MAX;
    let mut max_x = i32::MIN;
    let mut max_y = i32::MIN;

    for p in &contour.points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    if min_x < 0 || min_y < 0 || max_x < min_x || max_y < min_y {
        return None;
    }

    Some(Rect {
        x: min_x as u32,
        y: min_y as u32,
        w: (max_x - min_x + 1) as u32,
        h: (max_y - min_y + 1) as u32,
    })
}

/// Shoelace area of the polygon through the contour's border pixels.
fn polygon_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
        .sum::<i64>();
    twice.abs() as f64 / 2.0
}
