//! Template tracker based on zero-mean normalized cross-correlation (ZNCC).
//!
//! On initialization a square patch around the seed is sampled and stored as a
//! zero-mean template. Each subsequent frame is searched in a square window
//! around the last position; the best integer offset is refined to sub-pixel
//! accuracy with a separable parabola fit over the neighbouring scores.

use crate::TrackingAlgorithm;
use dove_eye_core::{sample_bilinear, Frame, GrayImageView};
use log::trace;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Configuration of [`TemplateTracker`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateTrackerParams {
    /// Template radius in pixels; the template is `(2 * half_size + 1)^2`.
    pub half_size: usize,
    /// Search radius in pixels around the previous position.
    pub search_radius: usize,
    /// Minimal ZNCC score in `[-1, 1]` accepted as a match.
    pub min_score: f64,
    /// Minimal intensity standard deviation of a patch. Flatter patches are
    /// rejected as templates and scored as non-matches.
    pub min_std: f64,
}

impl Default for TemplateTrackerParams {
    fn default() -> Self {
        Self {
            half_size: 7,
            search_radius: 12,
            min_score: 0.8,
            min_std: 4.0,
        }
    }
}

#[derive(Clone, Debug)]
struct Template {
    /// Zero-mean intensities, row-major.
    values: Vec<f64>,
    norm: f64,
}

/// Single-point ZNCC template tracker.
#[derive(Clone, Debug)]
pub struct TemplateTracker {
    params: TemplateTrackerParams,
    template: Option<Template>,
    position: Point2<f64>,
}

impl Default for TemplateTracker {
    fn default() -> Self {
        Self::new(TemplateTrackerParams::default())
    }
}

impl TemplateTracker {
    pub fn new(params: TemplateTrackerParams) -> Self {
        Self {
            params,
            template: None,
            position: Point2::origin(),
        }
    }

    #[inline]
    pub fn params(&self) -> &TemplateTrackerParams {
        &self.params
    }

    /// Zero-mean patch around `center`, with its L2 norm and standard deviation.
    fn sample_patch(&self, image: &GrayImageView<'_>, center: Point2<f64>) -> (Vec<f64>, f64, f64) {
        let h = self.params.half_size as i64;
        let side = (2 * h + 1) as usize;
        let mut values = Vec::with_capacity(side * side);
        for dy in -h..=h {
            for dx in -h..=h {
                values.push(sample_bilinear(
                    image,
                    center.x + dx as f64,
                    center.y + dy as f64,
                ));
            }
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let mut sq = 0.0;
        for v in values.iter_mut() {
            *v -= mean;
            sq += *v * *v;
        }
        (values, sq.sqrt(), (sq / n).sqrt())
    }

    fn score(&self, image: &GrayImageView<'_>, center: Point2<f64>, template: &Template) -> f64 {
        if !image.contains(center.x, center.y, self.params.half_size as f64) {
            return -1.0;
        }
        let (values, norm, std) = self.sample_patch(image, center);
        if std < self.params.min_std || norm <= f64::EPSILON {
            return -1.0;
        }
        let dot: f64 = values
            .iter()
            .zip(&template.values)
            .map(|(a, b)| a * b)
            .sum();
        dot / (norm * template.norm)
    }
}

/// Vertex offset of the parabola through `(-1, left)`, `(0, mid)`, `(1, right)`.
fn parabola_offset(left: f64, mid: f64, right: f64) -> f64 {
    let denom = left - 2.0 * mid + right;
    if denom >= 0.0 {
        return 0.0;
    }
    (0.5 * (left - right) / denom).clamp(-0.5, 0.5)
}

impl TrackingAlgorithm for TemplateTracker {
    fn box_clone(&self) -> Box<dyn TrackingAlgorithm> {
        // Configuration only; a clone starts without a template.
        Box::new(TemplateTracker::new(self.params))
    }

    fn initialize_tracking(&mut self, frame: &Frame, seed: Point2<f64>) -> Option<Point2<f64>> {
        let image = frame.image.view();
        if !image.contains(seed.x, seed.y, self.params.half_size as f64) {
            trace!("seed ({:.1}, {:.1}) too close to the border", seed.x, seed.y);
            return None;
        }
        let (values, norm, std) = self.sample_patch(&image, seed);
        if std < self.params.min_std {
            trace!("seed patch too flat (std {std:.2})");
            return None;
        }

        self.template = Some(Template { values, norm });
        self.position = seed;
        Some(seed)
    }

    fn track(&mut self, frame: &Frame) -> Option<Point2<f64>> {
        let template = self.template.as_ref()?;
        let image = frame.image.view();
        let r = self.params.search_radius as i64;
        let side = (2 * r + 1) as usize;

        let mut scores = vec![-1.0; side * side];
        let mut best = (0usize, -1.0f64);
        for (iy, dy) in (-r..=r).enumerate() {
            for (ix, dx) in (-r..=r).enumerate() {
                let center = Point2::new(self.position.x + dx as f64, self.position.y + dy as f64);
                let score = self.score(&image, center, template);
                let idx = iy * side + ix;
                scores[idx] = score;
                if score > best.1 {
                    best = (idx, score);
                }
            }
        }

        let (idx, score) = best;
        if score < self.params.min_score {
            trace!("best score {score:.3} below threshold");
            return None;
        }

        let (ix, iy) = (idx % side, idx / side);
        let at = |x: usize, y: usize| scores[y * side + x];
        let sub_x = if ix > 0 && ix + 1 < side {
            parabola_offset(at(ix - 1, iy), score, at(ix + 1, iy))
        } else {
            0.0
        };
        let sub_y = if iy > 0 && iy + 1 < side {
            parabola_offset(at(ix, iy - 1), score, at(ix, iy + 1))
        } else {
            0.0
        };

        self.position = Point2::new(
            self.position.x + (ix as i64 - r) as f64 + sub_x,
            self.position.y + (iy as i64 - r) as f64 + sub_y,
        );
        Some(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use dove_eye_core::GrayImage;

    fn blob_frame(cx: f64, cy: f64) -> Frame {
        let image = GrayImage::from_fn(64, 64, |x, y| {
            let d2 = (x as f64 - cx).powi(2) + (y as f64 - cy).powi(2);
            (20.0 + 200.0 * (-d2 / (2.0 * 9.0)).exp()) as u8
        });
        Frame::new(0.0, image)
    }

    #[test]
    fn parabola_vertex() {
        assert_abs_diff_eq!(parabola_offset(0.5, 1.0, 0.5), 0.0);
        assert!(parabola_offset(0.9, 1.0, 0.5) < 0.0);
        assert_eq!(parabola_offset(1.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn follows_moving_blob() {
        let mut tracker = TemplateTracker::default();
        let seed = Point2::new(30.0, 30.0);
        assert_eq!(
            tracker.initialize_tracking(&blob_frame(30.0, 30.0), seed),
            Some(seed)
        );

        let p = tracker.track(&blob_frame(35.0, 33.0)).expect("tracked");
        assert_abs_diff_eq!(p.x, 35.0, epsilon = 1e-3);
        assert_abs_diff_eq!(p.y, 33.0, epsilon = 1e-3);

        let p = tracker.track(&blob_frame(31.0, 36.0)).expect("tracked");
        assert_abs_diff_eq!(p.x, 31.0, epsilon = 1e-3);
        assert_abs_diff_eq!(p.y, 36.0, epsilon = 1e-3);
    }

    #[test]
    fn rejects_flat_or_border_seeds() {
        let mut tracker = TemplateTracker::new(TemplateTrackerParams::default());
        let flat = Frame::new(0.0, GrayImage::filled(64, 64, 90));
        assert!(tracker
            .initialize_tracking(&flat, Point2::new(30.0, 30.0))
            .is_none());
        assert!(tracker
            .initialize_tracking(&blob_frame(3.0, 3.0), Point2::new(3.0, 3.0))
            .is_none());
    }

    #[test]
    fn loses_vanished_blob() {
        let mut tracker = TemplateTracker::new(TemplateTrackerParams::default());
        assert!(tracker
            .initialize_tracking(&blob_frame(30.0, 30.0), Point2::new(30.0, 30.0))
            .is_some());
        let flat = Frame::new(0.0, GrayImage::filled(64, 64, 20));
        assert!(tracker.track(&flat).is_none());
    }

    #[test]
    fn track_without_template_fails() {
        let mut tracker = TemplateTracker::default();
        assert!(tracker.track(&blob_frame(30.0, 30.0)).is_none());
    }

    #[test]
    fn clone_starts_without_template() {
        let mut tracker = TemplateTracker::new(TemplateTrackerParams {
            search_radius: 4,
            ..TemplateTrackerParams::default()
        });
        assert!(tracker
            .initialize_tracking(&blob_frame(30.0, 30.0), Point2::new(30.0, 30.0))
            .is_some());
        let mut clone = tracker.box_clone();
        assert!(clone.track(&blob_frame(30.0, 30.0)).is_none());
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let params: TemplateTrackerParams =
            serde_json::from_str(r#"{ "search_radius": 20 }"#).expect("params");
        assert_eq!(params.search_radius, 20);
        assert_eq!(params.half_size, 7);
    }
}
