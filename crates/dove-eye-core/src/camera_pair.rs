//! Canonical enumeration of unordered camera pairs.
//!
//! Every pair-indexed container in the workspace is sized with [`pairity`] and
//! addressed by [`CameraPair::index`], so the ordering produced here is part of
//! the public contract: outer loop over `cam1` ascending, inner loop over
//! `cam2 > cam1` ascending, indices assigned sequentially.

use crate::{CameraIndex, PairIndex};
use serde::{Deserialize, Serialize};

/// One unordered pair of cameras, `cam1 < cam2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CameraPair {
    pub index: PairIndex,
    pub cam1: CameraIndex,
    pub cam2: CameraIndex,
}

/// Number of unordered pairs in a rig of `camera_count` cameras.
#[inline]
pub fn pairity(camera_count: usize) -> usize {
    camera_count * camera_count.saturating_sub(1) / 2
}

/// Canonical index of the pair `{a, b}` in a rig of `camera_count` cameras.
///
/// Returns `None` when `a == b` or either camera is out of range.
pub fn pair_index(a: CameraIndex, b: CameraIndex, camera_count: usize) -> Option<PairIndex> {
    if a == b || a >= camera_count || b >= camera_count {
        return None;
    }
    let (cam1, cam2) = if a < b { (a, b) } else { (b, a) };
    // Pairs emitted before row `cam1`: sum over k < cam1 of (n - 1 - k).
    let before = cam1 * (2 * camera_count - cam1 - 1) / 2;
    Some(before + (cam2 - cam1 - 1))
}

impl CameraPair {
    /// Generate the canonical pair list for `camera_count` cameras.
    ///
    /// The returned vector has exactly [`pairity`]`(camera_count)` entries and
    /// `result[k].index == k` for every `k`.
    pub fn generate_array(camera_count: usize) -> Vec<CameraPair> {
        let mut result = Vec::with_capacity(pairity(camera_count));
        for cam1 in 0..camera_count {
            for cam2 in (cam1 + 1)..camera_count {
                result.push(CameraPair {
                    index: result.len(),
                    cam1,
                    cam2,
                });
            }
        }
        result
    }

    #[inline]
    pub fn contains(&self, cam: CameraIndex) -> bool {
        self.cam1 == cam || self.cam2 == cam
    }

    /// Partner of `cam` within this pair, or `None` if `cam` is not a member.
    #[inline]
    pub fn other(&self, cam: CameraIndex) -> Option<CameraIndex> {
        if cam == self.cam1 {
            Some(self.cam2)
        } else if cam == self.cam2 {
            Some(self.cam1)
        } else {
            None
        }
    }
}
