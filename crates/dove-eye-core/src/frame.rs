use crate::{CameraIndex, GrayImage};

/// Capture time of a frame, in seconds.
pub type Timestamp = f64;

/// One captured image from one camera.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub timestamp: Timestamp,
    pub image: GrayImage,
}

impl Frame {
    pub fn new(timestamp: Timestamp, image: GrayImage) -> Self {
        Self { timestamp, image }
    }
}

/// Synchronized bundle of per-camera frames for one capture instant.
///
/// The number of slots (the arity) is fixed at construction. Each slot is
/// independently valid (`Some`) or invalid (`None`); an invalid slot means the
/// camera delivered nothing usable for this instant.
#[derive(Clone, Debug)]
pub struct Frameset {
    frames: Vec<Option<Frame>>,
}

impl Frameset {
    /// Frameset with `arity` invalid slots.
    pub fn new(arity: usize) -> Self {
        Self {
            frames: vec![None; arity],
        }
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.frames.len()
    }

    /// Frame of camera `cam`, if that slot is valid.
    ///
    /// # Panics
    ///
    /// Panics if `cam >= self.arity()`.
    #[inline]
    pub fn get(&self, cam: CameraIndex) -> Option<&Frame> {
        self.frames[cam].as_ref()
    }

    #[inline]
    pub fn is_valid(&self, cam: CameraIndex) -> bool {
        self.frames[cam].is_some()
    }

    /// Store `frame` in slot `cam` and mark it valid.
    pub fn set(&mut self, cam: CameraIndex, frame: Frame) {
        self.frames[cam] = Some(frame);
    }

    /// Mark slot `cam` invalid, dropping its frame.
    pub fn invalidate(&mut self, cam: CameraIndex) {
        self.frames[cam] = None;
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&Frame>> {
        self.frames.iter().map(Option::as_ref)
    }
}

impl FromIterator<Option<Frame>> for Frameset {
    fn from_iter<I: IntoIterator<Item = Option<Frame>>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_start_invalid() {
        let fs = Frameset::new(3);
        assert_eq!(fs.arity(), 3);
        assert!((0..3).all(|cam| !fs.is_valid(cam)));
    }

    #[test]
    fn set_and_invalidate() {
        let mut fs = Frameset::new(2);
        fs.set(1, Frame::new(0.5, GrayImage::filled(4, 4, 7)));
        assert!(!fs.is_valid(0));
        assert_eq!(fs.get(1).map(|f| f.timestamp), Some(0.5));
        fs.invalidate(1);
        assert!(fs.get(1).is_none());
    }

    #[test]
    fn collect_from_options() {
        let fs: Frameset = vec![Some(Frame::default()), None].into_iter().collect();
        assert_eq!(fs.arity(), 2);
        assert_eq!(fs.iter().filter(Option::is_some).count(), 1);
    }
}
