use std::env;
use std::path::{Path, PathBuf};

use opencv::core::{Mat, Rect, Size, Vector};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;

use crate::extractor::error::ExtractError;
use crate::extractor::frame::GrayFrame;

/// Axis-aligned face bounding box in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl From<Rect> for FaceBox {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x.max(0) as u32,
            y: rect.y.max(0) as u32,
            width: rect.width.max(0) as u32,
            height: rect.height.max(0) as u32,
        }
    }
}

pub trait FaceDetector {
    fn detect(&mut self, frame: &GrayFrame) -> Result<Vec<FaceBox>, ExtractError>;
}

/// Frontal-face detector backed by a pretrained OpenCV Haar cascade.
/// Constructed explicitly and owned by the caller; there is no process-wide
/// detector instance.
pub struct HaarFaceDetector {
    cascade: CascadeClassifier,
    scale_factor: f64,
    min_neighbors: i32,
}

impl HaarFaceDetector {
    pub const DEFAULT_SCALE_FACTOR: f64 = 1.3;
    pub const DEFAULT_MIN_NEIGHBORS: i32 = 5;

    pub fn from_file(cascade_path: &Path) -> Result<Self, ExtractError> {
        let path_str = cascade_path
            .to_str()
            .ok_or_else(|| ExtractError::Cascade(cascade_path.display().to_string()))?;

        let cascade = CascadeClassifier::new(path_str)
            .map_err(|e| ExtractError::Cascade(format!("{}: {}", path_str, e)))?;
        if cascade.empty()? {
            return Err(ExtractError::Cascade(path_str.to_string()));
        }

        log::debug!("loaded Haar cascade from {}", path_str);
        Ok(Self {
            cascade,
            scale_factor: Self::DEFAULT_SCALE_FACTOR,
            min_neighbors: Self::DEFAULT_MIN_NEIGHBORS,
        })
    }
}

impl FaceDetector for HaarFaceDetector {
    fn detect(&mut self, frame: &GrayFrame) -> Result<Vec<FaceBox>, ExtractError> {
        if frame.is_empty() {
            return Ok(Vec::new());
        }

        let flat = Mat::from_slice(&frame.data)?;
        let image = flat.reshape(1, frame.height as i32)?;

        let mut faces = Vector::<Rect>::new();
        self.cascade.detect_multi_scale(
            &*image,
            &mut faces,
            self.scale_factor,
            self.min_neighbors,
            0,
            Size::default(),
            Size::default(),
        )?;

        Ok(faces.iter().map(FaceBox::from).collect())
    }
}

/// Well-known install locations for the frontal-face cascade, probed in
/// order. `LIPREADER_CASCADE` takes precedence over all of them.
const CASCADE_CANDIDATES: &[&str] = &[
    "/usr/share/opencv4/haarcascades/haarcascade_frontalface_default.xml",
    "/usr/local/share/opencv4/haarcascades/haarcascade_frontalface_default.xml",
    "/usr/share/opencv/haarcascades/haarcascade_frontalface_default.xml",
    "/opt/homebrew/share/opencv4/haarcascades/haarcascade_frontalface_default.xml",
];

pub fn default_cascade_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("LIPREADER_CASCADE") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    CASCADE_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Scripted detector for pipeline tests.
pub struct MockFaceDetector {
    pattern: Option<Box<dyn Fn(u64) -> Vec<FaceBox>>>,
}

impl MockFaceDetector {
    /// Never reports a face.
    pub fn new() -> Self {
        Self { pattern: None }
    }

    /// Reports the same single face on every frame.
    pub fn always(face: FaceBox) -> Self {
        Self::with_pattern(move |_| vec![face])
    }

    pub fn with_pattern<F>(pattern: F) -> Self
    where
        F: Fn(u64) -> Vec<FaceBox> + 'static,
    {
        Self {
            pattern: Some(Box::new(pattern)),
        }
    }
}

impl Default for MockFaceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceDetector for MockFaceDetector {
    fn detect(&mut self, frame: &GrayFrame) -> Result<Vec<FaceBox>, ExtractError> {
        Ok(self
            .pattern
            .as_ref()
            .map(|p| p(frame.frame_number))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_box_area() {
        let face = FaceBox::new(10, 20, 30, 40);
        assert_eq!(face.area(), 1200);
    }

    #[test]
    fn test_mock_detector_pattern() {
        let mut detector = MockFaceDetector::with_pattern(|n| {
            if n % 2 == 0 {
                vec![FaceBox::new(0, 0, 10, 10)]
            } else {
                Vec::new()
            }
        });

        let even = GrayFrame::filled(4, 4, 0, 2);
        let odd = GrayFrame::filled(4, 4, 0, 3);
        assert_eq!(detector.detect(&even).unwrap().len(), 1);
        assert!(detector.detect(&odd).unwrap().is_empty());
    }

    #[test]
    fn test_mock_detector_default_sees_nothing() {
        let mut detector = MockFaceDetector::new();
        let frame = GrayFrame::filled(4, 4, 0, 0);
        assert!(detector.detect(&frame).unwrap().is_empty());
    }
}
