use crate::extractor::error::ExtractError;
use crate::extractor::face::{FaceBox, FaceDetector};
use crate::extractor::frame::GrayFrame;
use crate::extractor::segmenter::{LipSegmenter, SegmenterConfig};
use crate::extractor::summary::{ClipSummary, RatioAccumulator};
use crate::extractor::video::FrameSource;

/// Drives a frame source through face detection and lip segmentation and
/// reduces the clip to one `ClipSummary`. Per-frame results are discarded
/// after aggregation.
pub struct ClipAnalyzer {
    segmenter: LipSegmenter,
}

impl ClipAnalyzer {
    pub fn new() -> Self {
        Self::with_config(SegmenterConfig::default())
    }

    pub fn with_config(config: SegmenterConfig) -> Self {
        Self {
            segmenter: LipSegmenter::with_config(config),
        }
    }

    /// Ratio for a single frame, or `None` when the frame is unusable
    /// (no face, empty ROI, or no qualifying lip region).
    pub fn process_frame(
        &self,
        frame: &GrayFrame,
        detector: &mut dyn FaceDetector,
    ) -> Result<Option<f64>, ExtractError> {
        let faces = detector.detect(frame)?;
        let face = match largest_face(&faces) {
            Some(face) => face,
            None => return Ok(None),
        };

        let roi = frame.roi(face.x, face.y, face.width, face.height);
        if roi.is_empty() {
            return Ok(None);
        }

        Ok(self.segmenter.lip_ratio(&roi))
    }

    /// Consumes the source to end of stream. Fails with `NoLipDetected`
    /// when not a single frame yielded a ratio.
    pub fn analyze(
        &self,
        source: &mut dyn FrameSource,
        detector: &mut dyn FaceDetector,
        video_label: &str,
    ) -> Result<ClipSummary, ExtractError> {
        let mut accumulator = RatioAccumulator::new();
        let mut scanned = 0u64;

        while let Some(frame) = source.next_frame()? {
            scanned += 1;
            if let Some(ratio) = self.process_frame(&frame, detector)? {
                accumulator.push(ratio);
            }
        }

        log::info!(
            "🎬 {}: {} of {} frames usable",
            video_label,
            accumulator.len(),
            scanned
        );

        accumulator
            .summarize(video_label)
            .ok_or(ExtractError::NoLipDetected)
    }
}

impl Default for ClipAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Most prominent face wins; earlier boxes win area ties.
fn largest_face(faces: &[FaceBox]) -> Option<FaceBox> {
    let mut best: Option<FaceBox> = None;
    for &face in faces {
        if best.map_or(true, |b| face.area() > b.area()) {
            best = Some(face);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::face::MockFaceDetector;
    use crate::extractor::video::MockFrameSource;

    /// Face-sized canvas with a dark `rect` (in frame coordinates) on a
    /// bright background.
    fn face_frame(rect: (u32, u32, u32, u32), frame_number: u64) -> GrayFrame {
        let mut frame = GrayFrame::filled(100, 100, 200, frame_number);
        let (rx, ry, rw, rh) = rect;
        for y in ry..ry + rh {
            for x in rx..rx + rw {
                frame.set_pixel(x, y, 10);
            }
        }
        frame
    }

    #[test]
    fn test_largest_face_selection() {
        let faces = [
            FaceBox::new(0, 0, 10, 10),
            FaceBox::new(0, 0, 40, 40),
            FaceBox::new(0, 0, 20, 20),
        ];
        assert_eq!(largest_face(&faces).unwrap(), FaceBox::new(0, 0, 40, 40));
        assert!(largest_face(&[]).is_none());
    }

    #[test]
    fn test_process_frame_ratio() {
        // 20x10 dark region inside the face box
        let frame = face_frame((40, 45, 20, 10), 0);
        let mut detector = MockFaceDetector::always(FaceBox::new(30, 35, 60, 40));
        let analyzer = ClipAnalyzer::new();

        let ratio = analyzer.process_frame(&frame, &mut detector).unwrap();
        assert!((ratio.unwrap() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_process_frame_without_face() {
        let frame = face_frame((40, 45, 20, 10), 0);
        let mut detector = MockFaceDetector::new();
        let analyzer = ClipAnalyzer::new();

        let ratio = analyzer.process_frame(&frame, &mut detector).unwrap();
        assert!(ratio.is_none());
    }

    #[test]
    fn test_process_frame_prefers_largest_face() {
        // lip region only under the larger of the two boxes
        let frame = face_frame((40, 45, 20, 10), 0);
        let mut detector = MockFaceDetector::with_pattern(|_| {
            vec![FaceBox::new(0, 0, 20, 20), FaceBox::new(30, 35, 60, 40)]
        });
        let analyzer = ClipAnalyzer::new();

        let ratio = analyzer.process_frame(&frame, &mut detector).unwrap();
        assert!(ratio.is_some());
    }

    #[test]
    fn test_analyze_aggregates_usable_frames() {
        let mut source = MockFrameSource::new(vec![
            face_frame((40, 45, 20, 10), 0),
            GrayFrame::filled(100, 100, 200, 1), // face but nothing dark
            face_frame((40, 45, 30, 10), 2),
        ]);
        let mut detector = MockFaceDetector::always(FaceBox::new(30, 35, 65, 40));
        let analyzer = ClipAnalyzer::new();

        let summary = analyzer
            .analyze(&mut source, &mut detector, "clip.mp4")
            .unwrap();
        assert_eq!(summary.frame_count, 2);
        assert_eq!(summary.video, "clip.mp4");
        assert!((summary.min_ratio - 2.0).abs() < 1e-5);
        assert!((summary.max_ratio - 3.0).abs() < 1e-5);
        assert!((summary.avg_ratio - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_analyze_fails_without_detections() {
        let mut source = MockFrameSource::new(vec![
            face_frame((40, 45, 20, 10), 0),
            face_frame((40, 45, 20, 10), 1),
        ]);
        let mut detector = MockFaceDetector::new();
        let analyzer = ClipAnalyzer::new();

        let err = analyzer
            .analyze(&mut source, &mut detector, "clip.mp4")
            .unwrap_err();
        assert!(matches!(err, ExtractError::NoLipDetected));
    }
}
