use std::collections::VecDeque;
use std::path::Path;

use opencv::core::Mat;
use opencv::imgproc;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};

use crate::extractor::error::ExtractError;
use crate::extractor::frame::GrayFrame;

/// Sequential, blocking supplier of grayscale frames.
pub trait FrameSource {
    /// `Ok(None)` at end of stream.
    fn next_frame(&mut self) -> Result<Option<GrayFrame>, ExtractError>;
}

/// Decodes a video file frame by frame through OpenCV.
pub struct VideoFileSource {
    capture: VideoCapture,
    frame_number: u64,
}

impl VideoFileSource {
    pub fn open(path: &Path) -> Result<Self, ExtractError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| ExtractError::OpenVideo(path.display().to_string()))?;

        let capture = VideoCapture::from_file(path_str, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(ExtractError::OpenVideo(path.display().to_string()));
        }

        log::debug!("opened video {}", path_str);
        Ok(Self {
            capture,
            frame_number: 0,
        })
    }
}

impl FrameSource for VideoFileSource {
    fn next_frame(&mut self) -> Result<Option<GrayFrame>, ExtractError> {
        let mut bgr = Mat::default();
        if !self.capture.read(&mut bgr)? {
            return Ok(None);
        }

        let mut gray = Mat::default();
        imgproc::cvt_color_def(&bgr, &mut gray, imgproc::COLOR_BGR2GRAY)?;

        let frame = GrayFrame::new(
            gray.cols() as u32,
            gray.rows() as u32,
            gray.data_bytes()?.to_vec(),
            self.frame_number,
        );
        self.frame_number += 1;
        Ok(Some(frame))
    }
}

/// In-memory frame sequence for tests.
#[derive(Default)]
pub struct MockFrameSource {
    frames: VecDeque<GrayFrame>,
}

impl MockFrameSource {
    pub fn new(frames: Vec<GrayFrame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }
}

impl FrameSource for MockFrameSource {
    fn next_frame(&mut self) -> Result<Option<GrayFrame>, ExtractError> {
        Ok(self.frames.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_source_drains_in_order() {
        let mut source = MockFrameSource::new(vec![
            GrayFrame::filled(2, 2, 0, 0),
            GrayFrame::filled(2, 2, 0, 1),
        ]);

        assert_eq!(source.next_frame().unwrap().unwrap().frame_number, 0);
        assert_eq!(source.next_frame().unwrap().unwrap().frame_number, 1);
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_missing_video_fails_to_open() {
        let err = VideoFileSource::open(Path::new("/nonexistent/clip.mp4")).unwrap_err();
        assert!(matches!(err, ExtractError::OpenVideo(_)));
    }
}
