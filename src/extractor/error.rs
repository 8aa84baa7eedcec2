use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("cannot open video: {0}")]
    OpenVideo(String),
    #[error("no lip region detected in video")]
    NoLipDetected,
    #[error("failed to load Haar cascade: {0}")]
    Cascade(String),
    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),
}
