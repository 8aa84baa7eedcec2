//! Video feature extraction - reduces a clip to mouth aspect-ratio statistics
//!
//! Per frame:
//! 1. Face localization - pretrained Haar cascade, largest box wins
//! 2. Lip segmentation - inverted threshold + 3x3 close/open inside the face ROI
//! 3. Ratio sampling - bounding-box width/height of the largest dark region
//!
//! Per clip: unordered ratio samples collapse into one `ClipSummary`.

pub mod error;
pub mod face;
pub mod frame;
pub mod pipeline;
pub mod segmenter;
pub mod summary;
pub mod video;

pub use error::ExtractError;
pub use face::{default_cascade_path, FaceBox, FaceDetector, HaarFaceDetector, MockFaceDetector};
pub use frame::GrayFrame;
pub use pipeline::ClipAnalyzer;
pub use segmenter::{LipSegmenter, Region, SegmenterConfig, RATIO_EPSILON};
pub use summary::{ClipSummary, RatioAccumulator};
pub use video::{FrameSource, MockFrameSource, VideoFileSource};
