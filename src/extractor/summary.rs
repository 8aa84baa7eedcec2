use serde::{Deserialize, Serialize};

/// Aggregate mouth-ratio statistics for one processed clip. Immutable once
/// built; this is the record the word store persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSummary {
    pub avg_ratio: f64,
    pub ratio_std: f64,
    pub min_ratio: f64,
    pub max_ratio: f64,
    pub frame_count: usize,
    /// File name of the source clip.
    #[serde(default)]
    pub video: String,
}

/// Collects per-frame ratios and reduces them to a `ClipSummary`.
/// Frame ordering is deliberately not retained.
#[derive(Debug, Default)]
pub struct RatioAccumulator {
    ratios: Vec<f64>,
}

impl RatioAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ratio: f64) {
        self.ratios.push(ratio);
    }

    pub fn len(&self) -> usize {
        self.ratios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty()
    }

    /// `None` when no frame produced a ratio; a summary always has
    /// `frame_count >= 1`.
    pub fn summarize(&self, video: &str) -> Option<ClipSummary> {
        if self.ratios.is_empty() {
            return None;
        }

        let n = self.ratios.len() as f64;
        let mean = self.ratios.iter().sum::<f64>() / n;
        // population variance, matching the statistics the store was built with
        let variance = self
            .ratios
            .iter()
            .map(|r| (r - mean) * (r - mean))
            .sum::<f64>()
            / n;

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &r in &self.ratios {
            min = min.min(r);
            max = max.max(r);
        }

        Some(ClipSummary {
            avg_ratio: mean,
            ratio_std: variance.sqrt(),
            min_ratio: min,
            max_ratio: max,
            frame_count: self.ratios.len(),
            video: video.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_accumulator_has_no_summary() {
        let acc = RatioAccumulator::new();
        assert!(acc.is_empty());
        assert!(acc.summarize("clip.mp4").is_none());
    }

    #[test]
    fn test_summary_statistics() {
        let mut acc = RatioAccumulator::new();
        acc.push(1.0);
        acc.push(2.0);
        acc.push(3.0);

        let summary = acc.summarize("clip.mp4").unwrap();
        assert_eq!(summary.frame_count, 3);
        assert!((summary.avg_ratio - 2.0).abs() < 1e-12);
        assert!((summary.min_ratio - 1.0).abs() < 1e-12);
        assert!((summary.max_ratio - 3.0).abs() < 1e-12);
        assert_eq!(summary.video, "clip.mp4");
        // population std of [1, 2, 3] = sqrt(2/3)
        assert!((summary.ratio_std - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_single_sample_has_zero_std() {
        let mut acc = RatioAccumulator::new();
        acc.push(1.7);

        let summary = acc.summarize("one.mp4").unwrap();
        assert_eq!(summary.frame_count, 1);
        assert_eq!(summary.ratio_std, 0.0);
        assert_eq!(summary.min_ratio, summary.max_ratio);
    }

    #[test]
    fn test_summary_serde_round_trip() {
        let mut acc = RatioAccumulator::new();
        acc.push(1.5);
        acc.push(2.5);
        let summary = acc.summarize("word.mp4").unwrap();

        let json = serde_json::to_string(&summary).unwrap();
        let back: ClipSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }
}
