use crate::extractor::ClipSummary;
use crate::store::error::ClassifyError;
use crate::store::profile::WordStore;

/// Penalty divisors of the similarity score. Hand-tuned alongside the
/// segmenter constants; not re-derived.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub avg_divisor: f64,
    pub std_divisor: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            avg_divisor: 2.0,
            std_divisor: 1.0,
        }
    }
}

/// Linear penalty on mean and spread deviation, clipped at zero.
/// Identical summaries score exactly 1.0.
pub fn similarity(query: &ClipSummary, sample: &ClipSummary, config: &ScoringConfig) -> f64 {
    let avg_penalty = (query.avg_ratio - sample.avg_ratio).abs() / config.avg_divisor;
    let std_penalty = (query.ratio_std - sample.ratio_std).abs() / config.std_divisor;
    (1.0 - avg_penalty - std_penalty).max(0.0)
}

/// Outcome of a successful match. `probabilities` are percentages in
/// first-trained word order and sum to ~100.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub word: String,
    pub probabilities: Vec<(String, f64)>,
}

pub struct Classifier {
    config: ScoringConfig,
}

impl Classifier {
    pub fn new() -> Self {
        Self::with_config(ScoringConfig::default())
    }

    pub fn with_config(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Scores the query against every trained word. `Ok(None)` when every
    /// word's score clipped to zero - no distribution exists in that case.
    pub fn predict(
        &self,
        store: &WordStore,
        query: &ClipSummary,
    ) -> Result<Option<Prediction>, ClassifyError> {
        if store.is_empty() {
            return Err(ClassifyError::NoTrainedWords);
        }

        let mut scores: Vec<(String, f64)> = Vec::with_capacity(store.len());
        for (word, profile) in store.iter() {
            let total: f64 = profile
                .samples
                .iter()
                .map(|sample| similarity(query, sample, &self.config))
                .sum();
            let mean = total / profile.samples.len() as f64;
            scores.push((word.to_string(), mean));
        }

        let sum: f64 = scores.iter().map(|(_, s)| s).sum();
        if sum == 0.0 {
            log::info!("every trained word scored zero against the query");
            return Ok(None);
        }

        let probabilities: Vec<(String, f64)> = scores
            .into_iter()
            .map(|(word, score)| (word, score / sum * 100.0))
            .collect();

        // strict comparison keeps the first-trained word on ties
        let mut winner = 0;
        for (i, entry) in probabilities.iter().enumerate().skip(1) {
            if entry.1 > probabilities[winner].1 {
                winner = i;
            }
        }

        Ok(Some(Prediction {
            word: probabilities[winner].0.clone(),
            probabilities,
        }))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}
