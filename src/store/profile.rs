use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::extractor::ClipSummary;
use crate::store::error::StoreError;

/// All recorded clips for one word, in training order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordProfile {
    pub samples: Vec<ClipSummary>,
}

/// Word -> profile mapping, keyed in first-trained order. Persisted as a
/// single JSON object and rewritten wholesale on every save; single-process,
/// single-writer only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordStore {
    words: IndexMap<String, WordProfile>,
}

impl WordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// An absent file is an empty store; an unreadable or malformed file
    /// is an error.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let reader = BufReader::new(File::open(path)?);
        let store: WordStore = serde_json::from_reader(reader)?;
        log::debug!("loaded {} trained words from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        log::debug!("saved {} trained words to {}", self.len(), path.display());
        Ok(())
    }

    /// Appends a clip summary to the word's sample list, creating the
    /// profile on first use. Existing samples are never replaced.
    pub fn record(&mut self, word: &str, summary: ClipSummary) {
        self.words
            .entry(word.to_string())
            .or_default()
            .samples
            .push(summary);
    }

    pub fn get(&self, word: &str) -> Option<&WordProfile> {
        self.words.get(word)
    }

    /// Words in first-trained order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &WordProfile)> {
        self.words.iter().map(|(word, profile)| (word.as_str(), profile))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
