//! Lip reading CLI - train and predict lip motion patterns.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use lipreader::extractor::{
    default_cascade_path, ClipAnalyzer, ClipSummary, HaarFaceDetector, VideoFileSource,
};
use lipreader::store::{Classifier, WordStore};

#[derive(Parser)]
#[command(name = "lipreader", version, about = "Train and predict words from lip motion")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train a word from video
    Train {
        /// Input video path
        #[arg(short, long)]
        video: PathBuf,
        /// Target word/label
        #[arg(short, long)]
        word: String,
        /// Data file
        #[arg(short, long, default_value = "lip_data.json")]
        data: PathBuf,
        /// Haar cascade XML; defaults to a well-known install location
        #[arg(long)]
        cascade: Option<PathBuf>,
    },
    /// Predict word from video
    Predict {
        /// Test video path
        #[arg(short, long)]
        video: PathBuf,
        /// Data file
        #[arg(short, long, default_value = "lip_data.json")]
        data: PathBuf,
        /// Haar cascade XML; defaults to a well-known install location
        #[arg(long)]
        cascade: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    lipreader::init_logging();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Train {
            video,
            word,
            data,
            cascade,
        } => train(&video, &word, &data, cascade),
        Command::Predict {
            video,
            data,
            cascade,
        } => predict(&video, &data, cascade),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn extract_summary(video: &Path, cascade: Option<PathBuf>) -> Result<ClipSummary> {
    let cascade_path = match cascade.or_else(default_cascade_path) {
        Some(path) => path,
        None => {
            return Err(anyhow!(
                "no frontal-face cascade found; pass --cascade or set LIPREADER_CASCADE"
            ))
        }
    };

    let mut detector = HaarFaceDetector::from_file(&cascade_path)?;
    let mut source = VideoFileSource::open(video)?;

    let label = video
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| video.display().to_string());

    let summary = ClipAnalyzer::new().analyze(&mut source, &mut detector, &label)?;
    Ok(summary)
}

fn train(video: &Path, word: &str, data: &Path, cascade: Option<PathBuf>) -> Result<ExitCode> {
    let summary = extract_summary(video, cascade)?;

    let mut store = WordStore::load(data)
        .with_context(|| format!("loading store {}", data.display()))?;
    store.record(word, summary.clone());
    store
        .save(data)
        .with_context(|| format!("saving store {}", data.display()))?;

    println!("✅ Trained word '{word}'");
    println!(
        "   Avg Ratio: {:.2} ± {:.2}",
        summary.avg_ratio, summary.ratio_std
    );
    Ok(ExitCode::SUCCESS)
}

fn predict(video: &Path, data: &Path, cascade: Option<PathBuf>) -> Result<ExitCode> {
    let summary = extract_summary(video, cascade)?;
    let store = WordStore::load(data)
        .with_context(|| format!("loading store {}", data.display()))?;

    let prediction = match Classifier::new().predict(&store, &summary)? {
        Some(prediction) => prediction,
        None => {
            println!("⚠️ No match found.");
            return Ok(ExitCode::FAILURE);
        }
    };

    println!("🎯 Prediction: {}", prediction.word);
    println!("\n📈 Probabilities:");

    let mut ranked = prediction.probabilities;
    // stable sort: equal probabilities keep first-trained order
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    for (word, probability) in &ranked {
        println!("   {word}: {probability:.1}%");
    }

    Ok(ExitCode::SUCCESS)
}
