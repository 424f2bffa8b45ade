//! High-score persistence as a plain JSON array on disk.

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use frenzy_core::HighScores;

/// Overrides the default table location.
pub const SCORES_PATH_ENV: &str = "FRENZY_SCORES_PATH";

pub const SCORES_PATH_DEFAULT: &str = "frenzy_scores.json";

pub struct ScoreStore {
    path: PathBuf,
}

impl ScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A CLI flag beats the environment; the environment beats the default.
    pub fn from_env_or(path: Option<PathBuf>) -> Self {
        let path = path
            .or_else(|| env::var_os(SCORES_PATH_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(SCORES_PATH_DEFAULT));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty table. An unreadable or corrupt one is
    /// too, after a warning; the table must never block play.
    pub fn load(&self) -> HighScores {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return HighScores::new(),
            Err(err) => {
                tracing::warn!("could not read {}: {err}", self.path.display());
                return HighScores::new();
            }
        };
        match serde_json::from_slice::<Vec<u32>>(&bytes) {
            Ok(entries) => HighScores::from_entries(entries),
            Err(err) => {
                tracing::warn!("ignoring corrupt score table {}: {err}", self.path.display());
                HighScores::new()
            }
        }
    }

    pub fn save(&self, scores: &HighScores) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed creating directory {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(scores).context("failed encoding score table")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed writing {}", self.path.display()))
    }

    /// Loads, applies one score and saves only when the table changed.
    pub fn record(&self, score: u32) -> Result<(bool, HighScores)> {
        let mut scores = self.load();
        let changed = scores.record(score);
        if changed {
            self.save(&scores)?;
        }
        Ok((changed, scores))
    }
}
