//! JSON configuration and report helpers for batch detection.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use paper_programs_detect::{DetectError, DetectorParams, FrameResult, ProgramDetector};

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error("config lists no frames")]
    NoFrames,
}

/// Configuration of one batch detection run.
///
/// Frame paths are resolved relative to the directory holding the config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectConfig {
    pub frames: Vec<String>,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub params: DetectorParams,
}

impl DetectConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("paper_programs_report.json"))
    }

    /// Frame paths, with relative entries joined onto `config_path`'s directory.
    pub fn frame_paths(&self, config_path: &Path) -> Vec<PathBuf> {
        let base = config_path.parent().unwrap_or_else(|| Path::new(""));
        self.frames
            .iter()
            .map(|f| {
                let p = Path::new(f);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    base.join(p)
                }
            })
            .collect()
    }

    /// Build a detection session from the config.
    pub fn build_detector(&self) -> Result<ProgramDetector, ConfigError> {
        if self.frames.is_empty() {
            return Err(ConfigError::NoFrames);
        }
        Ok(ProgramDetector::new(self.params.clone())?)
    }
}

/// Outcome of one frame of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub index: usize,
    pub path: String,
    #[serde(default)]
    pub result: Option<FrameResult>,
    #[serde(default)]
    pub error: Option<String>,
}

impl FrameReport {
    pub fn new(index: usize, path: impl AsRef<Path>) -> Self {
        Self {
            index,
            path: path.as_ref().to_string_lossy().into_owned(),
            result: None,
            error: None,
        }
    }

    pub fn set_result(&mut self, result: FrameResult) {
        self.result = Some(result);
        self.error = None;
    }

    pub fn set_error(&mut self, err: impl std::fmt::Display) {
        self.error = Some(err.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectReport {
    pub config_path: String,
    pub frames: Vec<FrameReport>,
}

impl DetectReport {
    pub fn new(config_path: &Path) -> Self {
        Self {
            config_path: config_path.to_string_lossy().into_owned(),
            frames: Vec::new(),
        }
    }

    /// Distinct program ids seen in any frame, ascending.
    pub fn programs(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .frames
            .iter()
            .filter_map(|f| f.result.as_ref())
            .flat_map(|r| r.programs_to_render.iter().map(|p| p.number))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
