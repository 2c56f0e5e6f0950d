//! JSON configuration and report helpers.

use crate::{RunResult, SheetCountParams};
use sheet_count_core::ParamsError;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum SheetCountIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Params(#[from] ParamsError),
}

fn default_video_like() -> bool {
    true
}

/// Configuration of a counting run read from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetCountConfig {
    /// Input images; more than one path is treated as a frame sequence.
    pub inputs: Vec<String>,
    /// Resize sequence frames to the canonical 600×400 size.
    #[serde(default = "default_video_like")]
    pub video_like: bool,
    #[serde(default)]
    pub report_path: Option<String>,
    #[serde(default)]
    pub best_frame_path: Option<String>,
    #[serde(default)]
    pub params: SheetCountParams,
}

impl SheetCountConfig {
    /// Load a JSON config from disk and validate its `params` block.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SheetCountIoError> {
        let raw = fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&raw)?;
        cfg.params.validate()?;
        Ok(cfg)
    }

    /// Resolve the output report path.
    pub fn report_path(&self) -> PathBuf {
        self.report_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("sheet_count_report.json"))
    }
}

/// Per-frame entry of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameReport {
    pub index: usize,
    /// Input the frame was decoded from.
    #[serde(default)]
    pub source: Option<String>,
    pub sheet_count: usize,
    pub midpoints: Vec<i32>,
}

/// Serializable outcome of a run, without pixel data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetCountReport {
    /// Sources of the processed frames; `frames[i]` came from `inputs[i]`.
    pub inputs: Vec<String>,
    /// Inputs that could not be decoded and were left out of the run.
    #[serde(default)]
    pub skipped: Vec<String>,
    pub max_sheet_count: Option<usize>,
    pub best_frame_index: Option<usize>,
    pub frames_processed: usize,
    pub cancelled: bool,
    pub frames: Vec<FrameReport>,
}

impl SheetCountReport {
    /// Build a report; `inputs` lists the source of each processed frame in order.
    pub fn from_run(inputs: Vec<String>, run: &RunResult) -> Self {
        let frames = run
            .counts
            .iter()
            .zip(&run.midpoints)
            .enumerate()
            .map(|(index, (&sheet_count, midpoints))| FrameReport {
                index,
                source: inputs.get(index).cloned(),
                sheet_count,
                midpoints: midpoints.clone(),
            })
            .collect();
        Self {
            inputs,
            skipped: Vec::new(),
            max_sheet_count: run.max_sheet_count,
            best_frame_index: run.best_frame_index,
            frames_processed: run.frames_processed,
            cancelled: run.cancelled,
            frames,
        }
    }

    pub fn with_skipped(mut self, skipped: Vec<String>) -> Self {
        self.skipped = skipped;
        self
    }

    /// Source of the frame selected as best, if any.
    pub fn best_frame_source(&self) -> Option<&str> {
        self.best_frame_index
            .and_then(|i| self.inputs.get(i))
            .map(String::as_str)
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SheetCountIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), SheetCountIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
