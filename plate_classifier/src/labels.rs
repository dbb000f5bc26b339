use crate::config::{LabelsConfig, Validatable};
use std::{
    fs::File,
    io::{self, BufRead},
    path::Path,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelsError {
    #[error("Failed to read labels file: {0}")]
    Io(#[from] io::Error),
    #[error("Labels file is not a JSON array of strings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Labels file contains no labels")]
    Empty,
}

/// Short codes indexed by the model's output class index.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    pub fn new(labels: Vec<String>) -> Result<Self, LabelsError> {
        if labels.is_empty() {
            return Err(LabelsError::Empty);
        }
        Ok(Self { labels })
    }

    pub fn from_config(labels_cfg: &LabelsConfig) -> Result<Self, LabelsError> {
        Self::load(&labels_cfg.get_path())
    }

    /// `.json` files hold an array of strings; anything else is read as one
    /// label per non-empty line.
    pub fn load(filepath: &Path) -> Result<Self, LabelsError> {
        let file = File::open(filepath)?;
        let reader = io::BufReader::new(file);

        let is_json = filepath
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_reader(reader)
        } else {
            Self::from_lines(reader)
        }
    }

    pub fn from_json_reader(reader: impl io::Read) -> Result<Self, LabelsError> {
        let labels: Vec<String> = serde_json::from_reader(reader)?;
        Self::new(labels)
    }

    pub fn from_lines(reader: impl BufRead) -> Result<Self, LabelsError> {
        let mut labels = Vec::new();
        for line_result in reader.lines() {
            let line = line_result?;
            let label = line.trim();
            if !label.is_empty() {
                labels.push(label.to_string());
            }
        }
        Self::new(labels)
    }

    pub fn get(&self, class_index: usize) -> Option<&str> {
        self.labels.get(class_index).map(String::as_str)
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.labels.len()
    }
}
