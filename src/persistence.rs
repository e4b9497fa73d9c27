//! Saving and loading network parameters
//!
//! The network is written with burn's named MessagePack recorder, next to a
//! small JSON file describing the run that produced it:
//! - `<path>.mpk`: network weights
//! - `<path>.meta.json`: [`ModelMetadata`]

use std::path::{Path, PathBuf};

use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::Backend,
};
use serde::{Deserialize, Serialize};

use crate::{error::PersistenceError, model::QNet};

/// Information saved alongside the weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Best score reached when the model was saved
    pub record: u32,
    /// Games played when the model was saved
    pub games_played: u32,
    /// Hidden layer width the weights were trained with
    pub hidden_size: usize,
    /// Crate version that wrote the files
    pub version: String,
}

impl ModelMetadata {
    pub fn new(record: u32, games_played: u32, hidden_size: usize) -> Self {
        Self {
            record,
            games_played,
            hidden_size,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Storage for the best network found so far
pub trait ModelStore<B: Backend> {
    /// Persist `model`, replacing whatever was stored before
    fn save(&mut self, model: &QNet<B>, meta: &ModelMetadata) -> Result<(), PersistenceError>;

    /// Load stored parameters into `model`
    fn load(&self, model: QNet<B>, device: &B::Device) -> Result<QNet<B>, PersistenceError>;
}

/// A [`ModelStore`] backed by two files on disk
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// `path` is the common stem of both files; extensions are added
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn weights_path(&self) -> PathBuf {
        self.path.with_extension("mpk")
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.path.with_extension("meta.json")
    }

    /// Read the metadata of the stored model
    pub fn metadata(&self) -> Result<ModelMetadata, PersistenceError> {
        let path = self.metadata_path();
        if !path.exists() {
            return Err(PersistenceError::NotFound(path));
        }
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

fn create_parent(path: &Path) -> Result<(), PersistenceError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(std::fs::create_dir_all(parent)?),
        _ => Ok(()),
    }
}

impl<B: Backend> ModelStore<B> for FileStore {
    fn save(&mut self, model: &QNet<B>, meta: &ModelMetadata) -> Result<(), PersistenceError> {
        create_parent(&self.path)?;

        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        recorder
            .record(model.clone().into_record(), self.path.clone())
            .map_err(|e| PersistenceError::Recorder(e.to_string()))?;

        let json = serde_json::to_string_pretty(meta)?;
        std::fs::write(self.metadata_path(), json)?;

        Ok(())
    }

    fn load(&self, model: QNet<B>, device: &B::Device) -> Result<QNet<B>, PersistenceError> {
        let weights = self.weights_path();
        if !weights.exists() {
            return Err(PersistenceError::NotFound(weights));
        }
        if let Ok(meta) = self.metadata() {
            if meta.hidden_size != model.hidden_size() {
                return Err(PersistenceError::Incompatible(format!(
                    "hidden size {} was saved, {} is configured",
                    meta.hidden_size,
                    model.hidden_size()
                )));
            }
        }

        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        let record = recorder
            .load(self.path.clone(), device)
            .map_err(|e| PersistenceError::Recorder(e.to_string()))?;

        Ok(model.load_record(record))
    }
}
