// ============================================================
// Layer 6 - Checkpoint Manager
// ============================================================
// Saves and restores the best model using Burn's CompactRecorder.
//
// Only one set of weights is kept: whenever validation loss
// improves, the previous best is overwritten. Everything needed to
// rebuild the model later sits next to it:
//
//   checkpoints/
//     best_model.mpk.gz     ← weights of the best epoch so far
//     best_epoch.json       ← { "epoch": 3, "val_loss": 2.41 }
//     model_config.json     ← VqaModelConfig (architecture)
//     train_config.json     ← TrainConfig (data + hyperparameters)
//     tokenizer.json        ← question vocabulary (TokenizerStore)
//     answers.json          ← answer table
//     metrics.csv           ← per-epoch metrics (MetricsLogger)
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::{VqaModel, VqaModelConfig};

const MODEL_FILE:        &str = "best_model";
const BEST_EPOCH_FILE:   &str = "best_epoch.json";
const MODEL_CONFIG_FILE: &str = "model_config.json";
const TRAIN_CONFIG_FILE: &str = "train_config.json";
const ANSWERS_FILE:      &str = "answers.json";

/// Which epoch the saved weights came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestEpoch {
    pub epoch:    usize,
    pub val_loss: f64,
}

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn answers_path(&self) -> PathBuf {
        self.dir.join(ANSWERS_FILE)
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", self.dir.display()))
    }

    /// Overwrite the best checkpoint with `model`.
    pub fn save_model<B: Backend>(&self, model: &VqaModel<B>, best: BestEpoch) -> Result<()> {
        self.ensure_dir()?;
        let path = self.dir.join(MODEL_FILE);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        write_json(&self.dir.join(BEST_EPOCH_FILE), &best)?;

        tracing::debug!("Saved checkpoint: epoch {} (val_loss={:.4})", best.epoch, best.val_loss);
        Ok(())
    }

    /// Load the best weights into a freshly built `model`.
    pub fn load_model<B: Backend>(
        &self,
        model:  VqaModel<B>,
        device: &B::Device,
    ) -> Result<VqaModel<B>> {
        let path = self.dir.join(MODEL_FILE);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;

        if let Ok(best) = self.best_epoch() {
            tracing::info!("Restored checkpoint from epoch {} (val_loss={:.4})", best.epoch, best.val_loss);
        }
        Ok(model.load_record(record))
    }

    pub fn best_epoch(&self) -> Result<BestEpoch> {
        read_json(&self.dir.join(BEST_EPOCH_FILE))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.ensure_dir()?;
        write_json(&self.dir.join(TRAIN_CONFIG_FILE), cfg)
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        read_json(&self.dir.join(TRAIN_CONFIG_FILE))
    }

    pub fn save_model_config(&self, cfg: &VqaModelConfig) -> Result<()> {
        self.ensure_dir()?;
        write_json(&self.dir.join(MODEL_CONFIG_FILE), cfg)
    }

    pub fn load_model_config(&self) -> Result<VqaModelConfig> {
        read_json(&self.dir.join(MODEL_CONFIG_FILE))
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)
        .with_context(|| format!("Cannot write '{}'", path.display()))?;
    tracing::debug!("Wrote '{}'", path.display());
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path)
        .with_context(|| format!(
            "Cannot read '{}'. Make sure you have run 'train' first.",
            path.display()
        ))?;
    serde_json::from_str(&json)
        .with_context(|| format!("'{}' is not valid", path.display()))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TB = NdArray;

    #[test]
    fn test_model_round_trip_restores_weights() {
        let dir    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(dir.path().join("ckpt"));
        let device = Default::default();
        let cfg    = VqaModelConfig::new(8, 3, 4, 5, 6);

        let saved = cfg.init::<TB>(&device);
        ckpt.save_model(&saved, BestEpoch { epoch: 2, val_loss: 1.5 }).unwrap();

        let restored = ckpt.load_model(cfg.init::<TB>(&device), &device).unwrap();
        let a: Vec<f32> = saved.projection.weight.val().into_data().to_vec().unwrap();
        let b: Vec<f32> = restored.projection.weight.val().into_data().to_vec().unwrap();
        // CompactRecorder stores half precision floats
        assert_eq!(a.len(), b.len());
        assert!(a.iter().zip(&b).all(|(x, y)| (x - y).abs() < 1e-2));
        assert_eq!(ckpt.best_epoch().unwrap(), BestEpoch { epoch: 2, val_loss: 1.5 });
    }

    #[test]
    fn test_model_config_round_trip() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path());
        let cfg  = VqaModelConfig::new(100, 300, 64, 10, 25).with_keep_prob(0.5);
        ckpt.save_model_config(&cfg).unwrap();

        let loaded = ckpt.load_model_config().unwrap();
        assert_eq!(loaded.vocab_size, 100);
        assert_eq!(loaded.keep_prob, 0.5);
    }

    #[test]
    fn test_missing_checkpoint_mentions_training() {
        let dir    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(dir.path());
        let device = Default::default();
        let err = ckpt
            .load_model(VqaModelConfig::new(4, 2, 2, 2, 3).init::<TB>(&device), &device)
            .unwrap_err();
        assert!(format!("{err:#}").contains("trained the model first"));
    }
}
