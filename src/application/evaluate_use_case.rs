// ============================================================
// Layer 2 - Evaluate Use Case
// ============================================================
// Re-runs the test pass of a finished training run:
//   1. Read the saved training / model configs
//   2. Reload the question vocabulary and answer table
//   3. Encode the test split exactly as training did
//   4. Restore the best checkpoint and predict (full batches only)

use anyhow::Result;

use crate::data::{
    answers::AnswerTable,
    batcher::VqaBatcher,
    dataset::QuestionEncoder,
    loader::JsonlLoader,
    splitter::split_debug,
};
use crate::domain::traits::RecordSource;
use crate::infra::{checkpoint::CheckpointManager, tokenizer_store::TokenizerStore};
use crate::ml::predictor::{accuracy, predict};

type InferBackend = burn::backend::Wgpu;

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub predicted: usize,
    pub accuracy:  f64,
    /// Mean confidence of the predicted answers
    pub mean_confidence: f64,
}

pub struct EvaluateUseCase {
    checkpoint_dir: String,
    data_dir:       Option<String>,
}

impl EvaluateUseCase {
    pub fn new(checkpoint_dir: String, data_dir: Option<String>) -> Self {
        Self { checkpoint_dir, data_dir }
    }

    pub fn execute(&self) -> Result<Evaluation> {
        let ckpt      = CheckpointManager::new(&self.checkpoint_dir);
        let cfg       = ckpt.load_config()?;
        let model_cfg = ckpt.load_model_config()?;
        let tokenizer = TokenizerStore::new(ckpt.dir()).load()?;
        let answers   = AnswerTable::load(&ckpt.answers_path())?;
        answers.ensure_label_size(model_cfg.label_size)?;

        let data_dir = self.data_dir.clone().unwrap_or(cfg.data_dir);
        let records  = JsonlLoader::new(&data_dir).load_test()?;

        // Same encoding and subset as the training run's test pass
        let encoder = QuestionEncoder::new(tokenizer, model_cfg.max_ques_len);
        let test    = encoder.encode_records(&records, &answers)?;
        let test    = if cfg.debug { split_debug(Vec::new(), test).test } else { test };

        let device  = burn::backend::wgpu::WgpuDevice::default();
        let model   = ckpt.load_model(model_cfg.init::<InferBackend>(&device), &device)?;
        let batcher = VqaBatcher::<InferBackend>::new(device, model_cfg.label_size);

        let preds  = predict(&model, &batcher, &test, cfg.batch_size)?;
        let labels: Vec<usize> = test.iter().map(|s| s.answer_id).collect();

        let mean_confidence = if preds.confidences.is_empty() {
            0.0
        } else {
            preds.confidences.iter().map(|&c| c as f64).sum::<f64>() / preds.confidences.len() as f64
        };

        Ok(Evaluation {
            predicted: preds.indices.len(),
            accuracy:  accuracy(&preds.indices, &labels, cfg.batch_size),
            mean_confidence,
        })
    }
}
