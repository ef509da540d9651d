// ============================================================
// Layer 2 - TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load train / test records      (Layer 4 - data)
//   Step 2: Build the answer table         (Layer 4 - data)
//   Step 3: Build question vocabulary      (Layer 6 - infra)
//   Step 4: Encode samples                 (Layer 4 - data)
//   Step 5: Split train / valid / test     (Layer 4 - data)
//   Step 6: Load word vectors (optional)   (Layer 4 - data)
//   Step 7: Save configs + answer table    (Layer 6 - infra)
//   Step 8: Train, restore best, test      (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::{
    answers::AnswerTable,
    dataset::QuestionEncoder,
    embeddings::load_glove,
    loader::JsonlLoader,
    preprocessor::Preprocessor,
    splitter::{split_debug, split_holdout},
};
use crate::domain::traits::RecordSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    tokenizer_store::{TokenizerStore, PAD_ID},
};
use crate::ml::{
    model::VqaModelConfig,
    trainer::{run_training, TrainingOutcome},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run, saved next to the
// checkpoint so evaluation can find the dataset and batch size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:       String,
    pub checkpoint_dir: String,
    /// GloVe text file; when absent the embedding is learned
    pub embeddings:     Option<String>,
    pub embed_size:     usize,
    pub batch_size:     usize,
    /// Upper bound on the number of answer classes
    pub label_size:     usize,
    pub hidden_size:    usize,
    pub max_epochs:     usize,
    pub keep_prob:      f64,
    pub lr:             f64,
    pub l2:             f64,
    pub max_ques_len:   usize,
    pub max_vocab:      Option<usize>,
    pub debug:          bool,
    pub seed:           u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:       "data/vqa".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            embeddings:     None,
            embed_size:     300,
            batch_size:     64,
            label_size:     1000,
            hidden_size:    1024,
            max_epochs:     15,
            keep_prob:      0.9,
            lr:             2e-5,
            l2:             0.001,
            max_ques_len:   25,
            max_vocab:      None,
            debug:          false,
            seed:           42,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.batch_size > 0, "batch_size must be positive");
        anyhow::ensure!(self.label_size > 0, "label_size must be positive");
        anyhow::ensure!(self.max_ques_len > 0, "max_ques_len must be positive");
        anyhow::ensure!(
            self.keep_prob > 0.0 && self.keep_prob <= 1.0,
            "keep_prob must be in (0, 1], got {}", self.keep_prob
        );
        anyhow::ensure!(self.lr > 0.0, "learning rate must be positive");
        Ok(())
    }
}

pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainingOutcome> {
        let cfg = &self.config;
        cfg.validate()?;
        let prep = Preprocessor::new();

        // ── Step 1: Load records ──────────────────────────────────────────────
        tracing::info!("Loading VQA records from '{}'", cfg.data_dir);
        let loader = JsonlLoader::new(&cfg.data_dir);
        let train_records = loader.load_train()?;
        let test_records  = loader.load_test()?;

        // ── Step 2: Answer table from training answers ────────────────────────
        let clean_answers: Vec<String> = train_records
            .iter()
            .map(|r| prep.clean_answer(&r.answer))
            .collect();
        let answers = AnswerTable::build(clean_answers.iter().map(String::as_str), cfg.label_size);
        anyhow::ensure!(!answers.is_empty(), "No answers found in the training records");
        if answers.len() < cfg.label_size {
            tracing::warn!(
                "Only {} distinct answers available, fewer than label_size={}",
                answers.len(), cfg.label_size
            );
        }

        // ── Step 3: Question vocabulary ───────────────────────────────────────
        let questions: Vec<String> = train_records
            .iter()
            .map(|r| prep.clean(&r.question))
            .collect();
        let ckpt      = CheckpointManager::new(&cfg.checkpoint_dir);
        let tokenizer = TokenizerStore::new(ckpt.dir()).build_and_save(&questions, cfg.max_vocab)?;
        let vocab     = tokenizer.get_vocab(false);
        let vocab_size = tokenizer.get_vocab_size(false);

        // ── Step 4: Encode samples ────────────────────────────────────────────
        let encoder = QuestionEncoder::new(tokenizer, cfg.max_ques_len);
        let train   = encoder.encode_records(&train_records, &answers)?;
        let test    = encoder.encode_records(&test_records, &answers)?;

        // ── Step 5: Split ─────────────────────────────────────────────────────
        let splits = if cfg.debug {
            split_debug(train, test)
        } else {
            split_holdout(train, test)
        };
        tracing::info!(
            "Split: {} train, {} validation, {} test",
            splits.train.len(), splits.valid.len(), splits.test.len()
        );

        // ── Step 6: Pre-trained word vectors ──────────────────────────────────
        let vectors = match &cfg.embeddings {
            Some(path) => Some(load_glove(Path::new(path), &vocab, cfg.embed_size, PAD_ID, cfg.seed)?),
            None => {
                tracing::info!("No embeddings file given; learning embeddings from scratch");
                None
            }
        };

        // ── Step 7: Save everything inference needs ───────────────────────────
        let model_cfg = VqaModelConfig::new(
            vocab_size, cfg.embed_size, cfg.hidden_size, answers.len(), cfg.max_ques_len,
        ).with_keep_prob(cfg.keep_prob);
        ckpt.save_config(cfg)?;
        ckpt.save_model_config(&model_cfg)?;
        answers.save(&ckpt.answers_path())?;

        // ── Step 8: Train ─────────────────────────────────────────────────────
        run_training(cfg, &model_cfg, vectors.as_ref(), splits, &ckpt)
    }
}
