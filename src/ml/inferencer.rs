// ============================================================
// Layer 5 - Inferencer
// ============================================================
use anyhow::Result;
use burn::prelude::*;

use crate::data::{answers::AnswerTable, dataset::QuestionEncoder};
use crate::infra::{checkpoint::CheckpointManager, tokenizer_store::TokenizerStore};
use crate::ml::model::VqaModel;

pub struct Inferencer<B: Backend> {
    model:   VqaModel<B>,
    encoder: QuestionEncoder,
    answers: AnswerTable,
    device:  B::Device,
}

impl<B: Backend> Inferencer<B> {
    pub fn from_checkpoint(ckpt: &CheckpointManager, device: B::Device) -> Result<Self> {
        let model_cfg = ckpt.load_model_config()?;
        let tokenizer = TokenizerStore::new(ckpt.dir()).load()?;
        let answers   = AnswerTable::load(&ckpt.answers_path())?;
        answers.ensure_label_size(model_cfg.label_size)?;

        let model = ckpt.load_model(model_cfg.init::<B>(&device), &device)?;
        tracing::info!("Model loaded from checkpoint");

        Ok(Self {
            model,
            encoder: QuestionEncoder::new(tokenizer, model_cfg.max_ques_len),
            answers,
            device,
        })
    }

    /// The `top_k` most probable answers, best first.
    pub fn predict(&self, question: &str, top_k: usize) -> Result<Vec<(String, f32)>> {
        let ids: Vec<i32> = self.encoder.encode(question)?
            .into_iter()
            .map(|id| id as i32)
            .collect();
        let input = Tensor::<B, 1, Int>::from_ints(ids.as_slice(), &self.device)
            .unsqueeze::<2>();

        let probs: Vec<f32> = self.model
            .predictions(input)
            .into_data()
            .convert::<f32>()
            .to_vec()
            .map_err(|e| anyhow::anyhow!("Cannot read probabilities: {e:?}"))?;

        let mut ranked: Vec<(usize, f32)> = probs.into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let answers = ranked
            .into_iter()
            .take(top_k)
            .filter_map(|(id, p)| self.answers.answer(id).map(|a| (a.to_string(), p)))
            .collect::<Vec<_>>();

        if let Some((best, conf)) = answers.first() {
            tracing::debug!("'{}' → '{}' (confidence {:.4})", question, best, conf);
        }
        Ok(answers)
    }
}
