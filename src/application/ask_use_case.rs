// ============================================================
// Layer 2 - Ask Use Case
// ============================================================
// Answers one free-text question with the best checkpoint.
// The model never sees the image, so the answer is the most
// likely one for the question wording alone.

use anyhow::Result;

use crate::domain::traits::QuestionAnswerer;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::Inferencer;

type InferBackend = burn::backend::Wgpu;

pub struct AskUseCase {
    inferencer: Inferencer<InferBackend>,
}

impl AskUseCase {
    pub fn new(checkpoint_dir: String) -> Result<Self> {
        let ckpt       = CheckpointManager::new(checkpoint_dir);
        let device     = burn::backend::wgpu::WgpuDevice::default();
        let inferencer = Inferencer::from_checkpoint(&ckpt, device)?;
        Ok(Self { inferencer })
    }
}

impl QuestionAnswerer for AskUseCase {
    fn answer(&self, question: &str, top_k: usize) -> Result<Vec<(String, f32)>> {
        let question = question.trim();
        anyhow::ensure!(!question.is_empty(), "Question is empty");
        self.inferencer.predict(question, top_k.max(1))
    }
}
