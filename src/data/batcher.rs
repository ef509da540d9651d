// ============================================================
// Layer 4 - VQA Batcher
// ============================================================
// Implements Burn's Batcher trait to stack VqaSamples into
// tensors, and builds the one-hot answer labels on the way.
//
//   Input:  Vec of N VqaSamples, questions of length L
//   Output: VqaBatch with
//             questions [N, L]       token ids
//             labels    [N, C]       one-hot, C = answer classes
//             answers   [N]          answer ids (for accuracy)
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::VqaSample;

#[derive(Debug, Clone)]
pub struct VqaBatch<B: Backend> {
    /// Token ID sequences, shape [batch_size, max_ques_len]
    pub questions: Tensor<B, 2, Int>,

    /// One-hot answer labels, shape [batch_size, label_size]
    pub labels: Tensor<B, 2>,

    /// Answer class ids, shape [batch_size]
    pub answers: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct VqaBatcher<B: Backend> {
    pub device:     B::Device,
    pub label_size: usize,
}

impl<B: Backend> VqaBatcher<B> {
    pub fn new(device: B::Device, label_size: usize) -> Self {
        Self { device, label_size }
    }
}

/// Flat row-major one-hot matrix, one row per answer id.
pub fn one_hot(answer_ids: &[usize], label_size: usize) -> Vec<f32> {
    let mut labels = vec![0.0f32; answer_ids.len() * label_size];
    for (row, &id) in answer_ids.iter().enumerate() {
        labels[row * label_size + id] = 1.0;
    }
    labels
}

impl<B: Backend> Batcher<VqaSample, VqaBatch<B>> for VqaBatcher<B> {
    fn batch(&self, items: Vec<VqaSample>) -> VqaBatch<B> {
        let batch_size = items.len();
        let ques_len   = items.first().map_or(0, |s| s.question_ids.len());

        let question_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.question_ids.iter().map(|&x| x as i32))
            .collect();

        let answer_ids: Vec<usize> = items.iter().map(|s| s.answer_id).collect();
        let answer_flat: Vec<i32>  = answer_ids.iter().map(|&a| a as i32).collect();
        let label_flat             = one_hot(&answer_ids, self.label_size);

        let questions = Tensor::<B, 1, Int>::from_ints(
            question_flat.as_slice(), &self.device
        ).reshape([batch_size, ques_len]);

        let labels = Tensor::<B, 1>::from_floats(
            label_flat.as_slice(), &self.device
        ).reshape([batch_size, self.label_size]);

        let answers = Tensor::<B, 1, Int>::from_ints(
            answer_flat.as_slice(), &self.device
        );

        VqaBatch { questions, labels, answers }
    }
}
