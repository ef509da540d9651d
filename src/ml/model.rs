use anyhow::Result;
use burn::{
    module::Param,
    nn::{
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::{log_softmax, softmax},
};

use crate::data::embeddings::WordVectors;
use crate::ml::lstm::{LstmEncoder, LstmEncoderConfig};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct VqaModelConfig {
    pub vocab_size:   usize,
    pub embed_size:   usize,
    pub hidden_size:  usize,
    pub label_size:   usize,
    pub max_ques_len: usize,
    /// Probability that a unit survives dropout (1.0 disables it)
    #[config(default = 0.9)]
    pub keep_prob:    f64,
}

impl VqaModelConfig {
    /// Model with a randomly initialised, trainable embedding.
    pub fn init<B: Backend>(&self, device: &B::Device) -> VqaModel<B> {
        let embedding = EmbeddingConfig::new(self.vocab_size, self.embed_size).init(device);
        self.assemble(embedding, device)
    }

    /// Model whose embedding is the given pre-trained matrix, frozen.
    pub fn init_with_vectors<B: Backend>(
        &self,
        vectors: &WordVectors,
        device:  &B::Device,
    ) -> Result<VqaModel<B>> {
        anyhow::ensure!(
            vectors.vocab_size == self.vocab_size && vectors.embed_size == self.embed_size,
            "Word vectors are {}x{}, model expects {}x{}",
            vectors.vocab_size, vectors.embed_size, self.vocab_size, self.embed_size
        );

        let weight = Tensor::<B, 1>::from_floats(vectors.weights.as_slice(), device)
            .reshape([self.vocab_size, self.embed_size]);
        let mut embedding = EmbeddingConfig::new(self.vocab_size, self.embed_size).init(device);
        embedding.weight = Param::from_tensor(weight).set_require_grad(false);

        Ok(self.assemble(embedding, device))
    }

    fn assemble<B: Backend>(&self, embedding: Embedding<B>, device: &B::Device) -> VqaModel<B> {
        let drop_prob = 1.0 - self.keep_prob;
        VqaModel {
            embedding,
            input_dropout: DropoutConfig::new(drop_prob).init(),
            lstm:          LstmEncoderConfig::new(self.embed_size, self.hidden_size).init(device),
            lstm_dropout:  DropoutConfig::new(drop_prob).init(),
            projection:    LinearConfig::new(self.hidden_size, self.label_size).init(device),
        }
    }
}

/// question ids → embedding → dropout → LSTM → dropout → projection
///
/// Dropout is only active on autodiff backends, so the same model
/// trains with dropout and evaluates without it after `.valid()`.
#[derive(Module, Debug)]
pub struct VqaModel<B: Backend> {
    pub embedding:     Embedding<B>,
    pub input_dropout: Dropout,
    pub lstm:          LstmEncoder<B>,
    pub lstm_dropout:  Dropout,
    pub projection:    Linear<B>,
}

impl<B: Backend> VqaModel<B> {
    /// questions: [batch, max_ques_len] → logits: [batch, label_size]
    pub fn forward(&self, questions: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let inputs = self.embedding.forward(questions);
        let inputs = self.input_dropout.forward(inputs);

        let encoded = self.lstm.forward(inputs);
        let encoded = self.lstm_dropout.forward(encoded);

        self.projection.forward(encoded)
    }

    /// Answer probabilities, [batch, label_size]
    pub fn predictions(&self, questions: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        softmax(self.forward(questions), 1)
    }

    /// Mean softmax cross-entropy against one-hot labels.
    pub fn forward_loss(
        &self,
        questions: Tensor<B, 2, Int>,
        labels:    Tensor<B, 2>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(questions);
        let loss   = softmax_cross_entropy(logits.clone(), labels);
        (loss, logits)
    }
}

/// mean_over_batch( -Σ_k labels_k · log softmax(logits)_k )
pub fn softmax_cross_entropy<B: Backend>(logits: Tensor<B, 2>, labels: Tensor<B, 2>) -> Tensor<B, 1> {
    (log_softmax(logits, 1) * labels)
        .sum_dim(1)
        .neg()
        .mean()
}

/// Number of rows where argmax(logits) equals argmax(labels).
pub fn correct_predictions<B: Backend>(logits: Tensor<B, 2>, labels: Tensor<B, 2>) -> usize {
    let predicted = logits.argmax(1).flatten::<1>(0, 1);
    let expected  = labels.argmax(1).flatten::<1>(0, 1);
    predicted
        .equal(expected)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>() as usize
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TB = NdArray;

    fn config() -> VqaModelConfig {
        VqaModelConfig::new(10, 4, 6, 3, 5)
    }

    #[test]
    fn test_forward_shapes() {
        let device = Default::default();
        let model  = config().init::<TB>(&device);
        let questions = Tensor::<TB, 1, Int>::from_ints([0, 0, 2, 3, 4, 0, 5, 6, 7, 8], &device)
            .reshape([2, 5]);

        assert_eq!(model.forward(questions.clone()).dims(), [2, 3]);

        let probs: Vec<f32> = model.predictions(questions).into_data().to_vec().unwrap();
        let row_sum: f32 = probs[..3].iter().sum();
        assert!((row_sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_uniform_logits_give_log_label_size_loss() {
        let device = Default::default();
        let logits = Tensor::<TB, 2>::zeros([2, 4], &device);
        let labels = Tensor::<TB, 1>::from_floats([0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0], &device)
            .reshape([2, 4]);

        let loss = softmax_cross_entropy(logits, labels).into_scalar();
        assert!((loss - 4.0f32.ln()).abs() < 1e-5);
    }

    #[test]
    fn test_correct_predictions_counts_argmax_matches() {
        let device = Default::default();
        let logits = Tensor::<TB, 1>::from_floats([0.1, 2.0, 0.3, 5.0, 0.0, 1.0], &device)
            .reshape([2, 3]);
        let labels = Tensor::<TB, 1>::from_floats([0.0, 1.0, 0.0, 0.0, 0.0, 1.0], &device)
            .reshape([2, 3]);

        assert_eq!(correct_predictions(logits, labels), 1);
    }

    #[test]
    fn test_pretrained_vectors_are_used_verbatim() {
        let device  = Default::default();
        let cfg     = config();
        let weights: Vec<f32> = (0..cfg.vocab_size * cfg.embed_size).map(|v| v as f32).collect();
        let vectors = WordVectors { vocab_size: 10, embed_size: 4, weights: weights.clone(), found: 10 };

        let model  = cfg.init_with_vectors::<TB>(&vectors, &device).unwrap();
        let stored: Vec<f32> = model.embedding.weight.val().into_data().to_vec().unwrap();
        assert_eq!(stored, weights);
    }

    fn questions<B: Backend>(device: &B::Device) -> Tensor<B, 2, Int> {
        Tensor::<B, 1, Int>::from_ints([1, 2, 3, 4, 5, 6, 7, 8, 9, 1], device).reshape([2, 5])
    }

    fn to_vec<B: Backend>(t: Tensor<B, 2>) -> Vec<f32> {
        t.into_data().to_vec().unwrap()
    }

    #[test]
    fn test_dropout_is_off_without_autodiff() {
        let device = Default::default();
        let model  = config().with_keep_prob(0.5).init::<TB>(&device);

        let first  = to_vec(model.predictions(questions::<TB>(&device)));
        let second = to_vec(model.predictions(questions::<TB>(&device)));
        assert_eq!(first, second);
    }

    #[test]
    fn test_dropout_is_on_while_training_and_off_after_valid() {
        use burn::{backend::Autodiff, module::AutodiffModule};
        type AB = Autodiff<TB>;

        let device = Default::default();
        let model  = config().with_keep_prob(0.5).init::<AB>(&device);

        let first  = to_vec(model.forward(questions::<AB>(&device)));
        let second = to_vec(model.forward(questions::<AB>(&device)));
        assert_ne!(first, second);

        let valid  = model.valid();
        let first  = to_vec(valid.predictions(questions::<TB>(&device)));
        let second = to_vec(valid.predictions(questions::<TB>(&device)));
        assert_eq!(first, second);
    }

    #[test]
    fn test_mismatched_vectors_are_rejected() {
        let device  = Default::default();
        let vectors = WordVectors { vocab_size: 3, embed_size: 4, weights: vec![0.0; 12], found: 0 };
        assert!(config().init_with_vectors::<TB>(&vectors, &device).is_err());
    }
}
