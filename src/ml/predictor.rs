// ============================================================
// Layer 5 - Batch Predictor
// ============================================================
// Runs the model over a dataset in fixed-size batches and keeps,
// for every sample, the most probable answer id and its
// probability (the model's confidence).
//
// Only full batches are predicted: the trailing partial batch is
// dropped, so N samples yield N - N % batch_size predictions.
// accuracy() truncates the label list the same way before
// comparing.

use anyhow::Result;
use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::{batcher::VqaBatcher, dataset::VqaSample};
use crate::ml::model::VqaModel;

const PROGRESS_EVERY: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct Predictions {
    pub indices:     Vec<usize>,
    pub confidences: Vec<f32>,
}

/// Predict answer ids for every full batch of `samples`.
pub fn predict<B: Backend>(
    model:      &VqaModel<B>,
    batcher:    &VqaBatcher<B>,
    samples:    &[VqaSample],
    batch_size: usize,
) -> Result<Predictions> {
    anyhow::ensure!(batch_size > 0, "batch_size must be positive");

    let total_steps = samples.len() / batch_size;
    let mut out     = Predictions::default();

    for (step, chunk) in samples.chunks_exact(batch_size).enumerate() {
        let batch = batcher.batch(chunk.to_vec());
        let (confidence, indices) = model
            .predictions(batch.questions)
            .max_dim_with_indices(1);

        let indices: Vec<i64> = indices
            .into_data()
            .convert::<i64>()
            .to_vec()
            .map_err(|e| anyhow::anyhow!("Cannot read predicted indices: {e:?}"))?;
        let confidence: Vec<f32> = confidence
            .into_data()
            .convert::<f32>()
            .to_vec()
            .map_err(|e| anyhow::anyhow!("Cannot read confidences: {e:?}"))?;

        out.indices.extend(indices.into_iter().map(|i| i as usize));
        out.confidences.extend(confidence);

        if step % PROGRESS_EVERY == 0 {
            tracing::info!("{} / {}", step, total_steps);
        }
    }

    Ok(out)
}

/// Fraction of predictions equal to the (batch-truncated) labels.
pub fn accuracy(predicted: &[usize], labels: &[usize], batch_size: usize) -> f64 {
    if predicted.is_empty() || batch_size == 0 {
        return 0.0;
    }
    let usable  = labels.len() - labels.len() % batch_size;
    let correct = predicted
        .iter()
        .zip(&labels[..usable])
        .filter(|(p, l)| p == l)
        .count();
    correct as f64 / predicted.len() as f64
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use crate::ml::model::VqaModelConfig;

    type TB = NdArray;

    fn samples(n: usize) -> Vec<VqaSample> {
        (0..n)
            .map(|i| VqaSample { question_ids: vec![0, (i % 5) as u32 + 2, 1], answer_id: i % 3 })
            .collect()
    }

    #[test]
    fn test_trailing_partial_batch_is_dropped() {
        let device  = Default::default();
        let model   = VqaModelConfig::new(8, 4, 5, 3, 3).init::<TB>(&device);
        let batcher = VqaBatcher::<TB>::new(device, 3);

        let preds = predict(&model, &batcher, &samples(10), 4).unwrap();
        assert_eq!(preds.indices.len(), 8);
        assert_eq!(preds.confidences.len(), 8);
        assert!(preds.indices.iter().all(|&i| i < 3));
        // the max of a 3-way softmax is at least 1/3
        assert!(preds.confidences.iter().all(|&c| c >= 1.0 / 3.0 - 1e-6 && c <= 1.0));
    }

    #[test]
    fn test_fewer_samples_than_a_batch_predicts_nothing() {
        let device  = Default::default();
        let model   = VqaModelConfig::new(8, 4, 5, 3, 3).init::<TB>(&device);
        let batcher = VqaBatcher::<TB>::new(device, 3);

        let preds = predict(&model, &batcher, &samples(3), 4).unwrap();
        assert!(preds.indices.is_empty());
    }

    #[test]
    fn test_accuracy_truncates_labels() {
        // 5 labels, batch 2 → only the first 4 count
        let labels    = [1, 2, 0, 0, 9];
        let predicted = [1, 2, 1, 0];
        assert_eq!(accuracy(&predicted, &labels, 2), 0.75);
    }

    #[test]
    fn test_accuracy_of_nothing_is_zero() {
        assert_eq!(accuracy(&[], &[1, 2, 3], 4), 0.0);
    }
}
