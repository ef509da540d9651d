// ============================================================
// Layer 5 - Training Loop
// ============================================================
// Epoch loop with Adam, validation-driven checkpointing and a
// final test pass on the best checkpoint:
//
//   for each epoch:
//     train:    dropout on, Adam step per batch
//     validate: model.valid() → inner backend, dropout off
//     if val_loss < best: save checkpoint
//   restore best checkpoint
//   predict on test set (full batches only) → accuracy
//
// Key Burn insight:
//   - Training runs on B (an AutodiffBackend) for gradients
//   - model.valid() returns the model on B::InnerBackend, where
//     Dropout is a no-op, so validation needs no dropout switch
//   - The validation batcher must also use B::InnerBackend
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{decay::WeightDecayConfig, AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::time::Instant;

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{VqaBatch, VqaBatcher},
    dataset::{VqaDataset, VqaSample},
    embeddings::WordVectors,
    splitter::Splits,
};
use crate::infra::{
    checkpoint::{BestEpoch, CheckpointManager},
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::model::{correct_predictions, VqaModel, VqaModelConfig};
use crate::ml::predictor::{accuracy, predict};

type MyBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

const PROGRESS_EVERY: usize = 10;

/// What a finished training run reports.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub best:          BestEpoch,
    pub test_accuracy: f64,
    pub test_predicted: usize,
}

/// Mean loss and accuracy over one pass of a data set.
#[derive(Debug, Clone, Copy)]
pub struct EpochSummary {
    pub loss:     f64,
    pub accuracy: f64,
}

pub fn run_training(
    cfg:       &TrainConfig,
    model_cfg: &VqaModelConfig,
    vectors:   Option<&WordVectors>,
    splits:    Splits<VqaSample>,
    ckpt:      &CheckpointManager,
) -> Result<TrainingOutcome> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train::<MyBackend>(cfg, model_cfg, vectors, splits, ckpt, device)
}

pub fn train<B: AutodiffBackend>(
    cfg:       &TrainConfig,
    model_cfg: &VqaModelConfig,
    vectors:   Option<&WordVectors>,
    splits:    Splits<VqaSample>,
    ckpt:      &CheckpointManager,
    device:    B::Device,
) -> Result<TrainingOutcome> {
    anyhow::ensure!(!splits.train.is_empty(), "Training set is empty");
    anyhow::ensure!(
        !splits.valid.is_empty(),
        "Validation set is empty: need at least 4 usable training records"
    );

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: VqaModel<B> = match vectors {
        Some(v) => model_cfg.init_with_vectors(v, &device)?,
        None    => model_cfg.init(&device),
    };
    tracing::info!(
        "Model ready: vocab={}, embed={}, hidden={}, answers={}, frozen_embedding={}",
        model_cfg.vocab_size, model_cfg.embed_size, model_cfg.hidden_size,
        model_cfg.label_size, vectors.is_some(),
    );

    let mut optim = AdamConfig::new()
        .with_weight_decay(
            (cfg.l2 > 0.0).then(|| WeightDecayConfig::new(cfg.l2 as f32))
        )
        .init();

    let metrics = MetricsLogger::new(ckpt.dir())?;
    tracing::info!("Writing epoch metrics to '{}'", metrics.csv_path().display());

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_steps = splits.train.len().div_ceil(cfg.batch_size);
    let train_loader = DataLoaderBuilder::new(VqaBatcher::<B>::new(device.clone(), model_cfg.label_size))
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .build(VqaDataset::new(splits.train));

    let valid_loader = DataLoaderBuilder::new(
            VqaBatcher::<B::InnerBackend>::new(device.clone(), model_cfg.label_size)
        )
        .batch_size(cfg.batch_size)
        .build(VqaDataset::new(splits.valid));

    // ── Epoch loop ────────────────────────────────────────────────────────────
    let mut best: Option<BestEpoch> = None;

    for epoch in 0..cfg.max_epochs {
        println!("Epoch {epoch}");
        let start = Instant::now();

        // ── Training phase ────────────────────────────────────────────────────
        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;
        for (step, batch) in train_loader.iter().enumerate() {
            let (loss, _) = model.forward_loss(batch.questions, batch.labels);
            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            loss_sum += loss_val;
            batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);

            if step % PROGRESS_EVERY == 0 {
                tracing::info!("{} / {} : loss = {:.6}", step, train_steps, loss_val);
            }
        }
        let train_loss = mean(loss_sum, batches);

        // ── Validation phase ──────────────────────────────────────────────────
        let valid = evaluate(&model.valid(), valid_loader.iter());
        let elapsed = start.elapsed().as_secs_f64();

        println!("Training loss: {train_loss:.6}");
        println!("Validation loss: {:.6}", valid.loss);
        println!("Validation accuracy: {:.2}%", valid.accuracy * 100.0);
        println!("Total time: {elapsed:.1}s");

        let row = EpochMetrics::new(epoch, train_loss, valid.loss, valid.accuracy, elapsed);
        metrics.log(&row)?;

        let best_loss = best.map_or(f64::INFINITY, |b| b.val_loss);
        if row.is_improvement(best_loss) {
            let improved = BestEpoch { epoch, val_loss: valid.loss };
            ckpt.save_model(&model, improved)?;
            tracing::info!("New best validation loss {:.6} at epoch {}", valid.loss, epoch);
            best = Some(improved);
        }
    }

    let best = best.ok_or_else(|| anyhow::anyhow!(
        "No checkpoint was saved: validation loss never became finite"
    ))?;

    // ── Test the best checkpoint ──────────────────────────────────────────────
    let restored = ckpt.load_model(model_cfg.init::<B::InnerBackend>(&device), &device)?;
    println!("Test Model: ");
    let test_batcher = VqaBatcher::<B::InnerBackend>::new(device, model_cfg.label_size);
    let preds  = predict(&restored, &test_batcher, &splits.test, cfg.batch_size)?;
    let labels: Vec<usize> = splits.test.iter().map(|s| s.answer_id).collect();
    let test_accuracy = accuracy(&preds.indices, &labels, cfg.batch_size);
    println!("accuracy: {test_accuracy:.4}");

    tracing::info!("Training complete!");
    Ok(TrainingOutcome { best, test_accuracy, test_predicted: preds.indices.len() })
}

/// One pass without parameter updates.
pub fn evaluate<B: Backend>(
    model:   &VqaModel<B>,
    batches: impl Iterator<Item = VqaBatch<B>>,
) -> EpochSummary {
    let mut loss_sum = 0.0f64;
    let mut count    = 0usize;
    let mut correct  = 0usize;
    let mut total    = 0usize;

    for batch in batches {
        total += batch.answers.dims()[0];
        let (loss, logits) = model.forward_loss(batch.questions, batch.labels.clone());
        loss_sum += loss.into_scalar().elem::<f64>();
        count    += 1;
        correct  += correct_predictions(logits, batch.labels);
    }

    EpochSummary {
        loss:     mean(loss_sum, count),
        accuracy: if total > 0 { correct as f64 / total as f64 } else { 0.0 },
    }
}

fn mean(sum: f64, count: usize) -> f64 {
    if count > 0 { sum / count as f64 } else { f64::NAN }
}
