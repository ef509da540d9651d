// ============================================================
// Layer 6 - Metrics Logger
// ============================================================
// Appends one CSV row per training epoch:
//
//   epoch,train_loss,val_loss,val_accuracy,elapsed_secs
//   0,6.412003,6.398120,0.041000,183.2
//   1,5.873310,5.910442,0.118000,181.7
//
// Output file: checkpoints/metrics.csv
// Rows from several runs accumulate in the same file.

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Zero-based epoch number
    pub epoch: usize,

    /// Mean batch loss over the training set (dropout on)
    pub train_loss: f64,

    /// Mean batch loss over the validation set (dropout off)
    pub val_loss: f64,

    /// Fraction of validation answers predicted exactly
    pub val_accuracy: f64,

    /// Wall time spent on training + validation this epoch
    pub elapsed_secs: f64,
}

impl EpochMetrics {
    pub fn new(
        epoch:        usize,
        train_loss:   f64,
        val_loss:     f64,
        val_accuracy: f64,
        elapsed_secs: f64,
    ) -> Self {
        Self { epoch, train_loss, val_loss, val_accuracy, elapsed_secs }
    }

    /// Strictly lower validation loss than the best so far
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,val_loss,val_accuracy,elapsed_secs")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.1}",
            m.epoch,
            m.train_loss,
            m.val_loss,
            m.val_accuracy,
            m.elapsed_secs,
        )?;

        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_improvement() {
        let m = EpochMetrics::new(2, 2.5, 2.3, 0.2, 10.0);
        assert!(m.is_improvement(3.0));
        assert!(!m.is_improvement(2.0));
        // equal is not an improvement
        assert!(!m.is_improvement(2.3));
        assert!(m.is_improvement(f64::INFINITY));
    }

    #[test]
    fn test_rows_are_appended_under_header() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&EpochMetrics::new(0, 1.0, 2.0, 0.25, 3.0)).unwrap();
        logger.log(&EpochMetrics::new(1, 0.5, 1.5, 0.5, 3.0)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "epoch,train_loss,val_loss,val_accuracy,elapsed_secs");
        assert_eq!(lines[1], "0,1.000000,2.000000,0.250000,3.0");
        assert_eq!(lines.len(), 3);
    }
}
