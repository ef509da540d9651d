// ============================================================
// Layer 4 - Train / Validation Splitter
// ============================================================
// Carves a validation set out of the training split so the
// checkpoint can be chosen on data the model never trained on.
//
// Normal mode:
//   validation = first quarter of the training records
//   training   = the remaining three quarters
//
// Debug mode (quick smoke runs on a full-size dataset):
//   training   = records [0, 1024)
//   validation = records [1024, 2048)
//   test       = first 65 test records
//
// Order is preserved: the split is a fixed holdout, so a given
// dataset always yields the same validation set. Shuffling of
// training batches happens later, in the DataLoader.

const DEBUG_TRAIN: usize = 1024;
const DEBUG_VALID: usize = 1024;
const DEBUG_TEST:  usize = 65;

/// The three sets a training run works with.
#[derive(Debug)]
pub struct Splits<T> {
    pub train: Vec<T>,
    pub valid: Vec<T>,
    pub test:  Vec<T>,
}

/// Hold out the first quarter of `train` for validation.
pub fn split_holdout<T>(mut train: Vec<T>, test: Vec<T>) -> Splits<T> {
    let valid_len = train.len() / 4;
    let rest      = train.split_off(valid_len);

    tracing::debug!(
        "Dataset split: {} training, {} validation, {} test",
        rest.len(),
        train.len(),
        test.len(),
    );

    Splits { train: rest, valid: train, test }
}

/// Small fixed subsets for debugging runs.
pub fn split_debug<T>(mut train: Vec<T>, mut test: Vec<T>) -> Splits<T> {
    train.truncate(DEBUG_TRAIN + DEBUG_VALID);
    let valid = train.split_off(DEBUG_TRAIN.min(train.len()));
    test.truncate(DEBUG_TEST);

    Splits { train, valid, test }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_quarter_is_validation() {
        let items: Vec<usize> = (0..10).collect();
        let splits = split_holdout(items, vec![100]);

        assert_eq!(splits.valid, vec![0, 1]);
        assert_eq!(splits.train, (2..10).collect::<Vec<_>>());
        assert_eq!(splits.test, vec![100]);
    }

    #[test]
    fn test_tiny_training_set_has_empty_validation() {
        let splits = split_holdout(vec![1, 2, 3], Vec::<usize>::new());
        assert!(splits.valid.is_empty());
        assert_eq!(splits.train.len(), 3);
    }

    #[test]
    fn test_debug_subsets() {
        let train: Vec<usize> = (0..3000).collect();
        let test:  Vec<usize> = (0..100).collect();
        let splits = split_debug(train, test);

        assert_eq!(splits.train.len(), 1024);
        assert_eq!(splits.valid.first(), Some(&1024));
        assert_eq!(splits.valid.len(), 1024);
        assert_eq!(splits.test.len(), 65);
    }

    #[test]
    fn test_debug_subsets_clamp_to_available_data() {
        let splits = split_debug((0..1500).collect::<Vec<usize>>(), vec![1, 2]);
        assert_eq!(splits.train.len(), 1024);
        assert_eq!(splits.valid.len(), 476);
        assert_eq!(splits.test.len(), 2);
    }
}
