// ============================================================
// Layer 4 - Pre-trained Word Embeddings
// ============================================================
// Builds the embedding matrix for the question vocabulary from a
// GloVe text file (e.g. glove.6B.300d.txt). Each line is:
//
//   word v1 v2 ... vD
//
// The file holds hundreds of thousands of words; only the ones in
// our vocabulary are kept. Row layout of the result:
//
//   row 0 ([PAD])        → all zeros
//   row of a found word  → its GloVe vector
//   any other row        → uniform noise in [-0.1, 0.1)
//
// The noise comes from a seeded RNG so two runs with the same seed
// build the same matrix.

use anyhow::{Context, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// Row-major `[vocab_size, embed_size]` matrix.
#[derive(Debug, Clone)]
pub struct WordVectors {
    pub vocab_size: usize,
    pub embed_size: usize,
    pub weights:    Vec<f32>,
    /// How many vocabulary words had a pre-trained vector
    pub found:      usize,
}

/// Load GloVe vectors for every word in `vocab` (word → id).
pub fn load_glove(
    path:       &Path,
    vocab:      &HashMap<String, u32>,
    embed_size: usize,
    pad_id:     u32,
    seed:       u64,
) -> Result<WordVectors> {
    let file = File::open(path)
        .with_context(|| format!("Cannot open embeddings file '{}'", path.display()))?;
    read_glove(BufReader::new(file), vocab, embed_size, pad_id, seed)
}

pub fn read_glove(
    reader:     impl BufRead,
    vocab:      &HashMap<String, u32>,
    embed_size: usize,
    pad_id:     u32,
    seed:       u64,
) -> Result<WordVectors> {
    let vocab_size = vocab.values().map(|&id| id as usize + 1).max().unwrap_or(0);
    let mut rng    = StdRng::seed_from_u64(seed);
    let mut weights: Vec<f32> = (0..vocab_size * embed_size)
        .map(|_| rng.gen_range(-0.1f32..0.1f32))
        .collect();

    let pad = pad_id as usize;
    if pad < vocab_size {
        weights[pad * embed_size..(pad + 1) * embed_size].fill(0.0);
    }

    let mut found = 0usize;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.context("Embeddings file is not valid UTF-8")?;
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else { continue };
        let Some(&id) = vocab.get(word) else { continue };

        let values: Result<Vec<f32>, _> = parts.map(str::parse::<f32>).collect();
        match values {
            Ok(v) if v.len() == embed_size => {
                let id = id as usize;
                weights[id * embed_size..(id + 1) * embed_size].copy_from_slice(&v);
                found += 1;
            }
            Ok(v) => tracing::warn!(
                "Embedding line {} for '{}' has {} values, expected {}",
                line_no + 1, word, v.len(), embed_size
            ),
            Err(e) => tracing::warn!("Embedding line {} for '{}': {}", line_no + 1, word, e),
        }
    }

    tracing::info!(
        "Pre-trained vectors found for {}/{} vocabulary words",
        found, vocab_size
    );
    Ok(WordVectors { vocab_size, embed_size, weights, found })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn row(wv: &WordVectors, id: usize) -> &[f32] {
        &wv.weights[id * wv.embed_size..(id + 1) * wv.embed_size]
    }

    fn vocab() -> HashMap<String, u32> {
        [("[PAD]", 0), ("[UNK]", 1), ("dog", 2), ("cat", 3)]
            .into_iter()
            .map(|(w, i)| (w.to_string(), i))
            .collect()
    }

    #[test]
    fn test_known_words_take_glove_vectors() {
        let glove = "the 9 9 9\ndog 0.5 -0.5 1.0\ncat 1 2 3\n";
        let wv = read_glove(glove.as_bytes(), &vocab(), 3, 0, 7).unwrap();

        assert_eq!(wv.vocab_size, 4);
        assert_eq!(wv.found, 2);
        assert_eq!(row(&wv, 2), &[0.5, -0.5, 1.0]);
        assert_eq!(row(&wv, 3), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_pad_is_zero_and_unknown_is_small_noise() {
        let wv = read_glove("".as_bytes(), &vocab(), 4, 0, 7).unwrap();

        assert!(row(&wv, 0).iter().all(|&v| v == 0.0));
        assert!(row(&wv, 1).iter().all(|&v| (-0.1..0.1).contains(&v)));
        assert_eq!(wv.found, 0);
    }

    #[test]
    fn test_wrong_dimension_lines_are_skipped() {
        let wv = read_glove("dog 1 2\n".as_bytes(), &vocab(), 3, 0, 7).unwrap();
        assert_eq!(wv.found, 0);
    }

    #[test]
    fn test_trailing_whitespace_is_ignored() {
        let glove = "dog 0.5 -0.5 1.0 \ncat 1 2 3\r\n";
        let wv = read_glove(glove.as_bytes(), &vocab(), 3, 0, 7).unwrap();

        assert_eq!(wv.found, 2);
        assert_eq!(row(&wv, 2), &[0.5, -0.5, 1.0]);
        assert_eq!(row(&wv, 3), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_same_seed_same_matrix() {
        let a = read_glove("".as_bytes(), &vocab(), 3, 0, 11).unwrap();
        let b = read_glove("".as_bytes(), &vocab(), 3, 0, 11).unwrap();
        assert_eq!(a.weights, b.weights);
    }
}
