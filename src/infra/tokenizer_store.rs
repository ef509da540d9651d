// ============================================================
// Layer 6 - Tokenizer Store
// ============================================================
// Builds the question vocabulary and persists it as a HuggingFace
// tokenizer so training and inference map words to the same ids.
//
// The vocabulary is a plain word-level one: every distinct word
// seen in the training questions gets an id, most frequent first.
// Two ids are reserved:
//
//   [PAD] = 0   left padding of short questions (zero embedding)
//   [UNK] = 1   any word not seen during training
//
// The tokenizer JSON is written by hand and loaded back with
// Tokenizer::from_file(), which avoids the trainer / ModelWrapper
// type juggling of the tokenizers training API.
//
// Words are counted with the tokenizer's own normaliser and
// pre-tokenizer (split_words), so every word that made it into
// the vocabulary encodes to its id and never to [UNK].

use anyhow::{Context, Result};
use std::{collections::HashMap, path::PathBuf, str::FromStr};
use tokenizers::{
    Normalizer, NormalizedString, OffsetReferential, OffsetType,
    PreTokenizedString, PreTokenizer, Tokenizer,
};

pub const PAD_TOKEN: &str = "[PAD]";
pub const UNK_TOKEN: &str = "[UNK]";
pub const PAD_ID: u32 = 0;
pub const UNK_ID: u32 = 1;

const TOKENIZER_FILE: &str = "tokenizer.json";

const WORD_PATTERN: &str = r"[\w']+|[^\w\s']";

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load a previously saved tokenizer from JSON file
    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.dir.join(TOKENIZER_FILE);
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {}. Have you run 'train' first?",
                path.display(), e
            ))
    }

    /// Build a word-level vocabulary from the training questions,
    /// save it, and return the loaded tokenizer.
    ///
    /// `max_words` caps the number of non-special words kept.
    pub fn build_and_save(
        &self,
        questions: &[String],
        max_words: Option<usize>,
    ) -> Result<Tokenizer> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let vocab     = build_vocab(questions, max_words)?;
        let vocab_len = vocab.len();
        let tokenizer_json = tokenizer_json(vocab);

        let tok_path = self.dir.join(TOKENIZER_FILE);
        std::fs::write(&tok_path, serde_json::to_string_pretty(&tokenizer_json)?)
            .with_context(|| format!("Cannot write tokenizer JSON to '{}'", tok_path.display()))?;

        tracing::info!(
            "Question vocabulary built with {} entries, saved to '{}'",
            vocab_len,
            tok_path.display()
        );

        Tokenizer::from_file(&tok_path)
            .map_err(|e| anyhow::anyhow!("Cannot reload tokenizer: {e}"))
    }
}

fn tokenizer_json(vocab: HashMap<String, u32>) -> serde_json::Value {
    serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [
            {"id": PAD_ID, "content": PAD_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
            {"id": UNK_ID, "content": UNK_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
        ],
        "normalizer": { "type": "Lowercase" },
        "pre_tokenizer": {
            "type": "Split",
            "pattern": { "Regex": WORD_PATTERN },
            "behavior": "Removed",
            "invert": true
        },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": UNK_TOKEN
        }
    })
}

/// Tokenizer holding only the special tokens. Its normaliser and
/// pre-tokenizer are the ones every saved tokenizer uses.
fn splitter() -> Result<Tokenizer> {
    let specials = HashMap::from([
        (PAD_TOKEN.to_string(), PAD_ID),
        (UNK_TOKEN.to_string(), UNK_ID),
    ]);
    Tokenizer::from_str(&tokenizer_json(specials).to_string())
        .map_err(|e| anyhow::anyhow!("Cannot build word splitter: {e}"))
}

/// Split text into the word strings the tokenizer's model looks up,
/// after normalisation (lowercasing) and pre-tokenisation.
///   "What's on the Table?" → ["what's", "on", "the", "table", "?"]
pub fn split_words(tokenizer: &Tokenizer, text: &str) -> Result<Vec<String>> {
    let mut normalized = NormalizedString::from(text);
    if let Some(normalizer) = tokenizer.get_normalizer() {
        normalizer
            .normalize(&mut normalized)
            .map_err(|e| anyhow::anyhow!("Normalisation error: {e}"))?;
    }

    let mut pretokenized = PreTokenizedString::from(normalized);
    if let Some(pre_tokenizer) = tokenizer.get_pre_tokenizer() {
        pre_tokenizer
            .pre_tokenize(&mut pretokenized)
            .map_err(|e| anyhow::anyhow!("Pre-tokenisation error: {e}"))?;
    }

    Ok(pretokenized
        .get_splits(OffsetReferential::Normalized, OffsetType::Byte)
        .into_iter()
        .map(|(word, _, _)| word.to_string())
        .filter(|word| !word.is_empty())
        .collect())
}

/// Count question words and assign ids: specials first, then words
/// by descending frequency, ties alphabetical.
fn build_vocab(questions: &[String], max_words: Option<usize>) -> Result<HashMap<String, u32>> {
    let splitter = splitter()?;
    let mut freq: HashMap<String, usize> = HashMap::new();
    for question in questions {
        for word in split_words(&splitter, question)? {
            *freq.entry(word).or_insert(0) += 1;
        }
    }

    let mut words: Vec<(String, usize)> = freq
        .into_iter()
        .filter(|(w, _)| w != PAD_TOKEN && w != UNK_TOKEN)
        .collect();
    words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    if let Some(max) = max_words {
        words.truncate(max);
    }

    let mut vocab = HashMap::with_capacity(words.len() + 2);
    vocab.insert(PAD_TOKEN.to_string(), PAD_ID);
    vocab.insert(UNK_TOKEN.to_string(), UNK_ID);
    for (i, (word, _)) in words.into_iter().enumerate() {
        vocab.insert(word, i as u32 + 2);
    }
    Ok(vocab)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn questions() -> Vec<String> {
        vec![
            "What color is the bus?".to_string(),
            "What is on the table?".to_string(),
            "Is the bus red?".to_string(),
        ]
    }

    #[test]
    fn test_vocab_orders_by_frequency() {
        let vocab = build_vocab(&questions(), None).unwrap();
        assert_eq!(vocab[PAD_TOKEN], PAD_ID);
        assert_eq!(vocab[UNK_TOKEN], UNK_ID);
        // "?", "is" and "the" appear three times each
        assert_eq!(vocab["?"], 2);
        assert_eq!(vocab["is"], 3);
        assert_eq!(vocab["the"], 4);
        assert_eq!(vocab["bus"], 5);
    }

    #[test]
    fn test_vocab_cap() {
        let vocab = build_vocab(&questions(), Some(2)).unwrap();
        assert_eq!(vocab.len(), 4);
        assert!(!vocab.contains_key("table"));
    }

    #[test]
    fn test_saved_tokenizer_encodes_known_and_unknown_words() {
        let dir   = tempfile::tempdir().unwrap();
        let store = TokenizerStore::new(dir.path());
        let built = store.build_and_save(&questions(), None).unwrap();
        let vocab = built.get_vocab(false);

        let loaded = store.load().unwrap();
        let enc    = loaded.encode("Is the BUS purple?", false).unwrap();
        let ids    = enc.get_ids();

        assert_eq!(ids.len(), 5);
        assert_eq!(ids[0], vocab["is"]);
        assert_eq!(ids[2], vocab["bus"]);
        assert_eq!(ids[3], UNK_ID);
        assert_eq!(ids[4], vocab["?"]);
    }

    #[test]
    fn test_split_words_lowercases_and_splits_punctuation() {
        let splitter = splitter().unwrap();
        assert_eq!(
            split_words(&splitter, "What's on the Table?").unwrap(),
            vec!["what's", "on", "the", "table", "?"],
        );
        assert!(split_words(&splitter, "").unwrap().is_empty());
    }

    #[test]
    fn test_every_training_word_encodes_to_a_known_id() {
        // Combining marks, vulgar fractions and connector punctuation
        let questions = vec![
            "is it cafe\u{301}?".to_string(),
            "x½ cup".to_string(),
            "a‿b".to_string(),
            "What's the dog_name?".to_string(),
        ];
        let dir       = tempfile::tempdir().unwrap();
        let tokenizer = TokenizerStore::new(dir.path())
            .build_and_save(&questions, None)
            .unwrap();
        let vocab = tokenizer.get_vocab(false);

        for question in &questions {
            let words = split_words(&tokenizer, question).unwrap();
            assert!(!words.is_empty(), "{question:?}");
            for word in &words {
                assert!(vocab.contains_key(word), "'{word}' missing from vocabulary");
            }

            let enc = tokenizer.encode(question.as_str(), false).unwrap();
            assert_eq!(enc.get_ids().len(), words.len(), "{question:?}");
            assert!(
                enc.get_ids().iter().all(|&id| id != UNK_ID),
                "{question:?} encoded to {:?}", enc.get_tokens()
            );
        }
    }
}
