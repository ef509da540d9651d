use anyhow::Result;
use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;

use crate::data::{answers::AnswerTable, preprocessor::Preprocessor};
use crate::domain::record::VqaRecord;
use crate::infra::tokenizer_store::{split_words, PAD_ID};

/// One encoded example: a fixed-length question and its answer class.
/// Question layout: [PAD]... w1 w2 ... wN  (left padded to max_ques_len)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VqaSample {
    pub question_ids: Vec<u32>,
    pub answer_id:    usize,
}

/// Turns question text into fixed-length id sequences.
pub struct QuestionEncoder {
    tokenizer:    Tokenizer,
    max_ques_len: usize,
    prep:         Preprocessor,
}

impl QuestionEncoder {
    pub fn new(tokenizer: Tokenizer, max_ques_len: usize) -> Self {
        Self { tokenizer, max_ques_len, prep: Preprocessor::new() }
    }

    pub fn encode(&self, question: &str) -> Result<Vec<u32>> {
        let enc = self.tokenizer
            .encode(self.prep.clean(question), false)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;
        Ok(pad_left(enc.get_ids(), self.max_ques_len))
    }

    /// Encode labelled records. Records with an empty question, or
    /// whose answer is not in the table, are dropped.
    pub fn encode_records(
        &self,
        records: &[VqaRecord],
        answers: &AnswerTable,
    ) -> Result<Vec<VqaSample>> {
        let mut samples = Vec::with_capacity(records.len());
        for record in records {
            if split_words(&self.tokenizer, &self.prep.clean(&record.question))?.is_empty() {
                tracing::debug!("Skipping image {}: empty question", record.image_id);
                continue;
            }
            let answer = self.prep.clean_answer(&record.answer);
            let Some(answer_id) = answers.index_of(&answer) else { continue };
            samples.push(VqaSample {
                question_ids: self.encode(&record.question)?,
                answer_id,
            });
        }

        let dropped = records.len() - samples.len();
        if dropped > 0 {
            tracing::info!(
                "Dropped {} of {} records (empty question or answer outside the answer table)",
                dropped, records.len()
            );
        }
        Ok(samples)
    }
}

/// Keep the first `len` ids, then left-pad with [PAD] up to `len`.
pub fn pad_left(ids: &[u32], len: usize) -> Vec<u32> {
    let ids = &ids[..ids.len().min(len)];
    let mut out = vec![PAD_ID; len - ids.len()];
    out.extend_from_slice(ids);
    out
}

pub struct VqaDataset {
    samples: Vec<VqaSample>,
}

impl VqaDataset {
    pub fn new(samples: Vec<VqaSample>) -> Self { Self { samples } }
}

impl Dataset<VqaSample> for VqaDataset {
    fn get(&self, index: usize) -> Option<VqaSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::ImageId;
    use crate::infra::tokenizer_store::{TokenizerStore, UNK_ID};

    fn record(question: &str, answer: &str) -> VqaRecord {
        VqaRecord {
            image_id: ImageId::Number(1),
            question: question.to_string(),
            answer:   answer.to_string(),
        }
    }

    #[test]
    fn test_encode_records_pads_and_drops_unknown_answers() {
        let dir = tempfile::tempdir().unwrap();
        let tokenizer = TokenizerStore::new(dir.path())
            .build_and_save(&["is it red".to_string()], None)
            .unwrap();
        let vocab   = tokenizer.get_vocab(false);
        let encoder = QuestionEncoder::new(tokenizer, 5);
        let answers = AnswerTable::from(vec!["yes".to_string(), "no".to_string()]);

        let samples = encoder.encode_records(
            &[
                record("Is it  red?", "No "),
                record("Is it blue", "maybe"),
                record("   ", "yes"),
            ],
            &answers,
        ).unwrap();

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].answer_id, 1);
        assert_eq!(
            samples[0].question_ids,
            vec![PAD_ID, vocab["is"], vocab["it"], vocab["red"], UNK_ID],
        );
    }

    #[test]
    fn test_pad_left_short_question() {
        assert_eq!(pad_left(&[5, 6], 4), vec![PAD_ID, PAD_ID, 5, 6]);
    }

    #[test]
    fn test_pad_left_truncates_long_question() {
        assert_eq!(pad_left(&[1, 2, 3, 4, 5], 3), vec![1, 2, 3]);
        assert_eq!(pad_left(&[], 2), vec![PAD_ID, PAD_ID]);
    }
}
