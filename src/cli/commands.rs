// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Defines the subcommands `train`, `evaluate` and `ask` and all
// their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the question model and test the best checkpoint
    Train(TrainArgs),

    /// Re-run the test pass of a trained checkpoint
    Evaluate(EvaluateArgs),

    /// Answer a question using a trained checkpoint
    Ask(AskArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory containing train.jsonl and test.jsonl
    #[arg(long, default_value = "data/vqa")]
    pub data_dir: String,

    /// Directory to save the checkpoint, vocabulary and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// GloVe vectors (e.g. glove.6B.300d.txt). Loaded vectors are
    /// frozen; without this flag embeddings are learned.
    #[arg(long)]
    pub embeddings: Option<String>,

    /// Word vector dimension, must match the embeddings file
    #[arg(long, default_value_t = 300)]
    pub embed_size: usize,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Maximum number of answer classes (most frequent answers)
    #[arg(long, default_value_t = 1000)]
    pub label_size: usize,

    /// LSTM hidden state size
    #[arg(long, default_value_t = 1024)]
    pub hidden_size: usize,

    #[arg(long, default_value_t = 15)]
    pub max_epochs: usize,

    /// Probability of keeping a unit in dropout (1.0 disables dropout)
    #[arg(long, default_value_t = 0.9)]
    pub keep_prob: f64,

    /// Adam learning rate
    #[arg(long, default_value_t = 2e-5)]
    pub lr: f64,

    /// Weight decay penalty (0 disables it)
    #[arg(long, default_value_t = 0.001)]
    pub l2: f64,

    /// Questions are padded / truncated to this many tokens
    #[arg(long, default_value_t = 25)]
    pub max_ques_len: usize,

    /// Keep only the N most frequent question words
    #[arg(long)]
    pub max_vocab: Option<usize>,

    /// Train on 1024 records, validate on the next 1024, test on 65
    #[arg(long)]
    pub debug: bool,

    /// Seed for batch shuffling and unseen-word vectors
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:       a.data_dir,
            checkpoint_dir: a.checkpoint_dir,
            embeddings:     a.embeddings,
            embed_size:     a.embed_size,
            batch_size:     a.batch_size,
            label_size:     a.label_size,
            hidden_size:    a.hidden_size,
            max_epochs:     a.max_epochs,
            keep_prob:      a.keep_prob,
            lr:             a.lr,
            l2:             a.l2,
            max_ques_len:   a.max_ques_len,
            max_vocab:      a.max_vocab,
            debug:          a.debug,
            seed:           a.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Directory where training saved its checkpoint
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Dataset directory; defaults to the one used for training
    #[arg(long)]
    pub data_dir: Option<String>,
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The natural language question to answer
    #[arg(long)]
    pub question: String,

    /// Directory where training saved its checkpoint
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// How many ranked answers to print
    #[arg(long, default_value_t = 3)]
    pub top_k: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["vqa-lstm", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        let def = TrainConfig::default();

        assert_eq!(cfg.batch_size, def.batch_size);
        assert_eq!(cfg.hidden_size, def.hidden_size);
        assert_eq!(cfg.label_size, def.label_size);
        assert_eq!(cfg.max_ques_len, def.max_ques_len);
        assert_eq!(cfg.keep_prob, def.keep_prob);
        assert_eq!(cfg.lr, def.lr);
        assert!(cfg.embeddings.is_none());
    }

    #[test]
    fn test_ask_requires_question() {
        assert!(Cli::try_parse_from(["vqa-lstm", "ask"]).is_err());
        let cli = Cli::try_parse_from(["vqa-lstm", "ask", "--question", "Is it red?", "--top-k", "5"])
            .unwrap();
        let Commands::Ask(args) = cli.command else { panic!("expected ask") };
        assert_eq!(args.top_k, 5);
    }
}
