// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Parses the command line with clap and routes to the matching
// use case. Only this layer prints results for the user.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{AskArgs, Commands, EvaluateArgs, TrainArgs};

use crate::domain::traits::QuestionAnswerer;

#[derive(Parser, Debug)]
#[command(
    name = "vqa-lstm",
    version,
    about = "Train an LSTM question model for visual question answering, then evaluate or ask it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
            Commands::Ask(args)      => run_ask(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on dataset in: {}", args.data_dir);
    let outcome = TrainUseCase::new(args.into()).execute()?;

    println!(
        "Training complete. Best epoch {} (validation loss {:.4}), test accuracy {:.4} over {} questions.",
        outcome.best.epoch, outcome.best.val_loss, outcome.test_accuracy, outcome.test_predicted,
    );
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let eval = EvaluateUseCase::new(args.checkpoint_dir, args.data_dir).execute()?;
    println!(
        "accuracy: {:.4} over {} questions (mean confidence {:.4})",
        eval.accuracy, eval.predicted, eval.mean_confidence,
    );
    Ok(())
}

fn run_ask(args: AskArgs) -> Result<()> {
    use crate::application::ask_use_case::AskUseCase;

    let use_case = AskUseCase::new(args.checkpoint_dir)?;
    let answers  = use_case.answer(&args.question, args.top_k)?;

    match answers.first() {
        Some((answer, confidence)) => {
            println!("\nAnswer: {} ({:.1}%)", answer, confidence * 100.0);
            for (answer, confidence) in answers.iter().skip(1) {
                println!("        {} ({:.1}%)", answer, confidence * 100.0);
            }
        }
        None => println!("\nNo answer available."),
    }
    Ok(())
}
