use std::{error::Error, fs::File, path::PathBuf};

use clap::{Parser, Subcommand};
use ndarray_rand::rand::{rngs::StdRng, SeedableRng};
use tracing::info;

use perceptron::{
    data::{self, ANIMAL_CLASSES},
    init_double, init_single, logging, metrics, report, train_double, train_single, Limits,
    SingleLayer, TrainConfig, TwoLayer,
};

#[derive(Parser)]
#[command(about = "Train a small sigmoid perceptron on a toy dataset")]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Seed of the random generator; drawn from the OS when absent
    #[arg(short, long, global = true)]
    seed: Option<u64>,
    /// Write the per-step error traces to this CSV file
    #[arg(long, value_name = "PATH", global = true)]
    trace_csv: Option<PathBuf>,
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Single-layer network classifying three animals from five features
    Classify {
        #[arg(short = 'n', long, default_value_t = 70)]
        epochs: usize,
        #[arg(short = 'm', long, default_value_t = 40)]
        max_steps: usize,
        #[arg(short = 'e', long, default_value_t = 0.0002)]
        target_error: f64,
    },
    /// Two-layer network learning XOR
    Xor {
        #[arg(short = 'n', long, default_value_t = 5000)]
        epochs: usize,
        #[arg(short = 'm', long, default_value_t = 3500)]
        max_steps: usize,
        #[arg(short = 'e', long, default_value_t = 0.0003)]
        target_error: f64,
        #[arg(long, default_value_t = 2)]
        hidden: usize,
        /// No early stop before this many steps
        #[arg(long, default_value_t = 0)]
        min_steps: usize,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    logging::install_logger(args.verbose)?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    match args.command {
        Command::Classify {
            epochs,
            max_steps,
            target_error,
        } => {
            let dataset = data::animals();
            let config = TrainConfig::single_layer();
            let weights = init_single(dataset.input_dim(), dataset.target_dim(), &mut rng);
            let limits = Limits::new(epochs, max_steps, target_error);
            let outcome = train_single(weights, &dataset, &limits, &config, &mut rng)?;
            info!(steps = outcome.trace.len(), stop = ?outcome.stop, "training done");

            let layer = SingleLayer::new(outcome.weights, config.activation());
            let outputs = layer.forward(dataset.inputs())?;
            println!(
                "{}",
                report::render_table(
                    outputs.view(),
                    &ANIMAL_CLASSES,
                    &["example 1", "example 2", "example 3"],
                )
            );
            println!(
                "accuracy: {}",
                metrics::classification_accuracy(outputs.view(), dataset.targets())
            );

            if let Some(path) = args.trace_csv {
                report::write_traces_csv(File::create(path)?, &[("error", &outcome.trace)])?;
            }
        }
        Command::Xor {
            epochs,
            max_steps,
            target_error,
            hidden,
            min_steps,
        } => {
            let dataset = data::xor();
            let config = TrainConfig::two_layer().with_min_steps(min_steps);
            let (w1, w2) = init_double(dataset.input_dim(), hidden, dataset.target_dim(), &mut rng);
            let limits = Limits::new(epochs, max_steps, target_error);
            let outcome = train_double(w1, w2, &dataset, &limits, &config, &mut rng)?;
            info!(
                steps = outcome.output_trace.len(),
                stop = ?outcome.stop,
                "training done"
            );

            let network = TwoLayer::new(outcome.hidden, outcome.output, config.activation())?;
            let outputs = network.forward(dataset.inputs())?;
            println!(
                "{}",
                report::render_table(
                    outputs.output.view(),
                    &["xor"],
                    &["0 0", "0 1", "1 0", "1 1"],
                )
            );

            if let Some(path) = args.trace_csv {
                report::write_traces_csv(
                    File::create(path)?,
                    &[
                        ("hidden", &outcome.hidden_trace),
                        ("output", &outcome.output_trace),
                    ],
                )?;
            }
        }
    }

    Ok(())
}
