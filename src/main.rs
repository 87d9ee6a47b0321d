use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mlp::{Activation, Network, NetworkConfig, OptimisationParameters};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "mlp")]
#[command(about = "Multilayer perceptron trained by backpropagation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on one example and print the resulting network
    Train {
        /// Input values, comma separated
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, default_value = "1.2,6.3")]
        input: Vec<f32>,

        /// Target values, comma separated
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, default_value = "6.3,3.2")]
        target: Vec<f32>,

        /// Hidden layer widths, comma separated; non-positive widths are skipped
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, default_value = "5,4")]
        hidden: Vec<i64>,

        /// Activation function (sigmoid, leaky-relu, tanh or 0, 1, 2)
        #[arg(short, long, default_value = "sigmoid")]
        activation: Activation,

        /// Bias neuron value in [0, 1], 0 disables it
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        bias: f32,

        /// Learning rate in [0, 1]
        #[arg(long, default_value_t = 0.5, allow_hyphen_values = true)]
        learning_rate: f32,

        /// Mean squared error at which training stops
        #[arg(long, default_value_t = 0.001, allow_hyphen_values = true)]
        loss_limit: f32,

        /// Maximum number of iterations
        #[arg(long, default_value_t = 1_000_000)]
        max_iterations: usize,

        /// Seed for the weight initialisation
        #[arg(long)]
        seed: Option<u64>,

        /// JSON file with `network` and `optimisation` sections, replacing the flags above
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the trained weights to this file
        #[arg(long)]
        weights: Option<PathBuf>,

        /// Write a JSON snapshot of the trained network to this (new) file
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Run the forward pass of a saved network
    Predict {
        /// Input values, comma separated
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        input: Vec<f32>,

        /// Weights file written by `train --weights`
        #[arg(long, required_unless_present = "snapshot", conflicts_with = "snapshot")]
        weights: Option<PathBuf>,

        /// JSON snapshot written by `train --snapshot`
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Activation function the weights were trained with
        #[arg(short, long, default_value = "sigmoid")]
        activation: Activation,

        /// Bias neuron value the weights were trained with, required with --weights
        #[arg(long, required_unless_present = "snapshot", allow_hyphen_values = true)]
        bias: Option<f32>,
    },
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Settings {
    network: NetworkConfig,
    optimisation: OptimisationParameters,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level: Level = cli.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Train {
            input,
            target,
            hidden,
            activation,
            bias,
            learning_rate,
            loss_limit,
            max_iterations,
            seed,
            config,
            weights,
            snapshot,
        } => {
            let settings = match config {
                Some(path) => {
                    let json = fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    serde_json::from_str::<Settings>(&json)
                        .with_context(|| format!("parsing {}", path.display()))?
                }
                None => Settings {
                    network: NetworkConfig {
                        hidden,
                        activation,
                        bias,
                        seed,
                    },
                    optimisation: OptimisationParameters {
                        learning_rate,
                        loss_limit,
                        max_iterations,
                    },
                },
            };
            info!("{}", settings.network);
            info!("{}", settings.optimisation);

            let mut network = Network::new(settings.network, settings.optimisation);
            let summary = network.train(&input, &target)?;
            info!(
                iterations = summary.iterations,
                loss = summary.loss,
                state = %network.state,
                "training finished"
            );
            println!("{}", network.report_with_loss(summary.loss));

            if let Some(path) = weights {
                network
                    .save_weights(&path)
                    .with_context(|| format!("writing weights to {}", path.display()))?;
                info!("Weights saved as: {}", path.display());
            }
            if let Some(path) = snapshot {
                network
                    .save_network(&path)
                    .with_context(|| format!("writing snapshot to {}", path.display()))?;
                info!("Network snapshot saved as: {}", path.display());
            }
        }
        Commands::Predict {
            input,
            weights,
            snapshot,
            activation,
            bias,
        } => {
            let mut network = match (weights, snapshot) {
                (_, Some(path)) => Network::read_network(&path)
                    .with_context(|| format!("reading snapshot {}", path.display()))?,
                (Some(path), None) => {
                    let bias = bias.context("--bias is required with --weights")?;
                    let config = NetworkConfig {
                        activation,
                        bias,
                        ..NetworkConfig::default()
                    };
                    let mut network = Network::new(config, OptimisationParameters::default());
                    network
                        .load_weights(&path)
                        .with_context(|| format!("reading weights {}", path.display()))?;
                    network
                }
                (None, None) => anyhow::bail!("either --weights or --snapshot is required"),
            };
            let outputs = network.forward(&input)?;
            println!("{:?}", outputs);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_bias_required_with_weights() {
        let missing = Cli::try_parse_from(["mlp", "predict", "--input", "0.1,0.9", "--weights", "w.dat"]);
        assert!(missing.is_err());
        let cli = match Cli::try_parse_from([
            "mlp", "predict", "--input", "0.1,0.9", "--weights", "w.dat", "--bias", "0.5",
        ]) {
            Ok(cli) => cli,
            Err(e) => panic!("{}", e),
        };
        match cli.command {
            Commands::Predict { bias, .. } => assert_eq!(bias, Some(0.5)),
            Commands::Train { .. } => panic!("expected predict"),
        }
        let snapshot = Cli::try_parse_from(["mlp", "predict", "--input", "0.1", "--snapshot", "n.json"]);
        assert!(snapshot.is_ok());
    }
}
