use crate::network::{Network, NetworkError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{info, trace};

/// Training stops once the loss reaches this value, whatever the configured limit.
pub const LOSS_FLOOR: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingState {
    Uninitialized,
    Initialized,
    Training,
    Converged,
    Exhausted,
}

impl fmt::Display for TrainingState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TrainingState::Uninitialized => "Uninitialized",
            TrainingState::Initialized => "Initialized",
            TrainingState::Training => "Training",
            TrainingState::Converged => "Converged",
            TrainingState::Exhausted => "Exhausted",
        };
        write!(f, "{}", name)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum TrainingError {
    #[error("Iteration error during training: {0}")]
    IterationError(String),
    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// Iterations run and the loss they ended on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSummary {
    pub iterations: usize,
    pub loss: f32,
}

impl fmt::Display for TrainingSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "iterations: {}; loss: {}", self.iterations, self.loss)
    }
}

impl Network {
    /// Trains on a single example until the loss reaches the limit or the
    /// iteration cap is hit. The first call builds the network from the
    /// example's dimensions; later calls must match them.
    ///
    /// Hitting the cap is not an error: check `state` (or compare the returned
    /// loss with the limit) to tell convergence from exhaustion.
    pub fn train(&mut self, input: &[f32], target: &[f32]) -> Result<TrainingSummary, TrainingError> {
        let max_iterations = self.parameters.max_iterations;
        if max_iterations == 0 {
            return Err(TrainingError::IterationError(
                "Number of iterations must be greater than zero.".to_string(),
            ));
        }
        if self.is_initialized() {
            self.set_input(input)?;
            self.set_target(target)?;
        } else {
            self.initialize(input, target)?;
        }
        let loss_limit = self.parameters.loss_limit;
        self.state = TrainingState::Training;
        let mut iteration: usize = 1;
        loop {
            self.forwardpass();
            let loss = self.output_error();
            trace!(iteration, loss, "training iteration");
            if loss <= loss_limit || loss <= LOSS_FLOOR {
                self.state = TrainingState::Converged;
                info!(iterations = iteration, loss, "training converged");
                break;
            }
            if iteration >= max_iterations {
                self.state = TrainingState::Exhausted;
                info!(
                    iterations = iteration,
                    loss,
                    loss_limit,
                    "iteration cap reached before the loss limit"
                );
                break;
            }
            self.backpropagation();
            self.optimise();
            iteration += 1;
        }
        Ok(TrainingSummary {
            iterations: iteration,
            loss: self.loss,
        })
    }
}
