//! Multilayer perceptron trained by backpropagation, one example at a time.
//!
//! A [`Network`] is built from an input vector, a target vector and a list of
//! hidden layer widths, then trained with plain gradient descent until the
//! mean squared error reaches a limit or an iteration cap is hit.

pub mod activations;
pub mod backward;
pub mod costs;
pub mod forward;
pub mod io;
pub mod layer;
pub mod linalg;
pub mod network;
pub mod optimisers;
pub mod report;
pub mod train;

pub use activations::Activation;
pub use io::PersistenceError;
pub use network::{Network, NetworkConfig, NetworkError};
pub use optimisers::OptimisationParameters;
pub use train::{TrainingError, TrainingState, TrainingSummary};
