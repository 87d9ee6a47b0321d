use crate::activations::Activation;
use crate::layer::{Layer, Synapse};
use crate::linalg::matrix::MatrixError;
use crate::optimisers::OptimisationParameters;
use crate::train::TrainingState;
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Initial weights are drawn from `[WEIGHT_LOW, WEIGHT_HIGH)`.
pub const WEIGHT_LOW: f32 = -0.5;
pub const WEIGHT_HIGH: f32 = 0.5;

#[derive(Error, Debug, PartialEq)]
pub enum NetworkError {
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),
    #[error("Network dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("Network is not initialised")]
    NotInitialized,
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub hidden: Vec<i64>, // hidden layer widths, non-positive entries are skipped
    pub activation: Activation,
    pub bias: f32, // value of the bias slot, clamped into [0, 1]; 0 disables it
    pub seed: Option<u64>, // None seeds the weight generator from the OS
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            hidden: Vec::new(),
            activation: Activation::Sigmoid,
            bias: 1.0,
            seed: None,
        }
    }
}

impl fmt::Display for NetworkConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "NetworkConfig {{\n  hidden: {:?},\n  activation: {},\n  bias: {},\n  seed: {:?}\n}}",
            self.hidden, self.activation, self.bias, self.seed
        )
    }
}

pub fn clamp_bias(bias: f32) -> f32 {
    let clamped = if bias.is_nan() { 0.0 } else { bias.clamp(0.0, 1.0) };
    if clamped != bias {
        warn!(bias, clamped, "bias outside [0, 1], clamped");
    }
    clamped
}

/// Fully-connected feed-forward network trained one example at a time.
#[derive(Debug, Clone)]
pub struct Network {
    pub layer_sizes: Vec<usize>, // input width, hidden widths, output width
    pub hidden: Vec<i64>,
    pub activation: Activation,
    pub bias: f32,
    pub parameters: OptimisationParameters,
    pub seed: Option<u64>,
    pub targets: Vec<f32>,
    pub layers: Vec<Layer>,
    pub synapses: Vec<Synapse>,
    pub state: TrainingState,
    pub loss: f32, // last computed loss, NaN until the first loss pass
    rng: ChaCha12Rng,
}

fn fill_synapses<R: Rng + ?Sized>(
    synapses: &mut [Synapse],
    bias: f32,
    rng: &mut R,
) -> Result<(), NetworkError> {
    for synapse in synapses.iter_mut() {
        synapse.weights.fill_uniform(rng, WEIGHT_LOW, WEIGHT_HIGH)?;
        if bias == 0.0 {
            let row = synapse.bias_row();
            synapse.weights.fill_row(row, 0.0);
        }
    }
    Ok(())
}

impl Network {
    pub fn new(config: NetworkConfig, parameters: OptimisationParameters) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::from_rng(&mut rand::rng()),
        };
        Network {
            layer_sizes: Vec::new(),
            hidden: config.hidden,
            activation: config.activation,
            bias: clamp_bias(config.bias),
            parameters: parameters.normalised(),
            seed: config.seed,
            targets: Vec::new(),
            layers: Vec::new(),
            synapses: Vec::new(),
            state: TrainingState::Uninitialized,
            loss: f32::NAN,
            rng,
        }
    }

    pub fn config(&self) -> NetworkConfig {
        NetworkConfig {
            hidden: self.hidden.clone(),
            activation: self.activation,
            bias: self.bias,
            seed: self.seed,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state != TrainingState::Uninitialized
    }

    /// Builds the topology from the input width, the positive hidden widths
    /// and the target width, then randomises every weight.
    pub fn initialize(&mut self, input: &[f32], target: &[f32]) -> Result<(), NetworkError> {
        if input.is_empty() {
            return Err(NetworkError::InvalidTopology(
                "input vector is empty".to_string(),
            ));
        }
        if target.is_empty() {
            return Err(NetworkError::InvalidTopology(
                "target vector is empty".to_string(),
            ));
        }
        let mut layer_sizes: Vec<usize> = vec![input.len()];
        layer_sizes.extend(
            self.hidden
                .iter()
                .filter(|&&width| width > 0)
                .map(|&width| width as usize),
        );
        layer_sizes.push(target.len());
        self.allocate(layer_sizes)?;
        self.layers[0].neurons[..input.len()].copy_from_slice(input);
        self.targets.copy_from_slice(target);
        self.fill_weights()?;
        self.state = TrainingState::Initialized;
        Ok(())
    }

    /// Allocates zeroed layers and synapse blocks for `layer_sizes`.
    pub(crate) fn allocate(&mut self, layer_sizes: Vec<usize>) -> Result<(), NetworkError> {
        if layer_sizes.len() < 2 {
            return Err(NetworkError::InvalidTopology(format!(
                "{} layer(s), at least an input and an output layer are required",
                layer_sizes.len()
            )));
        }
        if layer_sizes.contains(&0) {
            return Err(NetworkError::InvalidTopology(format!(
                "empty layer in {:?}",
                layer_sizes
            )));
        }
        let index = layer_sizes.len() - 1;
        self.layers = layer_sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| Layer::new(size, (i < index).then_some(self.bias), i > 0))
            .collect();
        self.synapses = layer_sizes
            .windows(2)
            .map(|pair| Synapse::new(pair[0], pair[1]))
            .collect();
        self.targets = vec![0.0; layer_sizes[index]];
        self.loss = f32::NAN;
        debug!(?layer_sizes, bias = self.bias, activation = %self.activation, "network allocated");
        self.layer_sizes = layer_sizes;
        Ok(())
    }

    /// Refills every weight from the network's own generator.
    pub fn fill_weights(&mut self) -> Result<(), NetworkError> {
        if self.synapses.is_empty() {
            return Err(NetworkError::NotInitialized);
        }
        fill_synapses(&mut self.synapses, self.bias, &mut self.rng)?;
        debug!(blocks = self.synapses.len(), "weights randomised");
        Ok(())
    }

    /// Refills every weight from a caller-supplied generator.
    pub fn fill_weights_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), NetworkError> {
        if self.synapses.is_empty() {
            return Err(NetworkError::NotInitialized);
        }
        fill_synapses(&mut self.synapses, self.bias, rng)
    }

    pub(crate) fn zero_bias_rows(&mut self) {
        for synapse in self.synapses.iter_mut() {
            let row = synapse.bias_row();
            synapse.weights.fill_row(row, 0.0);
        }
    }

    pub fn set_input(&mut self, input: &[f32]) -> Result<(), NetworkError> {
        if !self.is_initialized() {
            return Err(NetworkError::NotInitialized);
        }
        let width = self.layer_sizes[0];
        if input.len() != width {
            return Err(NetworkError::DimensionMismatch(format!(
                "input has {} values, the input layer has {} neurons",
                input.len(),
                width
            )));
        }
        self.layers[0].neurons[..width].copy_from_slice(input);
        Ok(())
    }

    pub fn set_target(&mut self, target: &[f32]) -> Result<(), NetworkError> {
        if !self.is_initialized() {
            return Err(NetworkError::NotInitialized);
        }
        if target.len() != self.targets.len() {
            return Err(NetworkError::DimensionMismatch(format!(
                "target has {} values, the output layer has {} neurons",
                target.len(),
                self.targets.len()
            )));
        }
        self.targets.copy_from_slice(target);
        Ok(())
    }

    /// Output layer activations from the last forward pass.
    pub fn outputs(&self) -> &[f32] {
        match self.layers.last() {
            Some(layer) => layer.outputs(),
            None => &[],
        }
    }
}
