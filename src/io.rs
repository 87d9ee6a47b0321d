use crate::activations::{Activation, ActivationError};
use crate::linalg::matrix::{Matrix, MatrixError};
use crate::network::{Network, NetworkConfig, NetworkError};
use crate::optimisers::OptimisationParameters;
use crate::train::TrainingState;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Persistence I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Persistence JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Corrupt weights: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    #[error(transparent)]
    Activation(#[from] ActivationError),
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, PersistenceError> {
    let mut buffer = [0u8; 4];
    reader.read_exact(&mut buffer)?;
    Ok(u32::from_le_bytes(buffer))
}

fn read_f32<R: Read>(reader: &mut R) -> Result<f32, PersistenceError> {
    let mut buffer = [0u8; 4];
    reader.read_exact(&mut buffer)?;
    Ok(f32::from_le_bytes(buffer))
}

fn to_u32(value: usize, what: &str) -> Result<u32, PersistenceError> {
    u32::try_from(value).map_err(|_| PersistenceError::Corrupt(format!("{} too large: {}", what, value)))
}

/// Layer sizes implied by a chain of weight blocks, each `(source + 1) x destination`.
fn layer_sizes_of(blocks: &[Matrix]) -> Result<Vec<usize>, PersistenceError> {
    let last = match blocks.last() {
        Some(block) => block.cols,
        None => return Err(PersistenceError::Corrupt("no weight blocks".to_string())),
    };
    for (i, pair) in blocks.windows(2).enumerate() {
        if pair[1].rows != pair[0].cols + 1 {
            return Err(PersistenceError::Corrupt(format!(
                "block {} is {}x{} but block {} has {} rows",
                i,
                pair[0].rows,
                pair[0].cols,
                i + 1,
                pair[1].rows
            )));
        }
    }
    let mut layer_sizes: Vec<usize> = blocks.iter().map(|block| block.rows - 1).collect();
    layer_sizes.push(last);
    Ok(layer_sizes)
}

/// Weights blob layout, all little-endian:
/// `u32` block count, then per block `u32` rows, `u32` cols and `rows * cols`
/// `f32` values in row-major order. Blocks go from the input side to the output.
impl Network {
    pub fn write_weights<W: Write>(&self, writer: &mut W) -> Result<(), PersistenceError> {
        if !self.is_initialized() {
            return Err(PersistenceError::Network(NetworkError::NotInitialized));
        }
        writer.write_all(&to_u32(self.synapses.len(), "block count")?.to_le_bytes())?;
        for synapse in &self.synapses {
            let (rows, cols) = synapse.weights.shape();
            writer.write_all(&to_u32(rows, "row count")?.to_le_bytes())?;
            writer.write_all(&to_u32(cols, "column count")?.to_le_bytes())?;
            for weight in &synapse.weights.data {
                writer.write_all(&weight.to_le_bytes())?;
            }
        }
        Ok(())
    }

    /// Reads a weights blob. An initialised network must have the same shapes;
    /// an uninitialised one takes its topology from the blob.
    pub fn read_weights<R: Read>(&mut self, reader: &mut R) -> Result<(), PersistenceError> {
        let n_blocks = read_u32(reader)? as usize;
        if n_blocks == 0 {
            return Err(PersistenceError::Corrupt("no weight blocks".to_string()));
        }
        let mut blocks: Vec<Matrix> = Vec::new();
        for i in 0..n_blocks {
            let rows = read_u32(reader)? as usize;
            let cols = read_u32(reader)? as usize;
            if rows < 2 || cols < 1 {
                return Err(PersistenceError::Corrupt(format!(
                    "block {} has invalid shape {}x{}",
                    i, rows, cols
                )));
            }
            let n = rows.checked_mul(cols).ok_or_else(|| {
                PersistenceError::Corrupt(format!("block {} shape overflows", i))
            })?;
            let mut data: Vec<f32> = Vec::new();
            for _ in 0..n {
                data.push(read_f32(reader)?);
            }
            blocks.push(Matrix::from_vec(data, rows, cols)?);
        }
        let layer_sizes = layer_sizes_of(&blocks)?;
        if self.is_initialized() {
            if layer_sizes != self.layer_sizes {
                return Err(PersistenceError::Network(NetworkError::DimensionMismatch(
                    format!(
                        "weights describe layers {:?}, network has {:?}",
                        layer_sizes, self.layer_sizes
                    ),
                )));
            }
        } else {
            self.hidden = layer_sizes[1..layer_sizes.len() - 1]
                .iter()
                .map(|&size| size as i64)
                .collect();
            self.allocate(layer_sizes)?;
            self.state = TrainingState::Initialized;
        }
        for (synapse, weights) in self.synapses.iter_mut().zip(blocks) {
            synapse.weights = weights;
        }
        if self.bias == 0.0 {
            let dropped = self
                .synapses
                .iter()
                .any(|synapse| synapse.bias_weights().iter().any(|&w| w != 0.0));
            if dropped {
                warn!("weights carry bias rows but the network bias is 0, bias rows zeroed");
            }
            self.zero_bias_rows();
        }
        debug!(layer_sizes = ?self.layer_sizes, "weights loaded");
        Ok(())
    }

    pub fn save_weights<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistenceError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_weights(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load_weights<P: AsRef<Path>>(&mut self, path: P) -> Result<(), PersistenceError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        self.read_weights(&mut reader)
    }
}

/// Layer sizes must agree with the stored weight blocks and with the positive
/// hidden widths before anything is allocated from them.
fn check_snapshot_shapes(
    layer_sizes: &[usize],
    weights_per_layer: &[Vec<f32>],
    hidden: &[i64],
) -> Result<(), PersistenceError> {
    if layer_sizes.len() < 2 || weights_per_layer.len() + 1 != layer_sizes.len() {
        return Err(PersistenceError::Corrupt(format!(
            "{} weight blocks for {} layers",
            weights_per_layer.len(),
            layer_sizes.len()
        )));
    }
    for (i, weights) in weights_per_layer.iter().enumerate() {
        let expected = layer_sizes[i]
            .checked_add(1)
            .and_then(|rows| rows.checked_mul(layer_sizes[i + 1]));
        if expected != Some(weights.len()) {
            return Err(PersistenceError::Corrupt(format!(
                "block {} holds {} weights, layers {} -> {} need ({} + 1) x {}",
                i,
                weights.len(),
                i,
                i + 1,
                layer_sizes[i],
                layer_sizes[i + 1]
            )));
        }
    }
    let positive: Vec<usize> = hidden
        .iter()
        .filter(|&&width| width > 0)
        .map(|&width| width as usize)
        .collect();
    if positive[..] != layer_sizes[1..layer_sizes.len() - 1] {
        return Err(PersistenceError::Corrupt(format!(
            "hidden widths {:?} disagree with layer sizes {:?}",
            hidden, layer_sizes
        )));
    }
    Ok(())
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SerdifiableNetwork {
    layer_sizes: Vec<usize>, // input width, hidden widths, output width
    hidden: Vec<i64>,        // hidden widths as configured, including skipped entries
    activation: String,
    bias: f32,
    learning_rate: f32,
    loss_limit: f32,
    max_iterations: usize,
    seed: Option<u64>,
    inputs: Vec<f32>,                 // input layer values without the bias slot
    targets: Vec<f32>,                // target vector of the last example
    weights_per_layer: Vec<Vec<f32>>, // row-major ((layer_sizes[i] + 1) x layer_sizes[i + 1])
    loss: Option<f32>,                // last loss, None before any training
    saved_at: String,                 // RFC 3339 UTC timestamp
}

impl Network {
    /// Writes the whole network as pretty JSON. Refuses to overwrite `fname`.
    pub fn save_network<P: AsRef<Path>>(&self, fname: P) -> Result<(), PersistenceError> {
        if !self.is_initialized() {
            return Err(PersistenceError::Network(NetworkError::NotInitialized));
        }
        let serdifiable_network = SerdifiableNetwork {
            layer_sizes: self.layer_sizes.clone(),
            hidden: self.hidden.clone(),
            activation: self.activation.to_string(),
            bias: self.bias,
            learning_rate: self.parameters.learning_rate,
            loss_limit: self.parameters.loss_limit,
            max_iterations: self.parameters.max_iterations,
            seed: self.seed,
            inputs: self.layers[0].outputs().to_vec(),
            targets: self.targets.clone(),
            weights_per_layer: self
                .synapses
                .iter()
                .map(|synapse| synapse.weights.data.clone())
                .collect(),
            loss: self.loss.is_finite().then_some(self.loss),
            saved_at: Utc::now().to_rfc3339(),
        };
        let json_data = serde_json::to_string_pretty(&serdifiable_network)?;
        let mut file = File::create_new(fname)?;
        file.write_all(json_data.as_bytes())?;
        Ok(())
    }

    pub fn read_network<P: AsRef<Path>>(fname: P) -> Result<Self, PersistenceError> {
        let file = File::open(fname)?;
        let reader = BufReader::new(file);
        let serdifiable_network: SerdifiableNetwork = serde_json::from_reader(reader)?;
        let activation: Activation = serdifiable_network.activation.parse()?;
        let config = NetworkConfig {
            hidden: serdifiable_network.hidden,
            activation,
            bias: serdifiable_network.bias,
            seed: serdifiable_network.seed,
        };
        let parameters = OptimisationParameters {
            learning_rate: serdifiable_network.learning_rate,
            loss_limit: serdifiable_network.loss_limit,
            max_iterations: serdifiable_network.max_iterations,
        };
        let layer_sizes = serdifiable_network.layer_sizes;
        check_snapshot_shapes(
            &layer_sizes,
            &serdifiable_network.weights_per_layer,
            &config.hidden,
        )?;
        let mut network = Network::new(config, parameters);
        network.allocate(layer_sizes.clone())?;
        for (i, weights) in serdifiable_network.weights_per_layer.into_iter().enumerate() {
            network.synapses[i].weights =
                Matrix::from_vec(weights, layer_sizes[i] + 1, layer_sizes[i + 1])?;
        }
        network.state = TrainingState::Initialized;
        network.set_input(&serdifiable_network.inputs)?;
        network.set_target(&serdifiable_network.targets)?;
        if network.bias == 0.0 {
            network.zero_bias_rows();
        }
        network.loss = serdifiable_network.loss.unwrap_or(f32::NAN);
        Ok(network)
    }
}
