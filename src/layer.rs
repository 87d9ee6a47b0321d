use crate::linalg::matrix::Matrix;

/// Neurons at one depth of the network.
///
/// Every layer except the output one carries a trailing bias slot in
/// `neurons`, so `neurons.len() == size + 1` there. The input layer has no
/// error terms.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub size: usize,
    pub neurons: Vec<f32>,
    pub errors: Vec<f32>,
}

impl Layer {
    pub fn new(size: usize, bias: Option<f32>, with_errors: bool) -> Self {
        let mut neurons = vec![0.0; size];
        if let Some(bias) = bias {
            neurons.push(bias);
        }
        let errors = if with_errors { vec![0.0; size] } else { Vec::new() };
        Layer {
            size,
            neurons,
            errors,
        }
    }

    /// Neuron values without the bias slot.
    pub fn outputs(&self) -> &[f32] {
        &self.neurons[..self.size]
    }

    pub fn has_bias(&self) -> bool {
        self.neurons.len() == self.size + 1
    }
}

/// Weights between a source layer and the next one. Row `source.size` is the bias row.
#[derive(Clone, Debug, PartialEq)]
pub struct Synapse {
    pub weights: Matrix,
}

impl Synapse {
    pub fn new(source_size: usize, target_size: usize) -> Self {
        Synapse {
            weights: Matrix::zeros(source_size + 1, target_size),
        }
    }

    pub fn bias_row(&self) -> usize {
        self.weights.rows - 1
    }

    pub fn bias_weights(&self) -> &[f32] {
        self.weights.row(self.bias_row())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_layer() {
        let input = Layer::new(3, Some(0.5), false);
        assert_eq!(input.neurons, vec![0.0, 0.0, 0.0, 0.5]);
        assert!(input.errors.is_empty());
        assert!(input.has_bias());
        assert_eq!(input.outputs().len(), 3);
        let output = Layer::new(2, None, true);
        assert_eq!(output.neurons.len(), 2);
        assert_eq!(output.errors.len(), 2);
        assert!(!output.has_bias());
    }

    #[test]
    fn test_synapse() {
        let synapse = Synapse::new(3, 4);
        assert_eq!(synapse.weights.shape(), (4, 4));
        assert_eq!(synapse.bias_row(), 3);
        assert_eq!(synapse.bias_weights(), &[0.0; 4]);
    }
}
