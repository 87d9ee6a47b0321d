use crate::network::Network;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

pub const DEFAULT_LEARNING_RATE: f32 = 0.3;
pub const DEFAULT_LOSS_LIMIT: f32 = 0.001;
pub const MAX_ITERATIONS: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimisationParameters {
    pub learning_rate: f32, // [0, 1]
    pub loss_limit: f32,    // training stops once the mean squared error reaches this
    pub max_iterations: usize, // at most MAX_ITERATIONS
}

impl Default for OptimisationParameters {
    fn default() -> Self {
        OptimisationParameters {
            learning_rate: DEFAULT_LEARNING_RATE,
            loss_limit: DEFAULT_LOSS_LIMIT,
            max_iterations: MAX_ITERATIONS,
        }
    }
}

impl fmt::Display for OptimisationParameters {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "OptimisationParameters {{\n  learning_rate: {},\n  loss_limit: {},\n  max_iterations: {}\n}}",
            self.learning_rate, self.loss_limit, self.max_iterations
        )
    }
}

impl OptimisationParameters {
    pub fn new(learning_rate: f32, loss_limit: f32) -> Self {
        OptimisationParameters {
            learning_rate,
            loss_limit,
            max_iterations: MAX_ITERATIONS,
        }
        .normalised()
    }

    /// Replaces out-of-range values with the defaults.
    pub fn normalised(mut self) -> Self {
        if !(0.0..=1.0).contains(&self.learning_rate) {
            warn!(
                learning_rate = self.learning_rate,
                default = DEFAULT_LEARNING_RATE,
                "learning rate outside [0, 1], using default"
            );
            self.learning_rate = DEFAULT_LEARNING_RATE;
        }
        if !(self.loss_limit >= 0.0) {
            warn!(
                loss_limit = self.loss_limit,
                default = DEFAULT_LOSS_LIMIT,
                "negative loss limit, using default"
            );
            self.loss_limit = DEFAULT_LOSS_LIMIT;
        }
        if self.max_iterations > MAX_ITERATIONS {
            warn!(
                max_iterations = self.max_iterations,
                cap = MAX_ITERATIONS,
                "iteration count above the hard cap, clamped"
            );
            self.max_iterations = MAX_ITERATIONS;
        }
        self
    }
}

impl Network {
    /// Plain gradient descent on every synapse block:
    /// `w[k][j] += rate * error[j] * neuron[k] * f'(next_neuron[j])`.
    pub(crate) fn optimise(&mut self) {
        let activation = self.activation;
        let learning_rate = self.parameters.learning_rate;
        for (i, synapse) in self.synapses.iter_mut().enumerate() {
            let source = &self.layers[i];
            let target = &self.layers[i + 1];
            // The derivative is applied a second time here, on top of the one
            // already folded into the error term. Left unchanged on purpose.
            let deltas: Vec<f32> = target
                .errors
                .iter()
                .zip(target.outputs())
                .map(|(&error, &value)| error * activation.derivative(value))
                .collect();
            synapse
                .weights
                .add_outer(learning_rate, &source.neurons, &deltas);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activations::Activation;
    use crate::network::NetworkConfig;
    use std::error::Error;

    #[test]
    fn test_normalised() {
        let parameters = OptimisationParameters::default();
        assert_eq!(parameters.learning_rate, 0.3);
        assert_eq!(parameters.loss_limit, 0.001);
        assert_eq!(parameters.max_iterations, 1_000_000);
        println!("{}", parameters);
        assert_eq!(OptimisationParameters::new(0.5, 0.01).learning_rate, 0.5);
        assert_eq!(OptimisationParameters::new(1.5, 0.01).learning_rate, 0.3);
        assert_eq!(OptimisationParameters::new(-0.1, 0.01).learning_rate, 0.3);
        assert_eq!(OptimisationParameters::new(0.0, 0.01).learning_rate, 0.0);
        assert_eq!(OptimisationParameters::new(1.0, 0.01).learning_rate, 1.0);
        assert_eq!(OptimisationParameters::new(f32::NAN, 0.01).learning_rate, 0.3);
        assert_eq!(OptimisationParameters::new(1.0, -2.0).loss_limit, 0.001);
        assert_eq!(OptimisationParameters::new(1.0, 0.0).loss_limit, 0.0);
        let parameters = OptimisationParameters {
            max_iterations: 5_000_000,
            ..OptimisationParameters::default()
        };
        assert_eq!(parameters.normalised().max_iterations, MAX_ITERATIONS);
    }

    #[test]
    fn test_optimise() -> Result<(), Box<dyn Error>> {
        let config = NetworkConfig {
            hidden: vec![],
            activation: Activation::LeakyReLU,
            bias: 1.0,
            seed: Some(3),
        };
        let mut network = Network::new(config, OptimisationParameters::new(0.5, 0.001));
        network.initialize(&[2.0], &[0.5])?;
        network.synapses[0].weights.data = vec![0.1, 0.2];
        network.forwardpass();
        // 2.0 * 0.1 + 1.0 * 0.2
        assert!((network.outputs()[0] - 0.4).abs() < 1e-6);
        network.output_error();
        let error = network.layers[1].errors[0];
        assert!((error - 0.1).abs() < 1e-6);
        network.optimise();
        // derivative is 1 for LeakyReLU
        assert!((network.synapses[0].weights.data[0] - (0.1 + 0.5 * error * 2.0)).abs() < 1e-6);
        assert!((network.synapses[0].weights.data[1] - (0.2 + 0.5 * error * 1.0)).abs() < 1e-6);
        Ok(())
    }
}
