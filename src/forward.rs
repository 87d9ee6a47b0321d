use crate::network::{Network, NetworkError};

impl Network {
    /// Activates every layer from the first hidden one to the output, in order.
    pub(crate) fn forwardpass(&mut self) {
        let activation = self.activation;
        for i in 1..self.layers.len() {
            let (previous, next) = self.layers.split_at_mut(i);
            let source = &previous[i - 1];
            let target = &mut next[0];
            let size = target.size;
            let sums = &mut target.neurons[..size];
            self.synapses[i - 1].weights.vecmul(&source.neurons, sums);
            for x in sums.iter_mut() {
                *x = activation.activate(*x);
            }
        }
    }

    /// Inference only: loads `input`, runs the forward pass and returns the output layer.
    pub fn forward(&mut self, input: &[f32]) -> Result<Vec<f32>, NetworkError> {
        self.set_input(input)?;
        self.forwardpass();
        Ok(self.outputs().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use crate::activations::Activation;
    use crate::network::{Network, NetworkConfig, NetworkError};
    use crate::optimisers::OptimisationParameters;
    use std::error::Error;

    #[test]
    fn test_forward() -> Result<(), Box<dyn Error>> {
        let config = NetworkConfig {
            hidden: vec![2],
            activation: Activation::LeakyReLU,
            bias: 1.0,
            seed: Some(1),
        };
        let mut network = Network::new(config, OptimisationParameters::default());
        network.initialize(&[1.0, 2.0], &[0.0])?;
        // rows: input 0, input 1, bias
        network.synapses[0].weights.data = vec![0.1, -0.2, 0.3, 0.1, 0.0, -0.5];
        network.synapses[1].weights.data = vec![0.5, 2.0, 0.25];
        let outputs = network.forward(&[1.0, 2.0])?;
        // hidden: [0.1 + 0.6 + 0.0, -0.2 + 0.2 - 0.5] = [0.7, -0.5] -> [0.7, -0.005]
        assert!((network.layers[1].neurons[0] - 0.7).abs() < 1e-6);
        assert!((network.layers[1].neurons[1] + 0.005).abs() < 1e-6);
        assert_eq!(network.layers[1].neurons[2], 1.0);
        // output: 0.35 - 0.01 + 0.25 = 0.59
        assert_eq!(outputs.len(), 1);
        assert!((outputs[0] - 0.59).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_forward_deterministic() -> Result<(), Box<dyn Error>> {
        let config = NetworkConfig {
            hidden: vec![5, 4],
            activation: Activation::Sigmoid,
            bias: 0.5,
            seed: None,
        };
        let mut network = Network::new(config, OptimisationParameters::default());
        network.initialize(&[1.2, 6.3], &[6.3, 3.2])?;
        let first = network.forward(&[1.2, 6.3])?;
        let second = network.forward(&[1.2, 6.3])?;
        assert_eq!(first, second);
        assert!(first.iter().all(|&y| y > 0.0 && y < 1.0));
        let other = network.forward(&[-3.0, 0.5])?;
        assert_ne!(first, other);
        assert_eq!(network.forward(&[1.2, 6.3])?, first);
        Ok(())
    }

    #[test]
    fn test_forward_uninitialized() {
        let mut network = Network::new(NetworkConfig::default(), OptimisationParameters::default());
        assert_eq!(network.forward(&[1.0]), Err(NetworkError::NotInitialized));
    }
}
