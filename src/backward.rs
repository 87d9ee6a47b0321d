use crate::network::Network;

impl Network {
    /// Propagates the output errors back through the hidden layers, last to first.
    /// The input layer gets no error terms.
    pub(crate) fn backpropagation(&mut self) {
        let activation = self.activation;
        for i in (1..self.layers.len().saturating_sub(1)).rev() {
            let (previous, next) = self.layers.split_at_mut(i + 1);
            let layer = &mut previous[i];
            let following = &next[0];
            let size = layer.size;
            self.synapses[i]
                .weights
                .mulvec(&following.errors, &mut layer.errors[..size]);
            for (error, &value) in layer.errors.iter_mut().zip(&layer.neurons) {
                *error *= activation.derivative(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::activations::Activation;
    use crate::network::{Network, NetworkConfig};
    use crate::optimisers::OptimisationParameters;
    use std::error::Error;

    #[test]
    fn test_backpropagation() -> Result<(), Box<dyn Error>> {
        let config = NetworkConfig {
            hidden: vec![2],
            activation: Activation::Sigmoid,
            bias: 1.0,
            seed: Some(5),
        };
        let mut network = Network::new(config, OptimisationParameters::default());
        network.initialize(&[1.0], &[1.0, 0.0])?;
        network.layers[1].neurons = vec![0.5, 0.2, 1.0];
        network.layers[2].errors = vec![0.4, -0.2];
        // rows: hidden 0, hidden 1, bias
        network.synapses[1].weights.data = vec![1.0, 2.0, 3.0, 4.0, 100.0, 100.0];
        network.backpropagation();
        // hidden 0: (0.4 - 0.4) * 0.25, hidden 1: (1.2 - 0.8) * 0.16
        assert!(network.layers[1].errors[0].abs() < 1e-7);
        assert!((network.layers[1].errors[1] - 0.064).abs() < 1e-6);
        assert!(network.layers[0].errors.is_empty());
        Ok(())
    }

    #[test]
    fn test_backpropagation_without_hidden_layers() -> Result<(), Box<dyn Error>> {
        let mut network = Network::new(NetworkConfig::default(), OptimisationParameters::default());
        network.initialize(&[1.0, 2.0], &[1.0])?;
        let before = network.layers.clone();
        network.backpropagation();
        assert_eq!(network.layers, before);
        Ok(())
    }
}
