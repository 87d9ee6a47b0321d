use crate::network::Network;
use std::fmt;

/// Read-only, human-readable dump of a network and a loss value.
pub struct Report<'a> {
    network: &'a Network,
    loss: f32,
}

impl Network {
    pub fn report(&self) -> Report<'_> {
        self.report_with_loss(self.loss)
    }

    pub fn report_with_loss(&self, loss: f32) -> Report<'_> {
        Report {
            network: self,
            loss,
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let network = self.network;
        writeln!(
            f,
            "Network: activation={}; bias={}; learning_rate={}; loss_limit={}; state={}",
            network.activation,
            network.bias,
            network.parameters.learning_rate,
            network.parameters.loss_limit,
            network.state
        )?;
        if !network.is_initialized() {
            return write!(f, "Layer sizes:\t[] (not initialised)");
        }
        writeln!(f, "Layer sizes:\t{:?}", network.layer_sizes)?;
        let index = network.layers.len() - 1;
        for (i, layer) in network.layers.iter().enumerate() {
            let title = match i {
                0 => "Input layer",
                i if i == index => "Output layer",
                _ => "Hidden layer",
            };
            writeln!(f, "{} {} size: {}", i, title, layer.size)?;
            writeln!(f, "Neurons:\t{:?}", layer.neurons)?;
            writeln!(f, "Errors:\t\t{:?}", layer.errors)?;
        }
        writeln!(f, "Weights:")?;
        for (i, synapse) in network.synapses.iter().enumerate() {
            let (rows, cols) = synapse.weights.shape();
            writeln!(f, "{} -> {} ({}x{}):", i, i + 1, rows, cols)?;
            for row in 0..rows {
                writeln!(f, "\t{:?}", synapse.weights.row(row))?;
            }
        }
        write!(f, "Total loss:\t{}", self.loss)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.report())
    }
}

#[cfg(test)]
mod tests {
    use crate::activations::Activation;
    use crate::network::{Network, NetworkConfig};
    use crate::optimisers::OptimisationParameters;
    use std::error::Error;

    #[test]
    fn test_report() -> Result<(), Box<dyn Error>> {
        let config = NetworkConfig {
            hidden: vec![3],
            activation: Activation::Tanh,
            bias: 0.0,
            seed: Some(9),
        };
        let mut network = Network::new(config, OptimisationParameters::default());
        let empty = network.to_string();
        assert!(empty.contains("not initialised"));
        network.initialize(&[0.5, -0.5], &[0.25])?;
        let report = network.report_with_loss(0.125).to_string();
        println!("{}", report);
        assert!(report.contains("activation=Tanh"));
        assert!(report.contains("Layer sizes:\t[2, 3, 1]"));
        assert!(report.contains("0 Input layer size: 2"));
        assert!(report.contains("1 Hidden layer size: 3"));
        assert!(report.contains("2 Output layer size: 1"));
        assert!(report.contains("Neurons:\t[0.5, -0.5, 0.0]"));
        assert!(report.contains("0 -> 1 (3x3):"));
        assert!(report.contains("1 -> 2 (4x1):"));
        assert!(report.ends_with("Total loss:\t0.125"));
        assert!(network.report().to_string().ends_with("Total loss:\tNaN"));
        Ok(())
    }
}
