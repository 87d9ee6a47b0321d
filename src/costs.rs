use crate::layer::Layer;
use crate::network::Network;

/// Mean of the squared error terms.
pub fn mean_squared(errors: &[f32]) -> f32 {
    errors.iter().map(|e| e * e).sum::<f32>() / errors.len() as f32
}

impl Network {
    /// Fills the output layer error terms `(target - y) * f'(y)` and returns
    /// their mean squared value, which is also kept in `self.loss`.
    pub(crate) fn output_error(&mut self) -> f32 {
        let activation = self.activation;
        let index = self.layers.len() - 1;
        let Layer {
            neurons, errors, ..
        } = &mut self.layers[index];
        assert_eq!(self.targets.len(), errors.len(), "targets vs output layer");
        for ((error, &value), &target) in errors.iter_mut().zip(neurons.iter()).zip(&self.targets) {
            *error = (target - value) * activation.derivative(value);
        }
        self.loss = mean_squared(errors);
        self.loss
    }
}
