use serde::{Deserialize, Serialize};

/// An ActivationType represents the activation
/// function shared by all non-input layers of a network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivationType {
    // 1 / (1 + exp(-x))
    Sigmoid,
    // max(0, x)
    ReLU,
    // tanh(x)
    Tanh,
}

impl ActivationType {
    /// Applies the activation function to a neuron's input sum.
    ///
    /// # Examples
    /// ```
    /// use neuroevo_nn::ActivationType;
    ///
    /// assert_eq!(ActivationType::Sigmoid.activate(0.0), 0.5);
    /// assert_eq!(ActivationType::ReLU.activate(-3.0), 0.0);
    /// assert_eq!(ActivationType::Tanh.activate(0.5), 0.5f32.tanh());
    /// ```
    #[inline]
    pub fn activate(self, x: f32) -> f32 {
        match self {
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::ReLU => x.max(0.0),
            Self::Tanh => x.tanh(),
        }
    }

    /// Returns the derivative of the activation function,
    /// expressed in terms of its output `y = activate(x)`.
    ///
    /// # Examples
    /// ```
    /// use neuroevo_nn::ActivationType;
    ///
    /// assert_eq!(ActivationType::Sigmoid.derivative(0.5), 0.25);
    /// assert_eq!(ActivationType::ReLU.derivative(0.0), 0.0);
    /// assert_eq!(ActivationType::Tanh.derivative(0.0), 1.0);
    /// ```
    #[inline]
    pub fn derivative(self, y: f32) -> f32 {
        match self {
            Self::Sigmoid => y * (1.0 - y),
            Self::ReLU => {
                if y > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Tanh => 1.0 - y * y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-3;

    fn numeric_derivative(activation: ActivationType, x: f32) -> f32 {
        (activation.activate(x + EPSILON) - activation.activate(x - EPSILON)) / (2.0 * EPSILON)
    }

    #[test]
    fn sigmoid() {
        assert_eq!(ActivationType::Sigmoid.activate(0.0), 0.5);
        assert!(ActivationType::Sigmoid.activate(20.0) > 0.99);
        assert!(ActivationType::Sigmoid.activate(-20.0) < 0.01);
    }

    #[test]
    fn relu() {
        for input in -20..=20 {
            let x = input as f32 / 10.0;
            assert_eq!(ActivationType::ReLU.activate(x), x.max(0.0));
        }
        assert_eq!(ActivationType::ReLU.derivative(2.0), 1.0);
        assert_eq!(ActivationType::ReLU.derivative(0.0), 0.0);
    }

    #[test]
    fn tanh_is_hyperbolic() {
        for input in -20..=20 {
            let x = input as f32 / 10.0;
            let expected = (x.exp() - (-x).exp()) / (x.exp() + (-x).exp());
            assert!((ActivationType::Tanh.activate(x) - expected).abs() < 1e-6);
        }
        // tan(1.5) would be ~14.1
        assert!(ActivationType::Tanh.activate(1.5) < 1.0);
    }

    #[test]
    fn derivatives_match_outputs() {
        for activation in [ActivationType::Sigmoid, ActivationType::Tanh] {
            for input in -20..=20 {
                let x = input as f32 / 10.0;
                let y = activation.activate(x);
                assert!(
                    (activation.derivative(y) - numeric_derivative(activation, x)).abs() < 1e-2,
                    "{:?} at {}",
                    activation,
                    x
                );
            }
        }
    }
}
