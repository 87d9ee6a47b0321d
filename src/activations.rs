use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    #[default]
    Sigmoid,
    LeakyReLU,
    Tanh,
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Activation::Sigmoid => {
                write!(f, "Sigmoid")
            }
            Activation::LeakyReLU => {
                write!(f, "LeakyReLU")
            }
            Activation::Tanh => {
                write!(f, "Tanh")
            }
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ActivationError {
    #[error("Activation error unknown activation function: {0}")]
    UnimplementedActivation(String),
}

/// Numeric mode tags: 0 Sigmoid, 1 LeakyReLU, 2 Tanh. Any other tag selects Sigmoid.
impl From<u8> for Activation {
    fn from(mode: u8) -> Self {
        match mode {
            1 => Activation::LeakyReLU,
            2 => Activation::Tanh,
            _ => Activation::Sigmoid,
        }
    }
}

impl FromStr for Activation {
    type Err = ActivationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sigmoid" | "0" => Ok(Activation::Sigmoid),
            "leakyrelu" | "leaky-relu" | "leaky_relu" | "1" => Ok(Activation::LeakyReLU),
            "tanh" | "2" => Ok(Activation::Tanh),
            _ => Err(ActivationError::UnimplementedActivation(s.to_string())),
        }
    }
}

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

pub fn sigmoidderivative(value: f32) -> f32 {
    value * (1.0 - value)
}

/// Leaky identity clamped into [0, 1] with a 0.01 slope outside.
pub fn leakyrelu(x: f32) -> f32 {
    if x < 0.0 {
        0.01 * x
    } else if x > 1.0 {
        1.0 + 0.01 * (x - 1.0)
    } else {
        x
    }
}

pub fn hyperbolictangent(x: f32) -> f32 {
    2.0 / (1.0 + (-2.0 * x).exp()) - 1.0
}

impl Activation {
    pub fn activate(&self, x: f32) -> f32 {
        match self {
            Activation::Sigmoid => sigmoid(x),
            Activation::LeakyReLU => leakyrelu(x),
            Activation::Tanh => hyperbolictangent(x),
        }
    }

    /// Derivative expressed through the activated `value`, not the weighted sum.
    ///
    /// LeakyReLU and Tanh return a constant 1, which is only exact on the
    /// linear part of LeakyReLU. Known inaccuracy, left unchanged until the
    /// intended derivative is settled.
    pub fn derivative(&self, value: f32) -> f32 {
        match self {
            Activation::Sigmoid => sigmoidderivative(value),
            Activation::LeakyReLU | Activation::Tanh => 1.0,
        }
    }
}
