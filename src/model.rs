use burn::{
    prelude::*,
    tensor::{activation::relu, backend::AutodiffBackend},
};
use nn::{Linear, LinearConfig};

use crate::algo::dqn::DQNModel;

/// Two-layer perceptron estimating one Q value per relative action
#[derive(Module, Debug)]
pub struct QNet<B: Backend> {
    fc1: Linear<B>,
    fc2: Linear<B>,
}

#[derive(Config, Debug)]
pub struct QNetConfig {
    #[config(default = 11)]
    pub input_size: usize,
    #[config(default = 256)]
    pub hidden_size: usize,
    #[config(default = 3)]
    pub output_size: usize,
}

impl QNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> QNet<B> {
        QNet {
            fc1: LinearConfig::new(self.input_size, self.hidden_size).init(device),
            fc2: LinearConfig::new(self.hidden_size, self.output_size).init(device),
        }
    }
}

impl<B: Backend> QNet<B> {
    /// Width of the hidden layer
    pub fn hidden_size(&self) -> usize {
        self.fc1.weight.dims()[1]
    }

    /// In shape: `[num_batches, input_size]`
    ///
    /// Out shape: `[num_batches, output_size]`
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.fc1.forward(input));
        self.fc2.forward(x)
    }
}

impl<B: AutodiffBackend> DQNModel<B> for QNet<B> {
    fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        QNet::forward(self, input)
    }
}
