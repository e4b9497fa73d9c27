use burn::{
    module::AutodiffModule,
    nn::loss::{MseLoss, Reduction},
    optim::{GradientsParams, Optimizer},
    tensor::{backend::AutodiffBackend, ElementConversion, Float, Int, Tensor},
};
use log::error;

use crate::{
    env::Environment,
    error::TrainingError,
    memory::ExpBatch,
    traits::ToTensor,
};

/// A burn module used with a Deep Q network agent
///
/// ### Generics
/// - `B`: A burn backend
pub trait DQNModel<B: AutodiffBackend>: AutodiffModule<B> {
    /// Forward pass through the model, producing one Q value per action
    fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2>;
}

/// Fits a [`DQNModel`] to one-step Bellman targets by gradient descent
///
/// There is no separate target network: the model being trained also estimates
/// the value of the next state.
///
/// ### Generics
/// - `B`: A burn backend
/// - `M`: The [`DQNModel`] being trained
/// - `O`: An [`Optimizer`]
pub struct QTrainer<B, M, O>
where
    B: AutodiffBackend,
{
    model: M,
    optimizer: O,
    loss: MseLoss<B>,
    gamma: f32,
    lr: f64,
    device: B::Device,
}

impl<B, M, O> QTrainer<B, M, O>
where
    B: AutodiffBackend,
    M: DQNModel<B>,
    O: Optimizer<M, B>,
{
    /// ### Arguments
    /// - `model` The initial model
    /// - `optimizer` The [`Optimizer`] to train the model with
    /// - `gamma` The discount factor
    /// - `lr` The learning rate
    /// - `device` The device the model lives on
    pub fn new(model: M, optimizer: O, gamma: f32, lr: f64, device: B::Device) -> Self {
        Self {
            model,
            optimizer,
            loss: MseLoss::new(),
            gamma,
            lr,
            device,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    /// Estimated Q value of every action in `state`
    pub fn q_values<S>(&self, state: S) -> Vec<f32>
    where
        Vec<S>: ToTensor<B, 2, Float>,
    {
        let input = vec![state].to_tensor(&self.device);
        self.model
            .forward(input)
            .into_data()
            .convert::<f32>()
            .value
    }

    /// Perform one gradient descent step on a batch of experiences
    ///
    /// Every transition's target is `reward` if it ended the episode, or
    /// `reward + gamma * max Q(next_state)` otherwise. The loss is the mean
    /// squared error between these targets and the Q values of the actions taken.
    ///
    /// ### Returns
    /// - `Ok(loss)` once the model has been updated
    /// - `Err(TrainingError::Diverged)` if the loss is not finite, leaving the model untouched
    pub fn learn<E>(&mut self, batch: ExpBatch<E>) -> Result<f32, TrainingError>
    where
        E: Environment,
        Vec<E::State>: ToTensor<B, 2, Float>,
        Vec<E::Action>: ToTensor<B, 2, Int>,
    {
        let continuing = batch
            .dones
            .iter()
            .map(|&done| if done { 0.0 } else { 1.0 })
            .collect::<Vec<f32>>();

        // Tensor conversions
        let states = batch.states.to_tensor(&self.device);
        let actions = batch.actions.to_tensor(&self.device);
        let next_states = batch.next_states.to_tensor(&self.device);
        let rewards: Tensor<B, 2> =
            Tensor::<B, 1>::from_floats(batch.rewards.as_slice(), &self.device).unsqueeze_dim(1);
        let continuing: Tensor<B, 2> =
            Tensor::<B, 1>::from_floats(continuing.as_slice(), &self.device).unsqueeze_dim(1);

        // Calculate the Q values of the chosen actions in each state
        let q_values = self.model.forward(states).gather(1, actions);

        // Bootstrap from the best next action unless the episode ended
        let max_next_q_values = self.model.forward(next_states).max_dim(1).detach();
        let targets = rewards + max_next_q_values.mul(continuing).mul_scalar(self.gamma);

        let loss = self.loss.forward(q_values, targets, Reduction::Mean);
        let loss_value = loss.clone().into_scalar().elem::<f32>();
        if !loss_value.is_finite() {
            error!("Non-finite loss {loss_value}, refusing to update the model");
            return Err(TrainingError::Diverged { loss: loss_value });
        }

        let grads = GradientsParams::from_grads(loss.backward(), &self.model);
        self.model = self.optimizer.step(self.lr, self.model.clone(), grads);

        Ok(loss_value)
    }
}

#[cfg(test)]
mod tests {
    use burn::{
        backend::{Autodiff, NdArray},
        optim::AdamConfig,
    };
    use strum::VariantArray;

    use super::*;
    use crate::{
        game::{Action, SnakeGame, State},
        memory::Exp,
        model::{QNet, QNetConfig},
    };

    type B = Autodiff<NdArray>;

    fn trainer(lr: f64) -> QTrainer<B, QNet<B>, impl Optimizer<QNet<B>, B>> {
        let device = Default::default();
        let model = QNetConfig::new().with_hidden_size(32).init::<B>(&device);
        QTrainer::new(
            model,
            AdamConfig::new().init::<B, QNet<B>>(),
            0.9,
            lr,
            device,
        )
    }

    fn state(i: usize) -> State {
        let mut s = [0.0; 11];
        s[i % 11] = 1.0;
        s
    }

    fn exp(reward: f32, done: bool) -> Exp<SnakeGame> {
        Exp {
            state: state(0),
            action: Action::Right,
            reward,
            next_state: state(1),
            done,
        }
    }

    #[test]
    fn single_transition_moves_towards_target() {
        let mut trainer = trainer(1e-2);
        let before = trainer.q_values(state(0))[Action::Right.index()];

        let batch = [exp(10.0, true)];
        for _ in 0..20 {
            trainer.learn(ExpBatch::from_iter(&batch, 1)).unwrap();
        }

        let after = trainer.q_values(state(0))[Action::Right.index()];
        assert!(
            (10.0 - after).abs() < (10.0 - before).abs(),
            "estimate {after} moved towards terminal reward from {before}"
        );
    }

    #[test]
    fn loss_matches_bellman_targets() {
        let mut trainer = trainer(1e-2);

        // lift the next state's values well away from zero so discounting shows
        let warmup = Action::VARIANTS
            .iter()
            .map(|&action| Exp::<SnakeGame> {
                state: state(3),
                action,
                reward: 5.0,
                next_state: state(3),
                done: true,
            })
            .collect::<Vec<_>>();
        for _ in 0..100 {
            trainer.learn(ExpBatch::from_iter(&warmup, warmup.len())).unwrap();
        }

        let continuing = Exp::<SnakeGame> {
            state: state(2),
            action: Action::Straight,
            reward: 1.0,
            next_state: state(3),
            done: false,
        };
        let terminal = Exp::<SnakeGame> {
            state: state(4),
            action: Action::Left,
            reward: -10.0,
            next_state: state(5),
            done: true,
        };

        let q = |s: State, a: Action| f64::from(trainer.q_values(s)[a.index()]);
        let max_next = trainer
            .q_values(state(3))
            .into_iter()
            .fold(f32::NEG_INFINITY, f32::max) as f64;
        let q_continuing = q(state(2), Action::Straight);
        let q_terminal = q(state(4), Action::Left);
        let mse = |target_c: f64, target_t: f64| {
            ((q_continuing - target_c).powi(2) + (q_terminal - target_t).powi(2)) / 2.0
        };

        let expected = mse(1.0 + 0.9 * max_next, -10.0);
        let tolerance = 1e-4 * expected.max(1.0);
        assert!(max_next > 1.0, "warmup raised Q(s') to {max_next}");
        assert!((mse(1.0 + max_next, -10.0) - expected).abs() > tolerance, "gamma visible");
        assert!((mse(1.0, -10.0) - expected).abs() > tolerance, "bootstrap visible");

        let batch = [continuing, terminal];
        let loss = f64::from(trainer.learn(ExpBatch::from_iter(&batch, 2)).unwrap());
        assert!(
            (loss - expected).abs() < tolerance,
            "loss {loss} vs hand-computed {expected}"
        );
    }

    #[test]
    fn batch_update_reports_finite_loss() {
        let mut trainer = trainer(1e-3);
        let experiences = (0..8)
            .map(|i| Exp::<SnakeGame> {
                state: state(i),
                action: Action::from_repr(i % 3).unwrap(),
                reward: if i % 4 == 0 { -10.0 } else { 0.0 },
                next_state: state(i + 1),
                done: i % 4 == 0,
            })
            .collect::<Vec<_>>();

        let loss = trainer
            .learn(ExpBatch::from_iter(&experiences, experiences.len()))
            .unwrap();
        assert!(loss.is_finite() && loss >= 0.0);
    }

    #[test]
    fn divergent_loss_is_rejected() {
        let mut trainer = trainer(1e-3);
        let before = trainer.q_values(state(0));

        let batch = [exp(f32::NAN, false)];
        let result = trainer.learn(ExpBatch::from_iter(&batch, 1));
        assert!(matches!(result, Err(TrainingError::Diverged { .. })));
        assert_eq!(trainer.q_values(state(0)), before, "model left untouched");
    }
}
