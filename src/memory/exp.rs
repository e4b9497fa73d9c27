use crate::env::Environment;

/// Represents a single experience or transition in the environment
pub struct Exp<E: Environment> {
    /// The state of the environment before taking the action
    pub state: E::State,
    /// The action taken in the given state
    pub action: E::Action,
    /// The reward received after taking the action
    pub reward: f32,
    /// The state of the environment after the action is taken
    pub next_state: E::State,
    /// Whether the action ended the episode
    pub done: bool,
}

impl<E: Environment> Clone for Exp<E> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            action: self.action.clone(),
            reward: self.reward,
            next_state: self.next_state.clone(),
            done: self.done,
        }
    }
}

impl<E> std::fmt::Debug for Exp<E>
where
    E: Environment,
    E::State: std::fmt::Debug,
    E::Action: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exp")
            .field("state", &self.state)
            .field("action", &self.action)
            .field("reward", &self.reward)
            .field("next_state", &self.next_state)
            .field("done", &self.done)
            .finish()
    }
}

/// A zipped batch of [experiences](Exp)
pub struct ExpBatch<E: Environment> {
    /// The state of the environment before taking the action
    pub states: Vec<E::State>,
    /// The action taken in the given state
    pub actions: Vec<E::Action>,
    /// The reward received after taking the action
    pub rewards: Vec<f32>,
    /// The state of the environment after the action is taken
    pub next_states: Vec<E::State>,
    /// Whether the action ended the episode
    pub dones: Vec<bool>,
}

impl<E: Environment> ExpBatch<E> {
    /// Construct an `ExpBatch` from an iterator of [experience](Exp) references and a specified batch size
    pub fn from_iter<'a>(iter: impl IntoIterator<Item = &'a Exp<E>>, batch_size: usize) -> Self
    where
        E: 'a,
    {
        let batch = Self {
            states: Vec::with_capacity(batch_size),
            actions: Vec::with_capacity(batch_size),
            rewards: Vec::with_capacity(batch_size),
            next_states: Vec::with_capacity(batch_size),
            dones: Vec::with_capacity(batch_size),
        };

        iter.into_iter().fold(batch, |mut b, e| {
            b.states.push(e.state.clone());
            b.actions.push(e.action.clone());
            b.rewards.push(e.reward);
            b.next_states.push(e.next_state.clone());
            b.dones.push(e.done);
            b
        })
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::tests::MockEnv;

    #[test]
    fn exp_batch_from_iter() {
        let experiences = [
            Exp::<MockEnv> {
                state: 0,
                action: 1,
                reward: 1.0,
                next_state: 1,
                done: false,
            },
            Exp::<MockEnv> {
                state: 1,
                action: 2,
                reward: -10.0,
                next_state: 2,
                done: true,
            },
        ];
        let batch = ExpBatch::from_iter(&experiences, 2);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.states, [0, 1], "States constructed correctly");
        assert_eq!(batch.actions, [1, 2], "Actions constructed correctly");
        assert_eq!(batch.rewards, [1.0, -10.0], "Rewards constructed correctly");
        assert_eq!(batch.next_states, [1, 2], "Next states constructed correctly");
        assert_eq!(batch.dones, [false, true], "Terminal flags constructed correctly");
    }
}
