use rand::{rngs::StdRng, Rng};

use super::{
    encoder::{self, State},
    types::{Action, Board, Direction, Position},
};
use crate::{
    config::GameConfig,
    env::{Environment, Outcome},
    error::GameError,
};

/// The game of snake on a pixel play-field divided into square blocks
///
/// The engine owns the authoritative game state. It is only mutated through
/// [`SnakeGame::reset`] and [`SnakeGame::step`].
#[derive(Debug, Clone)]
pub struct SnakeGame {
    config: GameConfig,
    snake: Vec<Position>,
    direction: Direction,
    food: Position,
    score: u32,
    steps_since_food: u32,
    terminal: bool,
    rng: StdRng,
}

impl SnakeGame {
    /// Create a game and reset it to its initial state
    pub fn new(config: GameConfig, rng: StdRng) -> Result<Self, GameError> {
        let mut game = Self {
            config,
            snake: Vec::new(),
            direction: Direction::Right,
            food: Position::new(0, 0),
            score: 0,
            steps_since_food: 0,
            terminal: false,
            rng,
        };
        game.reset()?;
        Ok(game)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn steps_since_food(&self) -> u32 {
        self.steps_since_food
    }

    pub fn len(&self) -> usize {
        self.snake.len()
    }

    /// Reinitialize the snake at the center of the field heading right, with score 0 and fresh food
    pub fn reset(&mut self) -> Result<(), GameError> {
        let block = self.config.block_size;
        let head = Position::new(
            self.config.width / 2 / block * block,
            self.config.height / 2 / block * block,
        );

        self.direction = Direction::Right;
        self.snake = (0..self.config.initial_length as i32)
            .map(|i| head.moved(Direction::Left, i * block))
            .collect();
        self.score = 0;
        self.steps_since_food = 0;
        self.terminal = false;
        self.place_food()
    }

    /// Move the food to a uniformly random free cell
    pub fn place_food(&mut self) -> Result<(), GameError> {
        let block = self.config.block_size;
        let cols = self.config.width / block;
        let rows = self.config.height / block;
        if self.snake.len() >= (cols * rows) as usize {
            return Err(GameError::BoardFull);
        }

        self.food = loop {
            let candidate = Position::new(
                self.rng.gen_range(0..cols) * block,
                self.rng.gen_range(0..rows) * block,
            );
            if !self.snake.contains(&candidate) {
                break candidate;
            }
        };
        Ok(())
    }

    /// Advance the game by one move
    ///
    /// A step on a game that has already ended changes nothing and reports terminal again.
    pub fn step(&mut self, action: Action) -> Result<Outcome, GameError> {
        if self.terminal {
            return Ok(self.outcome(0.0));
        }

        // the stall cap is measured against the length before this move
        let stalled =
            self.steps_since_food > self.config.stall_factor * self.snake.len() as u32;

        self.direction = self.direction.turn(action);
        let head = self.head().moved(self.direction, self.config.block_size);
        self.snake.insert(0, head);

        if self.is_collision(head) || stalled {
            self.terminal = true;
            return Ok(self.outcome(self.config.death_penalty));
        }

        if head == self.food {
            self.score += 1;
            self.steps_since_food = 0;
            self.place_food()?;
            Ok(self.outcome(self.config.food_reward))
        } else {
            self.snake.pop();
            self.steps_since_food += 1;
            // food under the body means the state was corrupted
            if self.body()[1..].contains(&self.food) {
                return Err(GameError::FoodOnSnake(self.food));
            }
            Ok(self.outcome(0.0))
        }
    }

    fn outcome(&self, reward: f32) -> Outcome {
        Outcome {
            reward,
            terminal: self.terminal,
            score: self.score,
        }
    }
}

impl Board for SnakeGame {
    fn head(&self) -> Position {
        self.snake[0]
    }

    fn body(&self) -> &[Position] {
        &self.snake
    }

    fn food(&self) -> Position {
        self.food
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn bounds(&self) -> (i32, i32) {
        (self.config.width, self.config.height)
    }

    fn block_size(&self) -> i32 {
        self.config.block_size
    }

    fn score(&self) -> u32 {
        self.score
    }
}

impl Environment for SnakeGame {
    type State = State;
    type Action = Action;

    fn observe(&self) -> Self::State {
        encoder::encode(self)
    }

    fn step(&mut self, action: Self::Action) -> Result<Outcome, GameError> {
        SnakeGame::step(self, action)
    }

    fn reset(&mut self) -> Result<(), GameError> {
        SnakeGame::reset(self)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use strum::IntoEnumIterator;

    use super::*;

    const BLOCK: i32 = 20;

    fn game() -> SnakeGame {
        SnakeGame::new(GameConfig::default(), StdRng::seed_from_u64(42)).unwrap()
    }

    /// A game with a hand-placed snake and food
    fn game_with(snake: Vec<Position>, direction: Direction, food: Position) -> SnakeGame {
        let mut game = game();
        game.snake = snake;
        game.direction = direction;
        game.food = food;
        game
    }

    #[test]
    fn reset_initial_state() {
        let mut game = game();
        game.score = 10;
        game.terminal = true;
        game.reset().unwrap();

        assert_eq!(game.score(), 0);
        assert_eq!(game.len(), 3);
        assert_eq!(game.direction(), Direction::Right);
        assert!(!game.is_terminal());
        assert_eq!(
            game.body(),
            [Position::new(320, 240), Position::new(300, 240), Position::new(280, 240)],
            "centered, heading right"
        );
        assert!(!game.is_collision(game.head()), "head is never a collision after reset");
    }

    #[test]
    fn snake_is_grid_aligned() {
        let config = GameConfig {
            width: 200,
            height: 140,
            ..GameConfig::default()
        };
        let game = SnakeGame::new(config, StdRng::seed_from_u64(0)).unwrap();
        for segment in game.body() {
            assert_eq!(segment.x % BLOCK, 0, "x aligned");
            assert_eq!(segment.y % BLOCK, 0, "y aligned");
        }
        assert_eq!(game.head(), Position::new(100, 60));
    }

    #[test]
    fn wall_and_body_collisions() {
        let game = game();
        assert!(game.is_collision(Position::new(-1, 10)), "left wall");
        assert!(game.is_collision(Position::new(640, 10)), "right wall");
        assert!(game.is_collision(Position::new(10, 480)), "bottom wall");
        assert!(game.is_collision(Position::new(10, -20)), "top wall");
        assert!(game.is_collision(Position::new(300, 240)), "body segment");
        assert!(!game.is_collision(game.head()), "head excluded");
        assert!(!game.is_collision(Position::new(0, 0)), "free cell");
    }

    #[test]
    fn food_never_on_snake() {
        let mut game = game();
        for _ in 0..200 {
            game.place_food().unwrap();
            assert!(!game.body().contains(&game.food()), "food off the snake");
            assert!(game.food().x >= 0 && game.food().x < 640);
            assert!(game.food().y >= 0 && game.food().y < 480);
            assert_eq!(game.food().x % BLOCK, 0);
            assert_eq!(game.food().y % BLOCK, 0);
        }
    }

    #[test]
    fn food_placement_on_full_board_fails() {
        let config = GameConfig {
            width: 80,
            height: 20,
            ..GameConfig::default()
        };
        let mut game = SnakeGame::new(config, StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(game.food(), Position::new(60, 0), "only free cell");

        game.snake.insert(0, Position::new(60, 0));
        assert!(matches!(game.place_food(), Err(GameError::BoardFull)));
    }

    #[test]
    fn straight_move_far_from_food() {
        let snake = vec![
            Position::new(100, 100),
            Position::new(80, 100),
            Position::new(60, 100),
        ];
        let mut game = game_with(snake, Direction::Right, Position::new(600, 400));

        let outcome = game.step(Action::Straight).unwrap();
        assert_eq!(outcome.reward, 0.0);
        assert!(!outcome.terminal);
        assert_eq!(outcome.score, 0);
        assert_eq!(game.head(), Position::new(120, 100), "moved one block right");
        assert_eq!(game.len(), 3, "length unchanged");
        assert_eq!(game.steps_since_food(), 1);
        assert!(!game.is_collision(game.head()));
    }

    #[test]
    fn eating_food_grows_snake() {
        let snake = vec![
            Position::new(100, 100),
            Position::new(80, 100),
            Position::new(60, 100),
        ];
        let mut game = game_with(snake, Direction::Right, Position::new(100, 120));
        game.steps_since_food = 17;

        let outcome = game.step(Action::Right).unwrap();
        assert_eq!(outcome.reward, 10.0);
        assert!(!outcome.terminal);
        assert_eq!(outcome.score, 1);
        assert_eq!(game.len(), 4, "grew by one");
        assert_eq!(game.head(), Position::new(100, 120));
        assert_eq!(game.direction(), Direction::Down);
        assert_eq!(game.steps_since_food(), 0, "stall counter reset");
        assert!(!game.body().contains(&game.food()), "new food placed off the snake");
    }

    #[test]
    fn wall_collision_is_terminal() {
        let snake = vec![
            Position::new(620, 100),
            Position::new(600, 100),
            Position::new(580, 100),
        ];
        let mut game = game_with(snake, Direction::Right, Position::new(0, 0));

        let outcome = game.step(Action::Straight).unwrap();
        assert!(outcome.terminal);
        assert_eq!(outcome.reward, -10.0);
        assert_eq!(game.head(), Position::new(640, 100), "frozen with the fatal head");

        let again = game.step(Action::Straight).unwrap();
        assert!(again.terminal, "stays terminal");
        assert_eq!(again.reward, 0.0);
        assert_eq!(game.head(), Position::new(640, 100), "no further mutation");
    }

    #[test]
    fn top_wall_collision_is_terminal() {
        let snake = vec![
            Position::new(100, 0),
            Position::new(80, 0),
            Position::new(60, 0),
        ];
        let mut game = game_with(snake, Direction::Right, Position::new(300, 300));

        let outcome = game.step(Action::Left).unwrap();
        assert!(outcome.terminal, "turned up into y = -20");
        assert_eq!(outcome.reward, -10.0);
    }

    #[test]
    fn self_collision_is_terminal() {
        // heading up with a body segment directly to the right of the head
        let snake = vec![
            Position::new(100, 100),
            Position::new(100, 120),
            Position::new(120, 120),
            Position::new(120, 100),
            Position::new(120, 80),
        ];
        let mut game = game_with(snake, Direction::Up, Position::new(500, 400));

        let outcome = game.step(Action::Right).unwrap();
        assert!(outcome.terminal);
        assert_eq!(outcome.reward, -10.0);
        assert_eq!(outcome.score, 0);
    }

    #[test]
    fn food_under_the_body_is_an_error() {
        let snake = vec![
            Position::new(100, 100),
            Position::new(80, 100),
            Position::new(60, 100),
            Position::new(40, 100),
        ];
        let mut game = game_with(snake, Direction::Right, Position::new(60, 100));

        let result = game.step(Action::Straight);
        assert!(
            matches!(result, Err(GameError::FoodOnSnake(food)) if food == Position::new(60, 100)),
            "got {result:?}"
        );
    }

    #[test]
    fn stalling_ends_the_game() {
        let mut game = game();
        game.food = Position::new(0, 0);
        game.steps_since_food = 100 * game.len() as u32 + 1;

        let outcome = game.step(Action::Straight).unwrap();
        assert!(outcome.terminal, "cap uses the length before the move");
        assert_eq!(outcome.reward, -10.0);
    }

    #[test]
    fn stall_cap_is_inclusive() {
        let mut game = game();
        game.food = Position::new(0, 0);
        game.steps_since_food = 100 * game.len() as u32;

        let outcome = game.step(Action::Straight).unwrap();
        assert!(!outcome.terminal, "only exceeding the cap ends the game");
    }

    #[test]
    fn non_terminal_steps_never_collide() {
        let mut game = game();
        let mut rng = StdRng::seed_from_u64(9);
        let actions = Action::iter().collect::<Vec<_>>();
        for _ in 0..2000 {
            let action = actions[rng.gen_range(0..actions.len())];
            let outcome = game.step(action).unwrap();
            if outcome.terminal {
                game.reset().unwrap();
            } else {
                assert!(!game.is_collision(game.head()));
                assert!(!game.body().contains(&game.food()));
            }
        }
    }
}
