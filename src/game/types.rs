use strum::{EnumIter, FromRepr, VariantArray};

use crate::error::GameError;

/// A pixel coordinate on the play-field, aligned to the block grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The position `distance` pixels away in `dir`
    pub fn moved(self, dir: Direction, distance: i32) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx * distance,
            y: self.y + dy * distance,
        }
    }
}

/// Absolute heading of the snake. Screen coordinates, so `Up` decreases `y`.
#[derive(EnumIter, VariantArray, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    /// Headings in clockwise order
    const CLOCKWISE: [Direction; 4] = [Self::Right, Self::Down, Self::Left, Self::Up];

    fn clockwise_ix(self) -> usize {
        self as usize
    }

    pub fn clockwise(self) -> Self {
        Self::CLOCKWISE[(self.clockwise_ix() + 1) % 4]
    }

    pub fn counter_clockwise(self) -> Self {
        Self::CLOCKWISE[(self.clockwise_ix() + 3) % 4]
    }

    pub fn opposite(self) -> Self {
        Self::CLOCKWISE[(self.clockwise_ix() + 2) % 4]
    }

    /// Unit step `(dx, dy)` for this heading
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Up => (0, -1),
        }
    }

    /// Apply a relative turn
    pub fn turn(self, action: Action) -> Self {
        match action {
            Action::Straight => self,
            Action::Right => self.clockwise(),
            Action::Left => self.counter_clockwise(),
        }
    }
}

/// A move relative to the current heading. Reversing is not expressible.
#[derive(FromRepr, EnumIter, VariantArray, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Straight = 0,
    Right = 1,
    Left = 2,
}

/// Number of actions available in every state
pub const NUM_ACTIONS: usize = 3;

impl Action {
    /// Index of this action in the network output
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn one_hot(self) -> [f32; NUM_ACTIONS] {
        let mut encoded = [0.0; NUM_ACTIONS];
        encoded[self.index()] = 1.0;
        encoded
    }

    /// Decode a one-hot vector over `[straight, right, left]`
    pub fn from_one_hot(encoded: &[f32]) -> Result<Self, GameError> {
        let invalid = || GameError::InvalidAction(encoded.to_vec());
        if encoded.len() != NUM_ACTIONS {
            return Err(invalid());
        }

        let mut hot = None;
        for (i, &x) in encoded.iter().enumerate() {
            match x {
                x if x == 1.0 && hot.is_none() => hot = Some(i),
                x if x == 0.0 => {}
                _ => return Err(invalid()),
            }
        }

        hot.and_then(Self::from_repr).ok_or_else(invalid)
    }

    /// The relative action that steers a snake heading `current` towards `desired`
    ///
    /// Reversals are not allowed and map to [`Action::Straight`].
    pub fn towards(current: Direction, desired: Direction) -> Self {
        if desired == current.clockwise() {
            Self::Right
        } else if desired == current.counter_clockwise() {
            Self::Left
        } else {
            Self::Straight
        }
    }
}

/// Read-only view of a game board
///
/// The state encoder and renderers only see the board through this trait, so
/// they cannot break the engine's invariants.
pub trait Board {
    /// Head of the snake
    fn head(&self) -> Position;

    /// Every segment of the snake, head first
    fn body(&self) -> &[Position];

    fn food(&self) -> Position;

    fn direction(&self) -> Direction;

    /// Play-field `(width, height)` in pixels
    fn bounds(&self) -> (i32, i32);

    fn block_size(&self) -> i32;

    fn score(&self) -> u32;

    /// Whether `point` is outside the play-field or on the snake's body (the head is excluded)
    fn is_collision(&self, point: Position) -> bool {
        let (width, height) = self.bounds();
        let out_of_bounds = point.x < 0 || point.x >= width || point.y < 0 || point.y >= height;
        out_of_bounds || self.body().iter().skip(1).any(|&segment| segment == point)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn turns_cycle_clockwise() {
        assert_eq!(Direction::Right.turn(Action::Right), Direction::Down);
        assert_eq!(Direction::Down.turn(Action::Right), Direction::Left);
        assert_eq!(Direction::Left.turn(Action::Right), Direction::Up);
        assert_eq!(Direction::Up.turn(Action::Right), Direction::Right);

        assert_eq!(Direction::Right.turn(Action::Left), Direction::Up);
        assert_eq!(Direction::Up.turn(Action::Left), Direction::Left);

        for dir in Direction::iter() {
            assert_eq!(dir.turn(Action::Straight), dir, "straight keeps heading");
            assert_ne!(dir.turn(Action::Right), dir.opposite(), "no reversal");
            assert_ne!(dir.turn(Action::Left), dir.opposite(), "no reversal");
        }
    }

    #[test]
    fn one_hot_decoding() {
        for action in Action::iter() {
            assert_eq!(Action::from_one_hot(&action.one_hot()).unwrap(), action);
        }

        assert!(Action::from_one_hot(&[0.0, 0.0, 0.0]).is_err(), "none set");
        assert!(Action::from_one_hot(&[1.0, 1.0, 0.0]).is_err(), "two set");
        assert!(Action::from_one_hot(&[1.0, 0.0]).is_err(), "wrong length");
        assert!(Action::from_one_hot(&[0.5, 0.0, 0.0]).is_err(), "not binary");
    }

    #[test]
    fn steering_towards_direction() {
        assert_eq!(Action::towards(Direction::Right, Direction::Down), Action::Right);
        assert_eq!(Action::towards(Direction::Right, Direction::Up), Action::Left);
        assert_eq!(Action::towards(Direction::Right, Direction::Right), Action::Straight);
        assert_eq!(
            Action::towards(Direction::Right, Direction::Left),
            Action::Straight,
            "reversal ignored"
        );
    }

    #[test]
    fn position_moves_by_blocks() {
        let p = Position::new(40, 40);
        assert_eq!(p.moved(Direction::Right, 20), Position::new(60, 40));
        assert_eq!(p.moved(Direction::Up, 20), Position::new(40, 20));
    }
}
