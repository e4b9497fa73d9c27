use super::types::{Board, Direction};

/// Length of the encoded state vector
pub const STATE_SIZE: usize = 11;

/// Binary feature vector observed by the agent
///
/// Layout:
/// - `0..3`: danger straight ahead, to the right, to the left
/// - `3..7`: heading is left, right, up, down
/// - `7..11`: food is left, right, above, below the head
pub type State = [f32; STATE_SIZE];

fn flag(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Encode a board into its feature vector
pub fn encode(board: &impl Board) -> State {
    let head = board.head();
    let food = board.food();
    let dir = board.direction();
    let block = board.block_size();
    let danger = |d: Direction| flag(board.is_collision(head.moved(d, block)));

    [
        danger(dir),
        danger(dir.clockwise()),
        danger(dir.counter_clockwise()),
        flag(dir == Direction::Left),
        flag(dir == Direction::Right),
        flag(dir == Direction::Up),
        flag(dir == Direction::Down),
        flag(food.x < head.x),
        flag(food.x > head.x),
        flag(food.y < head.y),
        flag(food.y > head.y),
    ]
}
