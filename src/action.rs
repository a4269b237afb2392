use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    N,
    S,
    E,
    W,
}

pub const ALL_DIRECTIONS: [Direction; 4] = [Direction::N, Direction::S, Direction::E, Direction::W];

impl Direction {
    /// Row and column change of one step in this direction. Rows grow southwards.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::N => (-1, 0),
            Direction::S => (1, 0),
            Direction::E => (0, 1),
            Direction::W => (0, -1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::N => write!(f, "N"),
            Direction::S => write!(f, "S"),
            Direction::E => write!(f, "E"),
            Direction::W => write!(f, "W"),
        }
    }
}

/// A single step of a plan.
///
/// For `Push` and `Pull` the first direction is where the agent goes and the
/// second is where the box goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Move(Direction),
    Push(Direction, Direction),
    Pull(Direction, Direction),
}

/// Upper bound on the number of actions applicable in one state.
pub const MAX_ACTIONS: usize = 28;

impl Action {
    /// Every candidate action: 4 moves, 12 pushes and 12 pulls.
    ///
    /// A push may not send the box back into the agent, and a pull may not
    /// drag the box into the cell the agent is moving to.
    pub const ALL: [Action; MAX_ACTIONS] = {
        use Direction::*;
        [
            Action::Move(N),
            Action::Move(S),
            Action::Move(E),
            Action::Move(W),
            Action::Push(N, N),
            Action::Push(N, E),
            Action::Push(N, W),
            Action::Push(S, S),
            Action::Push(S, E),
            Action::Push(S, W),
            Action::Push(E, N),
            Action::Push(E, S),
            Action::Push(E, E),
            Action::Push(W, N),
            Action::Push(W, S),
            Action::Push(W, W),
            Action::Pull(N, S),
            Action::Pull(N, E),
            Action::Pull(N, W),
            Action::Pull(S, N),
            Action::Pull(S, E),
            Action::Pull(S, W),
            Action::Pull(E, N),
            Action::Pull(E, S),
            Action::Pull(E, W),
            Action::Pull(W, N),
            Action::Pull(W, S),
            Action::Pull(W, E),
        ]
    };
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move(agent) => write!(f, "Move({})", agent),
            Action::Push(agent, boxd) => write!(f, "Push({},{})", agent, boxd),
            Action::Pull(agent, boxd) => write!(f, "Pull({},{})", agent, boxd),
        }
    }
}
