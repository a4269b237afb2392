use crate::action::{Action, MAX_ACTIONS};
use crate::topology::{Cell, Topology};
use arrayvec::ArrayVec;
use std::collections::BTreeMap;
use std::fmt;

/// A configuration of the level: where the agent stands and which box sits where.
///
/// Path cost, parent and producing action live on the search node, so two
/// states reached along different paths compare and hash equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State {
    agent: Cell,
    boxes: BTreeMap<Cell, char>,
}

pub type Successors = ArrayVec<(Action, State), MAX_ACTIONS>;

impl State {
    pub fn new(agent: Cell, boxes: BTreeMap<Cell, char>) -> Self {
        State { agent, boxes }
    }

    pub fn agent(&self) -> Cell {
        self.agent
    }

    pub fn boxes(&self) -> &BTreeMap<Cell, char> {
        &self.boxes
    }

    pub fn box_at(&self, cell: Cell) -> Option<char> {
        self.boxes.get(&cell).copied()
    }

    fn is_free(&self, topology: &Topology, cell: Cell) -> bool {
        !topology.is_wall(cell) && !self.boxes.contains_key(&cell)
    }

    /// Check the placement rules: no box or agent on a wall and the agent not
    /// on a box.
    pub fn validate(&self, topology: &Topology) -> Result<(), String> {
        if topology.is_wall(self.agent) {
            return Err(format!("Agent at {} is on a wall", self.agent));
        }
        if self.boxes.contains_key(&self.agent) {
            return Err(format!("Agent at {} is on a box", self.agent));
        }
        for (&cell, &letter) in &self.boxes {
            if topology.is_wall(cell) {
                return Err(format!("Box {} at {} is on a wall", letter, cell));
            }
            if !letter.is_ascii_uppercase() {
                return Err(format!("Box at {} has invalid letter '{}'", cell, letter));
            }
        }
        Ok(())
    }

    /// Apply an action, returning the resulting state or `None` if the action
    /// is not applicable here.
    pub fn apply(&self, topology: &Topology, action: Action) -> Option<State> {
        match action {
            Action::Move(dir) => {
                let target = topology.neighbor(self.agent, dir)?;
                if !self.is_free(topology, target) {
                    return None;
                }
                Some(State {
                    agent: target,
                    boxes: self.boxes.clone(),
                })
            }
            Action::Push(agent_dir, box_dir) => {
                let box_cell = topology.neighbor(self.agent, agent_dir)?;
                let letter = self.box_at(box_cell)?;
                let box_target = topology.neighbor(box_cell, box_dir)?;
                if !self.is_free(topology, box_target) {
                    return None;
                }
                let mut boxes = self.boxes.clone();
                boxes.remove(&box_cell);
                boxes.insert(box_target, letter);
                Some(State {
                    agent: box_cell,
                    boxes,
                })
            }
            Action::Pull(agent_dir, box_dir) => {
                let target = topology.neighbor(self.agent, agent_dir)?;
                if !self.is_free(topology, target) {
                    return None;
                }
                let box_cell = topology.neighbor(self.agent, box_dir)?;
                let letter = self.box_at(box_cell)?;
                let mut boxes = self.boxes.clone();
                boxes.remove(&box_cell);
                boxes.insert(self.agent, letter);
                Some(State {
                    agent: target,
                    boxes,
                })
            }
        }
    }

    /// All applicable actions with their resulting states, in [`Action::ALL`] order.
    pub fn successors(&self, topology: &Topology) -> Successors {
        Action::ALL
            .iter()
            .filter_map(|&action| self.apply(topology, action).map(|next| (action, next)))
            .collect()
    }

    /// True if every goal cell holds a box with the matching letter.
    pub fn is_goal(&self, topology: &Topology) -> bool {
        topology
            .goals()
            .all(|(cell, letter)| self.box_at(cell) == Some(letter))
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent {}; boxes:", self.agent)?;
        if self.boxes.is_empty() {
            return write!(f, " none");
        }
        for (cell, letter) in &self.boxes {
            write!(f, " {}{}", letter, cell)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Direction::*;
    use crate::level::Level;

    fn level(text: &str) -> Level {
        Level::from_text(text).unwrap()
    }

    #[test]
    fn test_move() {
        let level = level("+++++\n\
                           +0  +\n\
                           +++++");
        let next = level
            .initial
            .apply(&level.topology, Action::Move(E))
            .unwrap();
        assert_eq!(next.agent(), Cell::new(1, 2));
        assert!(level.initial.apply(&level.topology, Action::Move(W)).is_none());
        assert!(level.initial.apply(&level.topology, Action::Move(N)).is_none());
    }

    #[test]
    fn test_move_into_box_rejected() {
        let level = level("+++++\n\
                           +0A +\n\
                           +++++");
        assert!(level.initial.apply(&level.topology, Action::Move(E)).is_none());
    }

    #[test]
    fn test_push() {
        let level = level("++++++\n\
                           +0A  +\n\
                           +    +\n\
                           ++++++");
        let next = level
            .initial
            .apply(&level.topology, Action::Push(E, E))
            .unwrap();
        assert_eq!(next.agent(), Cell::new(1, 2));
        assert_eq!(next.box_at(Cell::new(1, 3)), Some('A'));
        assert_eq!(next.box_at(Cell::new(1, 2)), None);

        let sideways = level
            .initial
            .apply(&level.topology, Action::Push(E, S))
            .unwrap();
        assert_eq!(sideways.agent(), Cell::new(1, 2));
        assert_eq!(sideways.box_at(Cell::new(2, 2)), Some('A'));

        // Wall north of the box.
        assert!(level.initial.apply(&level.topology, Action::Push(E, N)).is_none());
        // No box to the south of the agent.
        assert!(level.initial.apply(&level.topology, Action::Push(S, S)).is_none());
    }

    #[test]
    fn test_push_into_box_rejected() {
        let level = level("++++++\n\
                           +0AB +\n\
                           ++++++");
        assert!(level.initial.apply(&level.topology, Action::Push(E, E)).is_none());
    }

    #[test]
    fn test_pull() {
        let level = level("++++++\n\
                           + 0A +\n\
                           +    +\n\
                           ++++++");
        let next = level
            .initial
            .apply(&level.topology, Action::Pull(W, E))
            .unwrap();
        assert_eq!(next.agent(), Cell::new(1, 1));
        assert_eq!(next.box_at(Cell::new(1, 2)), Some('A'));
        assert_eq!(next.box_at(Cell::new(1, 3)), None);

        let down = level
            .initial
            .apply(&level.topology, Action::Pull(S, E))
            .unwrap();
        assert_eq!(down.agent(), Cell::new(2, 2));
        assert_eq!(down.box_at(Cell::new(1, 2)), Some('A'));

        // Wall where the agent would go.
        assert!(level.initial.apply(&level.topology, Action::Pull(N, E)).is_none());
    }

    #[test]
    fn test_successors() {
        let level = level("+++++\n\
                           +   +\n\
                           + 0A+\n\
                           +   +\n\
                           +++++");
        let successors = level.initial.successors(&level.topology);
        let actions: Vec<Action> = successors.iter().map(|(action, _)| *action).collect();
        let expected = vec![
            Action::Move(N),
            Action::Move(S),
            Action::Move(W),
            Action::Push(E, N),
            Action::Push(E, S),
            Action::Pull(N, E),
            Action::Pull(S, E),
            Action::Pull(W, E),
        ];
        assert_eq!(actions, expected);
        for (action, next) in &successors {
            assert_eq!(level.initial.apply(&level.topology, *action).as_ref(), Some(next));
        }
    }

    #[test]
    fn test_equal_states_from_different_paths() {
        let level = level("+++++\n\
                           +0  +\n\
                           +   +\n\
                           +++++");
        let topology = &level.topology;
        let east_south = level
            .initial
            .apply(topology, Action::Move(E))
            .and_then(|s| s.apply(topology, Action::Move(S)))
            .unwrap();
        let south_east = level
            .initial
            .apply(topology, Action::Move(S))
            .and_then(|s| s.apply(topology, Action::Move(E)))
            .unwrap();
        assert_eq!(east_south, south_east);

        let mut explored = std::collections::HashSet::new();
        explored.insert(east_south);
        assert!(!explored.insert(south_east));
    }

    #[test]
    fn test_is_goal() {
        let solved = level("+++++\n\
                            +0  +\n\
                            +++++");
        assert!(solved.initial.is_goal(&solved.topology));

        let unsolved = level("++++++\n\
                              +0A a+\n\
                              ++++++");
        assert!(!unsolved.initial.is_goal(&unsolved.topology));
        let topology = &unsolved.topology;
        let done = unsolved
            .initial
            .apply(topology, Action::Push(E, E))
            .and_then(|s| s.apply(topology, Action::Push(E, E)))
            .unwrap();
        assert!(done.is_goal(topology));
    }

    #[test]
    fn test_wrong_letter_is_not_goal() {
        let level = level("+++++\n\
                           +0Ba+\n\
                           +++++");
        let done = level
            .initial
            .apply(&level.topology, Action::Push(E, E))
            .unwrap();
        assert!(!done.is_goal(&level.topology));
    }

    #[test]
    fn test_validate() {
        let level = level("+++++\n\
                           +0A +\n\
                           +++++");
        assert!(level.initial.validate(&level.topology).is_ok());

        let on_wall = State::new(Cell::new(0, 0), BTreeMap::new());
        assert!(on_wall.validate(&level.topology).is_err());

        let mut boxes = BTreeMap::new();
        boxes.insert(Cell::new(1, 1), 'A');
        let on_box = State::new(Cell::new(1, 1), boxes);
        assert!(on_box.validate(&level.topology).is_err());
    }

    #[test]
    fn test_display() {
        let level = level("+++++\n\
                           +0AB+\n\
                           +++++");
        assert_eq!(
            level.initial.to_string(),
            "agent (1,1); boxes: A(1,2) B(1,3)"
        );
    }
}
