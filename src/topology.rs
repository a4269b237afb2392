use crate::action::Direction;
use crate::state::State;
use std::collections::BTreeMap;
use std::fmt;

/// A grid position. Rows grow southwards, columns eastwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: u16,
    pub col: u16,
}

impl Cell {
    pub const fn new(row: u16, col: u16) -> Self {
        Cell { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// The static part of a level: its dimensions, walls, and goal cells.
///
/// Goal letters are stored upper-cased so they compare directly against box
/// letters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    rows: usize,
    cols: usize,
    walls: Vec<bool>,
    goals: Vec<Option<char>>,
}

impl Topology {
    pub fn new(rows: usize, cols: usize) -> Self {
        Topology {
            rows,
            cols,
            walls: vec![false; rows * cols],
            goals: vec![None; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (cell.row as usize) < self.rows && (cell.col as usize) < self.cols
    }

    /// Linear index of a cell, `row * cols + col`.
    pub fn index(&self, cell: Cell) -> usize {
        debug_assert!(self.contains(cell), "cell {} out of bounds", cell);
        cell.row as usize * self.cols + cell.col as usize
    }

    /// Inverse of [`Topology::index`].
    pub fn cell(&self, idx: usize) -> Cell {
        debug_assert!(idx < self.cell_count(), "index {} out of bounds", idx);
        Cell::new((idx / self.cols) as u16, (idx % self.cols) as u16)
    }

    pub fn set_wall(&mut self, cell: Cell) {
        let idx = self.index(cell);
        self.walls[idx] = true;
    }

    pub fn set_goal(&mut self, cell: Cell, letter: char) {
        let idx = self.index(cell);
        self.goals[idx] = Some(letter.to_ascii_uppercase());
    }

    /// Cells outside the grid count as walls.
    pub fn is_wall(&self, cell: Cell) -> bool {
        !self.contains(cell) || self.walls[self.index(cell)]
    }

    pub fn goal_at(&self, cell: Cell) -> Option<char> {
        if self.contains(cell) {
            self.goals[self.index(cell)]
        } else {
            None
        }
    }

    /// Iterate over every goal cell together with the box letter it requires.
    pub fn goals(&self) -> impl Iterator<Item = (Cell, char)> + '_ {
        self.goals
            .iter()
            .enumerate()
            .filter_map(move |(idx, goal)| goal.map(|letter| (self.cell(idx), letter)))
    }

    /// The cell one step away in the given direction, if it lies on the grid.
    pub fn neighbor(&self, cell: Cell, dir: Direction) -> Option<Cell> {
        let (dr, dc) = dir.delta();
        let row = cell.row as i32 + dr;
        let col = cell.col as i32 + dc;
        if row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols {
            Some(Cell::new(row as u16, col as u16))
        } else {
            None
        }
    }

    pub fn goal_map(&self) -> GoalMap {
        let mut cells: BTreeMap<char, Vec<Cell>> = BTreeMap::new();
        for (cell, letter) in self.goals() {
            cells.entry(letter).or_default().push(cell);
        }
        GoalMap { cells }
    }

    /// Draw a state on this grid in level notation.
    pub fn render<'a>(&'a self, state: &'a State) -> Rendered<'a> {
        Rendered {
            topology: self,
            state,
        }
    }
}

/// Goal cells grouped by the box letter they require.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalMap {
    cells: BTreeMap<char, Vec<Cell>>,
}

impl GoalMap {
    pub fn iter(&self) -> impl Iterator<Item = (char, &[Cell])> {
        self.cells.iter().map(|(&letter, cells)| (letter, cells.as_slice()))
    }
}

pub struct Rendered<'a> {
    topology: &'a Topology,
    state: &'a State,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.topology.rows() {
            let mut line = String::with_capacity(self.topology.cols());
            for col in 0..self.topology.cols() {
                let cell = Cell::new(row as u16, col as u16);
                let ch = if cell == self.state.agent() {
                    '0'
                } else if let Some(letter) = self.state.box_at(cell) {
                    letter
                } else if self.topology.is_wall(cell) {
                    '+'
                } else if let Some(letter) = self.topology.goal_at(cell) {
                    letter.to_ascii_lowercase()
                } else {
                    ' '
                };
                line.push(ch);
            }
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        let topology = Topology::new(4, 7);
        for idx in 0..topology.cell_count() {
            let cell = topology.cell(idx);
            assert!(topology.contains(cell));
            assert_eq!(topology.index(cell), idx);
        }
        assert_eq!(topology.index(Cell::new(2, 3)), 2 * 7 + 3);
    }

    #[test]
    fn test_neighbor_bounds() {
        let topology = Topology::new(2, 2);
        let corner = Cell::new(0, 0);
        assert_eq!(topology.neighbor(corner, Direction::N), None);
        assert_eq!(topology.neighbor(corner, Direction::W), None);
        assert_eq!(topology.neighbor(corner, Direction::E), Some(Cell::new(0, 1)));
        assert_eq!(topology.neighbor(corner, Direction::S), Some(Cell::new(1, 0)));
    }

    #[test]
    fn test_walls_and_goals() {
        let mut topology = Topology::new(3, 3);
        topology.set_wall(Cell::new(0, 0));
        topology.set_goal(Cell::new(1, 1), 'a');
        topology.set_goal(Cell::new(2, 2), 'b');
        topology.set_goal(Cell::new(2, 0), 'a');

        assert!(topology.is_wall(Cell::new(0, 0)));
        assert!(!topology.is_wall(Cell::new(0, 1)));
        assert!(topology.is_wall(Cell::new(3, 0)));
        assert_eq!(topology.goal_at(Cell::new(1, 1)), Some('A'));

        let goal_map = topology.goal_map();
        let goals: Vec<(char, &[Cell])> = goal_map.iter().collect();
        assert_eq!(
            goals,
            vec![
                ('A', &[Cell::new(1, 1), Cell::new(2, 0)][..]),
                ('B', &[Cell::new(2, 2)][..]),
            ]
        );
    }
}
