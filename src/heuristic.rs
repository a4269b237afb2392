use crate::distance::{DistanceMatrix, UNREACHABLE};
use crate::state::State;
use crate::topology::{GoalMap, Topology};
use std::fmt;

/// Precomputed facts about a level that every heuristic evaluation reads.
///
/// Built once per level and lent to each [`Heuristic`].
pub struct HeuristicContext {
    topology: Topology,
    distances: DistanceMatrix,
    goals: GoalMap,
    /// Cost charged for a distance that cannot be covered.
    unreachable_penalty: u64,
}

impl HeuristicContext {
    pub fn new(topology: &Topology) -> Self {
        HeuristicContext {
            topology: topology.clone(),
            distances: DistanceMatrix::build(topology),
            goals: topology.goal_map(),
            unreachable_penalty: topology.cell_count() as u64,
        }
    }

    /// Estimated remaining cost of a state: the agent's distance to its nearest
    /// box minus one, plus for every goal cell the distance to the nearest box
    /// carrying its letter.
    ///
    /// Not admissible: several goals may count the same box.
    pub fn h(&self, state: &State) -> u64 {
        let agent = self.topology.index(state.agent());

        let to_box = if state.boxes().is_empty() {
            0
        } else {
            self.closest(agent, state, None).saturating_sub(1)
        };

        self.goals
            .iter()
            .flat_map(|(letter, cells)| cells.iter().map(move |&cell| (letter, cell)))
            .fold(to_box, |total, (letter, cell)| {
                let goal = self.topology.index(cell);
                total.saturating_add(self.closest(goal, state, Some(letter)))
            })
    }

    /// Distance from `from` to the nearest box, optionally only boxes with the
    /// given letter. Missing or unreachable boxes cost `unreachable_penalty`.
    fn closest(&self, from: usize, state: &State, letter: Option<char>) -> u64 {
        state
            .boxes()
            .iter()
            .filter(|&(_, &ch)| letter.is_none_or(|l| l.eq_ignore_ascii_case(&ch)))
            .map(|(&cell, _)| self.distances.get(from, self.topology.index(cell)))
            .filter(|&dist| dist != UNREACHABLE)
            .min()
            .map_or(self.unreachable_penalty, u64::from)
    }
}

/// How `f` combines path cost `g` with the estimate `h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    AStar,
    WeightedAStar(u32),
    Greedy,
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::AStar => write!(f, "A* evaluation"),
            Evaluation::WeightedAStar(w) => write!(f, "WA*({}) evaluation", w),
            Evaluation::Greedy => write!(f, "Greedy evaluation"),
        }
    }
}

/// A best-first evaluation function bound to a level's precomputed context.
pub struct Heuristic<'a> {
    context: &'a HeuristicContext,
    evaluation: Evaluation,
}

impl<'a> Heuristic<'a> {
    pub fn new(context: &'a HeuristicContext, evaluation: Evaluation) -> Self {
        Heuristic {
            context,
            evaluation,
        }
    }

    pub fn h(&self, state: &State) -> u64 {
        self.context.h(state)
    }

    /// Priority of a node with path cost `g`; lower is expanded first.
    pub fn f(&self, state: &State, g: u32) -> u64 {
        let h = self.h(state);
        let g = u64::from(g);
        match self.evaluation {
            Evaluation::AStar => g.saturating_add(h),
            Evaluation::WeightedAStar(w) => g.saturating_add(h.saturating_mul(u64::from(w))),
            Evaluation::Greedy => h,
        }
    }
}

impl fmt::Display for Heuristic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.evaluation.fmt(f)
    }
}
