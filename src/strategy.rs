use crate::heuristic::Heuristic;
use crate::pqueue::PriorityQueue;
use crate::state::State;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

/// Index of a node in the search arena.
pub type NodeId = usize;

type Leaf = (NodeId, Rc<State>);

enum Frontier<'a> {
    /// Breadth-first: first in, first out.
    Fifo(VecDeque<Leaf>),
    /// Depth-first: last in, first out.
    Lifo(Vec<Leaf>),
    /// Best-first: lowest `f` first, ties in arrival order.
    BestFirst {
        queue: PriorityQueue<Leaf>,
        heuristic: Heuristic<'a>,
    },
}

/// Owns the frontier and explored set of one search run and decides which
/// leaf is expanded next.
///
/// Membership in either set is keyed by state equality, so a configuration
/// reached along several paths is only admitted once.
pub struct Strategy<'a> {
    frontier: Frontier<'a>,
    frontier_set: HashSet<Rc<State>>,
    explored: HashSet<Rc<State>>,
    start: Instant,
}

impl<'a> Strategy<'a> {
    fn with_frontier(frontier: Frontier<'a>) -> Self {
        Strategy {
            frontier,
            frontier_set: HashSet::new(),
            explored: HashSet::new(),
            start: Instant::now(),
        }
    }

    pub fn bfs() -> Self {
        Self::with_frontier(Frontier::Fifo(VecDeque::new()))
    }

    pub fn dfs() -> Self {
        Self::with_frontier(Frontier::Lifo(Vec::new()))
    }

    pub fn best_first(heuristic: Heuristic<'a>) -> Self {
        Self::with_frontier(Frontier::BestFirst {
            queue: PriorityQueue::new(),
            heuristic,
        })
    }

    /// Add a node whose state has path cost `g`.
    pub fn add_to_frontier(&mut self, id: NodeId, state: Rc<State>, g: u32) {
        self.frontier_set.insert(Rc::clone(&state));
        match &mut self.frontier {
            Frontier::Fifo(queue) => queue.push_back((id, state)),
            Frontier::Lifo(stack) => stack.push((id, state)),
            Frontier::BestFirst { queue, heuristic } => {
                let f = heuristic.f(&state, g);
                queue.push(f, (id, state));
            }
        }
    }

    /// Remove the next leaf in this strategy's order, or `None` if the
    /// frontier is empty.
    pub fn get_and_remove_leaf(&mut self) -> Option<NodeId> {
        let (id, state) = match &mut self.frontier {
            Frontier::Fifo(queue) => queue.pop_front(),
            Frontier::Lifo(stack) => stack.pop(),
            Frontier::BestFirst { queue, .. } => queue.pop_min(),
        }?;
        self.frontier_set.remove(&*state);
        Some(id)
    }

    pub fn add_to_explored(&mut self, state: Rc<State>) {
        self.explored.insert(state);
    }

    pub fn is_explored(&self, state: &State) -> bool {
        self.explored.contains(state)
    }

    pub fn in_frontier(&self, state: &State) -> bool {
        self.frontier_set.contains(state)
    }

    pub fn count_explored(&self) -> usize {
        self.explored.len()
    }

    pub fn count_frontier(&self) -> usize {
        match &self.frontier {
            Frontier::Fifo(queue) => queue.len(),
            Frontier::Lifo(stack) => stack.len(),
            Frontier::BestFirst { queue, .. } => queue.len(),
        }
    }

    pub fn frontier_is_empty(&self) -> bool {
        match &self.frontier {
            Frontier::Fifo(queue) => queue.is_empty(),
            Frontier::Lifo(stack) => stack.is_empty(),
            Frontier::BestFirst { queue, .. } => queue.is_empty(),
        }
    }

    /// Seconds since the strategy was created.
    pub fn time_spent(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    /// One-line progress report, followed by a memory summary.
    pub fn search_status(&self, memory: impl fmt::Display) -> String {
        format!(
            "#Explored: {:>4}, #Frontier: {:>3}, Time: {:>3.2} s \t{}",
            self.count_explored(),
            self.count_frontier(),
            self.time_spent(),
            memory
        )
    }
}

impl fmt::Display for Strategy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.frontier {
            Frontier::Fifo(_) => write!(f, "Breadth-first Search"),
            Frontier::Lifo(_) => write!(f, "Depth-first Search"),
            Frontier::BestFirst { heuristic, .. } => {
                write!(f, "Best-first Search using {}", heuristic)
            }
        }
    }
}
