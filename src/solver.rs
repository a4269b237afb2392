use crate::action::Action;
use crate::state::{State, Successors};
use crate::strategy::{NodeId, Strategy};
use crate::topology::Topology;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::fmt;
use std::mem::size_of;
use std::rc::Rc;

/// Number of expansions between two progress reports.
pub const STATUS_INTERVAL: usize = 1000;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Invalid initial state: {0}")]
    InvalidState(String),
}

/// A state in the search tree together with how it was reached.
#[derive(Debug, Clone)]
pub struct Node {
    pub state: Rc<State>,
    /// Arena index of the node this one was expanded from, `None` for the root.
    pub parent: Option<NodeId>,
    /// Action that turned the parent into this node, `None` for the root.
    pub action: Option<Action>,
    /// Number of actions from the initial state.
    pub g: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    Solved(Vec<Action>),
    /// The frontier ran dry without reaching a goal state.
    Impossible,
    /// A resource ceiling was hit before the search finished.
    Cutoff,
}

/// Resource ceilings for one search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of states generated, the initial state included.
    pub max_states: usize,
    /// Maximum estimated memory held by the search tree.
    pub max_memory_bytes: Option<usize>,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_states: 10_000_000,
            max_memory_bytes: None,
        }
    }
}

/// The order in which an expanded node's successors reach the frontier.
pub enum SuccessorOrder {
    /// Scan order of [`Action::ALL`].
    Fixed,
    /// Shuffled for every expansion, so equally good plans are found with no
    /// preference for a direction.
    Shuffled(ChaCha8Rng),
}

impl SuccessorOrder {
    /// Shuffled order, reproducible when a seed is given.
    pub fn shuffled(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        SuccessorOrder::Shuffled(rng)
    }

    fn arrange(&mut self, successors: &mut Successors) {
        if let SuccessorOrder::Shuffled(rng) = self {
            successors.shuffle(rng);
        }
    }
}

/// Estimated memory held by the search tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryUsage {
    pub used_bytes: usize,
    pub max_bytes: Option<usize>,
}

impl fmt::Display for MemoryUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MB: f64 = 1024.0 * 1024.0;
        write!(f, "[Used: {:.2} MB", self.used_bytes as f64 / MB)?;
        match self.max_bytes {
            Some(max) => write!(f, ", Max: {:.2} MB]", max as f64 / MB),
            None => write!(f, "]"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ceiling {
    States,
    Memory,
    Allocation,
}

impl fmt::Display for Ceiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ceiling::States => write!(f, "state limit"),
            Ceiling::Memory => write!(f, "memory limit"),
            Ceiling::Allocation => write!(f, "allocation failure"),
        }
    }
}

/// Drives a strategy from the initial state until a goal is found, the
/// frontier is exhausted, or a resource ceiling is reached.
pub struct Solver<'a> {
    topology: &'a Topology,
    strategy: Strategy<'a>,
    nodes: Vec<Node>,
    limits: Limits,
    order: SuccessorOrder,
    used_bytes: usize,
    /// Arena index of the goal node once a plan has been found.
    goal: Option<NodeId>,
}

impl<'a> Solver<'a> {
    /// Set up a search from `initial`. Fails if the initial state breaks the
    /// placement rules of the level.
    pub fn new(
        topology: &'a Topology,
        initial: State,
        strategy: Strategy<'a>,
        limits: Limits,
        order: SuccessorOrder,
    ) -> Result<Self, SearchError> {
        initial
            .validate(topology)
            .map_err(SearchError::InvalidState)?;

        let mut solver = Solver {
            topology,
            strategy,
            nodes: Vec::new(),
            limits,
            order,
            used_bytes: 0,
            goal: None,
        };
        let root = Rc::new(initial);
        solver.used_bytes = node_bytes(&root);
        solver.nodes.push(Node {
            state: Rc::clone(&root),
            parent: None,
            action: None,
            g: 0,
        });
        solver.strategy.add_to_frontier(0, root, 0);
        Ok(solver)
    }

    /// Number of states generated so far, the initial state included.
    pub fn nodes_generated(&self) -> usize {
        self.nodes.len()
    }

    /// The state the returned plan ends in, once a plan has been found.
    pub fn goal_state(&self) -> Option<&State> {
        self.goal.map(|id| &*self.nodes[id].state)
    }

    pub fn memory(&self) -> MemoryUsage {
        MemoryUsage {
            used_bytes: self.used_bytes,
            max_bytes: self.limits.max_memory_bytes,
        }
    }

    pub fn search_status(&self) -> String {
        self.strategy.search_status(self.memory())
    }

    pub fn solve(&mut self) -> SolveResult {
        tracing::info!("Search starting with strategy {}.", self.strategy);
        let result = self.run();
        match &result {
            SolveResult::Solved(plan) => {
                tracing::info!(length = plan.len(), "Found solution of length {}", plan.len());
                if let Some(state) = self.goal_state() {
                    tracing::debug!(%state, "Goal reached");
                }
            }
            SolveResult::Impossible => tracing::info!("Frontier exhausted, no plan found"),
            SolveResult::Cutoff => {}
        }
        tracing::info!(generated = self.nodes_generated(), "{}", self.search_status());
        result
    }

    fn run(&mut self) -> SolveResult {
        let mut iterations = 0;
        loop {
            if iterations == STATUS_INTERVAL {
                tracing::info!("{}", self.search_status());
                iterations = 0;
            }

            if self.strategy.frontier_is_empty() {
                return SolveResult::Impossible;
            }
            let Some(leaf) = self.strategy.get_and_remove_leaf() else {
                return SolveResult::Impossible;
            };

            let state = Rc::clone(&self.nodes[leaf].state);
            if state.is_goal(self.topology) {
                self.goal = Some(leaf);
                return SolveResult::Solved(self.extract_plan(leaf));
            }

            let g = self.nodes[leaf].g + 1;
            self.strategy.add_to_explored(Rc::clone(&state));

            let mut successors = state.successors(self.topology);
            self.order.arrange(&mut successors);
            for (action, next) in successors {
                if self.strategy.is_explored(&next) || self.strategy.in_frontier(&next) {
                    continue;
                }
                let next = Rc::new(next);
                let node = Node {
                    state: Rc::clone(&next),
                    parent: Some(leaf),
                    action: Some(action),
                    g,
                };
                match self.push_node(node) {
                    Ok(id) => self.strategy.add_to_frontier(id, next, g),
                    Err(ceiling) => {
                        tracing::warn!(%ceiling, "Maximum memory usage exceeded.");
                        return SolveResult::Cutoff;
                    }
                }
            }
            iterations += 1;
        }
    }

    fn push_node(&mut self, node: Node) -> Result<NodeId, Ceiling> {
        if self.nodes.len() >= self.limits.max_states {
            return Err(Ceiling::States);
        }
        let bytes = node_bytes(&node.state);
        if let Some(max) = self.limits.max_memory_bytes {
            if self.used_bytes.saturating_add(bytes) > max {
                return Err(Ceiling::Memory);
            }
        }
        self.nodes.try_reserve(1).map_err(|_| Ceiling::Allocation)?;
        self.used_bytes += bytes;
        self.nodes.push(node);
        Ok(self.nodes.len() - 1)
    }

    /// Actions leading from the initial state to the given node.
    fn extract_plan(&self, id: NodeId) -> Vec<Action> {
        let mut plan = Vec::with_capacity(self.nodes[id].g as usize);
        let mut current = Some(id);
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            plan.extend(node.action);
            current = node.parent;
        }
        plan.reverse();
        plan
    }
}

/// Rough footprint of one node: the arena slot, the shared state with its box
/// map, and the two set or queue entries pointing at it.
fn node_bytes(state: &State) -> usize {
    size_of::<Node>()
        + size_of::<State>()
        + 2 * size_of::<usize>()
        + state.boxes().len() * (size_of::<crate::topology::Cell>() + size_of::<char>())
        + 2 * size_of::<Rc<State>>()
}
