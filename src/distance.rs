use crate::action::ALL_DIRECTIONS;
use crate::topology::Topology;

/// Distance reported between cells with no wall-free path between them.
pub const UNREACHABLE: u32 = u32::MAX;

/// All-pairs shortest path distances over the non-wall cells of a grid,
/// counting orthogonal steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMatrix {
    size: usize,
    distances: Vec<u32>,
}

impl DistanceMatrix {
    /// Run Floyd-Warshall over the grid graph.
    ///
    /// Wall cells get no edges and stay [`UNREACHABLE`] from every cell,
    /// themselves included.
    pub fn build(topology: &Topology) -> Self {
        let size = topology.cell_count();
        let mut distances = vec![UNREACHABLE; size * size];

        for u in 0..size {
            let cell = topology.cell(u);
            if topology.is_wall(cell) {
                continue;
            }
            distances[u * size + u] = 0;
            for dir in ALL_DIRECTIONS {
                if let Some(next) = topology.neighbor(cell, dir) {
                    if !topology.is_wall(next) {
                        distances[u * size + topology.index(next)] = 1;
                    }
                }
            }
        }

        for k in 0..size {
            if topology.is_wall(topology.cell(k)) {
                continue;
            }
            for i in 0..size {
                let ik = distances[i * size + k];
                if ik == UNREACHABLE {
                    continue;
                }
                for j in 0..size {
                    let through = ik.saturating_add(distances[k * size + j]);
                    let ij = &mut distances[i * size + j];
                    if through < *ij {
                        *ij = through;
                    }
                }
            }
        }

        DistanceMatrix { size, distances }
    }

    /// Distance between two cells by linear index.
    pub fn get(&self, from: usize, to: usize) -> u32 {
        self.distances[from * self.size + to]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::topology::Cell;

    impl DistanceMatrix {
        fn size(&self) -> usize {
            self.size
        }

        fn between(&self, topology: &Topology, from: Cell, to: Cell) -> u32 {
            self.get(topology.index(from), topology.index(to))
        }
    }

    fn open_room(rows: usize, cols: usize) -> Topology {
        Topology::new(rows, cols)
    }

    #[test]
    fn test_open_room_is_manhattan() {
        let topology = open_room(3, 4);
        let matrix = DistanceMatrix::build(&topology);
        for u in 0..topology.cell_count() {
            for v in 0..topology.cell_count() {
                let a = topology.cell(u);
                let b = topology.cell(v);
                let manhattan = a.row.abs_diff(b.row) as u32 + a.col.abs_diff(b.col) as u32;
                assert_eq!(matrix.get(u, v), manhattan, "{} -> {}", a, b);
            }
        }
    }

    #[test]
    fn test_symmetric_with_zero_diagonal() {
        let level = Level::from_text(
            "+++++++\n\
             +0 +  +\n\
             +  + ++\n\
             +     +\n\
             +++++++",
        )
        .unwrap();
        let topology = &level.topology;
        let matrix = DistanceMatrix::build(topology);
        for u in 0..matrix.size() {
            if !topology.is_wall(topology.cell(u)) {
                assert_eq!(matrix.get(u, u), 0);
            }
            for v in 0..matrix.size() {
                assert_eq!(matrix.get(u, v), matrix.get(v, u));
            }
        }
    }

    #[test]
    fn test_triangle_inequality() {
        let level = Level::from_text(
            "++++++\n\
             +0 + +\n\
             ++   +\n\
             +  + +\n\
             ++++++",
        )
        .unwrap();
        let matrix = DistanceMatrix::build(&level.topology);
        let n = matrix.size();
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    let through = matrix.get(i, k).saturating_add(matrix.get(k, j));
                    assert!(matrix.get(i, j) <= through);
                }
            }
        }
    }

    #[test]
    fn test_walls_detour() {
        let level = Level::from_text(
            "+++++\n\
             +0+ +\n\
             +   +\n\
             +++++",
        )
        .unwrap();
        let topology = &level.topology;
        let matrix = DistanceMatrix::build(topology);
        // Around the wall at (1,2): down, across twice, up.
        assert_eq!(matrix.between(topology, Cell::new(1, 1), Cell::new(1, 3)), 4);
        assert_eq!(
            matrix.between(topology, Cell::new(1, 1), Cell::new(1, 2)),
            UNREACHABLE
        );
        assert_eq!(
            matrix.between(topology, Cell::new(0, 0), Cell::new(0, 0)),
            UNREACHABLE
        );
    }

    #[test]
    fn test_disconnected_regions() {
        let level = Level::from_text(
            "+++++\n\
             +0+ +\n\
             +++++",
        )
        .unwrap();
        let topology = &level.topology;
        let matrix = DistanceMatrix::build(topology);
        assert_eq!(
            matrix.between(topology, Cell::new(1, 1), Cell::new(1, 3)),
            UNREACHABLE
        );
        assert_eq!(matrix.between(topology, Cell::new(1, 3), Cell::new(1, 3)), 0);
    }
}
