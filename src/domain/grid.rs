use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::Rng;
use rayon::prelude::*;
use thiserror::Error;

use super::Cell;

/// Fraction of cells set alive when (re)seeding.
const SEED_LIVE_PROBABILITY: f64 = 0.3;

/// Zero rows or columns were requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("grid dimensions must be positive, got {width}x{height}")]
pub struct InvalidDimensions {
    pub width: usize,
    pub height: usize,
}

/// Grid holds one generation of the 2D cellular automaton.
/// Stepping is functional: a step reads this buffer and writes a fresh one,
/// so a cell's update never sees already-updated neighbors. Dimensions are
/// fixed for the lifetime of a grid; resizing means building a new one.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a new grid with all cells initially dead.
    pub fn new(width: usize, height: usize) -> Result<Self, InvalidDimensions> {
        if width == 0 || height == 0 {
            return Err(InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![Cell::Dead; width * height],
        })
    }

    /// Get grid dimensions as (width, height)
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Convert 2D coordinates to 1D index
    const fn get_index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Get cell at position (with bounds checking)
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        (x < self.width && y < self.height).then(|| self.cells[self.get_index(x, y)])
    }

    /// Set cell at position; out-of-bounds writes are ignored
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            let idx = self.get_index(x, y);
            self.cells[idx] = cell;
        }
    }

    /// Count live neighbors among the 8 adjacent coordinates.
    /// Coordinates outside the grid count as dead: the boundary is a dead
    /// edge, not a torus.
    fn live_neighbors(&self, x: usize, y: usize) -> u8 {
        (-1i64..=1)
            .flat_map(|dy| (-1i64..=1).map(move |dx| (dx, dy)))
            .filter(|&(dx, dy)| dx != 0 || dy != 0)
            .filter_map(|(dx, dy)| {
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                (nx >= 0 && ny >= 0)
                    .then(|| self.get(nx as usize, ny as usize))
                    .flatten()
            })
            .filter(|cell| cell.is_alive())
            .count() as u8
    }

    /// Compute the next generation (serial). The input grid is left
    /// untouched; callers decide whether to keep or discard it.
    pub fn step(&self) -> Self {
        let cells = (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .map(|(x, y)| self.cells[self.get_index(x, y)].evolve(self.live_neighbors(x, y)))
            .collect();

        Self {
            width: self.width,
            height: self.height,
            cells,
        }
    }

    /// Compute the next generation with rayon row-parallelism.
    /// Identical results to `step`; worthwhile for grids beyond ~100x100.
    pub fn step_parallel(&self) -> Self {
        let cells: Vec<Cell> = (0..self.height)
            .into_par_iter()
            .flat_map_iter(|y| {
                (0..self.width)
                    .map(move |x| self.cells[self.get_index(x, y)].evolve(self.live_neighbors(x, y)))
            })
            .collect();

        Self {
            width: self.width,
            height: self.height,
            cells,
        }
    }

    /// Repopulate every cell from a pseudo-random source keyed by `seed`.
    /// The same seed over the same dimensions reproduces the same pattern.
    pub fn reseed(mut self, seed: &str) -> Self {
        let mut rng = StdRng::seed_from_u64(fold_seed(seed));
        self.cells.iter_mut().for_each(|cell| {
            *cell = if rng.random_bool(SEED_LIVE_PROBABILITY) {
                Cell::Alive
            } else {
                Cell::Dead
            };
        });
        self
    }

    /// Number of live cells in the current generation
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    /// Iterate over all cells with their positions
    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| (x, y)))
            .map(|(x, y)| (x, y, self.cells[self.get_index(x, y)]))
    }
}

/// FNV-1a fold of the seed identifier into a PRNG key.
fn fold_seed(seed: &str) -> u64 {
    seed.bytes().fold(0xcbf2_9ce4_8422_2325u64, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_set(grid: &Grid) -> Vec<(usize, usize)> {
        grid.iter_cells()
            .filter(|(_, _, cell)| cell.is_alive())
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert_eq!(
            Grid::new(0, 5),
            Err(InvalidDimensions { width: 0, height: 5 })
        );
        assert_eq!(
            Grid::new(5, 0),
            Err(InvalidDimensions { width: 5, height: 0 })
        );
    }

    #[test]
    fn test_dead_grid_stays_dead() {
        let grid = Grid::new(8, 8).unwrap();
        assert_eq!(grid.step().population(), 0);
    }

    #[test]
    fn test_step_does_not_mutate_input() {
        let mut grid = Grid::new(5, 5).unwrap();
        grid.set(1, 2, Cell::Alive);
        grid.set(2, 2, Cell::Alive);
        grid.set(3, 2, Cell::Alive);
        let before = grid.clone();

        let _next = grid.step();
        assert_eq!(grid, before);
    }

    #[test]
    fn test_boundary_is_dead_edge_not_torus() {
        // Horizontal triple on the top row of a 5x5 grid. On a torus the
        // wrapped row would change the outcome; with a dead edge the result
        // is exactly the center survivor plus one birth below it.
        let mut grid = Grid::new(5, 5).unwrap();
        grid.set(0, 0, Cell::Alive);
        grid.set(1, 0, Cell::Alive);
        grid.set(2, 0, Cell::Alive);

        let next = grid.step();
        assert_eq!(live_set(&next), vec![(1, 0), (1, 1)]);
    }

    #[test]
    fn test_no_wrap_around_to_the_opposite_edge() {
        // Block in the corner plus a lone cell on the far edge. With
        // wrap-around the lone cell would touch the block and overcrowd
        // its corner; with a dead edge the lone cell simply dies and the
        // block stands.
        let mut grid = Grid::new(5, 4).unwrap();
        grid.set(0, 0, Cell::Alive);
        grid.set(1, 0, Cell::Alive);
        grid.set(0, 1, Cell::Alive);
        grid.set(1, 1, Cell::Alive);
        grid.set(4, 0, Cell::Alive);

        let next = grid.step();
        assert_eq!(live_set(&next), vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_lone_cell_dies() {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.set(1, 1, Cell::Alive);
        assert_eq!(grid.step().population(), 0);
    }

    #[test]
    fn test_parallel_step_matches_serial() {
        let grid = Grid::new(64, 48).unwrap().reseed("parity-check");
        assert_eq!(grid.step(), grid.step_parallel());
    }

    #[test]
    fn test_reseed_is_deterministic() {
        let a = Grid::new(20, 20).unwrap().reseed("stable-seed");
        let b = Grid::new(20, 20).unwrap().reseed("stable-seed");
        assert_eq!(a, b);
        assert!(a.population() > 0, "seeding left the grid empty");
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = Grid::new(20, 20).unwrap().reseed("seed-one");
        let b = Grid::new(20, 20).unwrap().reseed("seed-two");
        assert_ne!(a, b);
    }

    #[test]
    fn test_reseed_keeps_dimensions() {
        let grid = Grid::new(7, 11).unwrap().reseed("any");
        assert_eq!(grid.dimensions(), (7, 11));
    }
}
