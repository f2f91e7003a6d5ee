use super::{Cell, Grid};

/// A named arrangement of live cells that can be stamped onto a grid
#[derive(Clone)]
pub struct Pattern {
    pub name: &'static str,
    pub description: &'static str,
    pub width: usize,
    pub height: usize,
    pub cells: Vec<(usize, usize)>, // Relative coordinates of alive cells
}

impl Pattern {
    /// Create a new pattern from alive cell coordinates
    pub fn new(name: &'static str, description: &'static str, cells: Vec<(usize, usize)>) -> Self {
        let width = cells.iter().map(|(x, _)| *x).max().unwrap_or(0) + 1;
        let height = cells.iter().map(|(_, y)| *y).max().unwrap_or(0) + 1;
        Self {
            name,
            description,
            width,
            height,
            cells,
        }
    }

    /// Place pattern on grid with its top-left corner at (x, y)
    pub fn place_on(&self, grid: &mut Grid, x: usize, y: usize) {
        for (dx, dy) in &self.cells {
            grid.set(x + dx, y + dy, Cell::Alive);
        }
    }
}

/// Classic pattern library, kept to the fixtures the tests and demo use
pub mod presets {
    use super::*;

    /// Block - simple still life
    pub fn block() -> Pattern {
        Pattern::new(
            "Block",
            "Still life",
            vec![(0, 0), (1, 0), (0, 1), (1, 1)],
        )
    }

    /// Blinker - period 2 oscillator
    pub fn blinker() -> Pattern {
        Pattern::new("Blinker", "Oscillator (period 2)", vec![(0, 1), (1, 1), (2, 1)])
    }

    /// Toad - period 2 oscillator
    pub fn toad() -> Pattern {
        Pattern::new(
            "Toad",
            "Oscillator (period 2)",
            vec![(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
        )
    }

    /// Glider - simplest spaceship, moves diagonally
    pub fn glider() -> Pattern {
        Pattern::new(
            "Glider",
            "Moves diagonally (period 4)",
            vec![(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::presets;
    use super::*;

    fn grid_with(pattern: &Pattern, width: usize, height: usize, x: usize, y: usize) -> Grid {
        let mut grid = Grid::new(width, height).unwrap();
        pattern.place_on(&mut grid, x, y);
        grid
    }

    #[test]
    fn test_pattern_bounds_derived_from_cells() {
        let glider = presets::glider();
        assert_eq!((glider.width, glider.height), (3, 3));
    }

    #[test]
    fn test_block_is_invariant() {
        let grid = grid_with(&presets::block(), 6, 6, 2, 2);
        let mut current = grid.clone();
        for _ in 0..5 {
            current = current.step();
            assert_eq!(current, grid);
        }
    }

    #[test]
    fn test_blinker_oscillates_with_period_two() {
        let grid = grid_with(&presets::blinker(), 7, 7, 2, 2);
        let flipped = grid.step();
        assert_ne!(flipped, grid);
        assert_eq!(flipped.step(), grid);
    }

    #[test]
    fn test_toad_oscillates_with_period_two() {
        let grid = grid_with(&presets::toad(), 8, 8, 2, 3);
        assert_eq!(grid.step().step(), grid);
    }

    #[test]
    fn test_glider_translates_one_cell_diagonally_every_four_steps() {
        let glider = presets::glider();
        let mut current = grid_with(&glider, 12, 12, 1, 1);
        for _ in 0..4 {
            current = current.step();
        }
        assert_eq!(current, grid_with(&glider, 12, 12, 2, 2));

        // Shape-invariant across a second period as well
        for _ in 0..4 {
            current = current.step();
        }
        assert_eq!(current, grid_with(&glider, 12, 12, 3, 3));
    }
}
