use macroquad::prelude::*;
use thiserror::Error;

use crate::domain::Grid;

/// Rendering failures. `DimensionMismatch` means the grid handed to
/// `render` no longer agrees with the configured geometry; the engine
/// treats that as fatal because it indicates corrupted simulation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("output target unavailable")]
    Unavailable,
    #[error(
        "grid {grid_columns}x{grid_rows} does not match surface capacity {columns}x{rows}"
    )]
    DimensionMismatch {
        grid_columns: usize,
        grid_rows: usize,
        columns: usize,
        rows: usize,
    },
}

/// Output geometry in pixels. `cell_size` is the single source of truth
/// both sides use: the engine derives pixel extents from cell counts via
/// `for_cells`, and callers derive cell counts from a viewport via
/// `cell_capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceGeometry {
    pub width: u32,
    pub height: u32,
    pub cell_size: u32,
}

impl SurfaceGeometry {
    /// Exact pixel extents for a grid of `columns` x `rows` cells
    pub fn for_cells(columns: usize, rows: usize, cell_size: u32) -> Self {
        Self {
            width: columns as u32 * cell_size,
            height: rows as u32 * cell_size,
            cell_size,
        }
    }

    /// How many whole cells fit this geometry, as (columns, rows)
    pub fn cell_capacity(&self) -> (usize, usize) {
        if self.cell_size == 0 {
            return (0, 0);
        }
        (
            (self.width / self.cell_size) as usize,
            (self.height / self.cell_size) as usize,
        )
    }
}

/// Maps a grid snapshot to pixels. Implementations hold no simulation
/// logic and must not retain the grid past the `render` call.
pub trait RenderSurface {
    /// (Re)configure output dimensions and drop any prior content.
    /// Must validate before mutating: on error the previous configuration
    /// stays in effect.
    fn init(&mut self, geometry: SurfaceGeometry) -> Result<(), SurfaceError>;

    /// Draw one full frame: every live cell as a filled `cell_size`
    /// square at its grid-relative offset, dead cells as background.
    fn render(&mut self, grid: &Grid) -> Result<(), SurfaceError>;
}

/// Macroquad-backed surface drawing into the current window
pub struct CanvasSurface {
    geometry: Option<SurfaceGeometry>,
    alive_color: Color,
    background: Color,
}

impl CanvasSurface {
    pub fn new() -> Self {
        Self {
            geometry: None,
            alive_color: Color::from_rgba(0, 255, 150, 255),
            background: BLACK,
        }
    }

    pub fn geometry(&self) -> Option<SurfaceGeometry> {
        self.geometry
    }
}

impl Default for CanvasSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for CanvasSurface {
    fn init(&mut self, geometry: SurfaceGeometry) -> Result<(), SurfaceError> {
        if geometry.width == 0 || geometry.height == 0 || geometry.cell_size == 0 {
            return Err(SurfaceError::Unavailable);
        }
        self.geometry = Some(geometry);
        clear_background(self.background);
        Ok(())
    }

    fn render(&mut self, grid: &Grid) -> Result<(), SurfaceError> {
        let geometry = self.geometry.ok_or(SurfaceError::Unavailable)?;
        let (columns, rows) = geometry.cell_capacity();
        let (grid_columns, grid_rows) = grid.dimensions();
        if (grid_columns, grid_rows) != (columns, rows) {
            return Err(SurfaceError::DimensionMismatch {
                grid_columns,
                grid_rows,
                columns,
                rows,
            });
        }

        let cell_size = geometry.cell_size as f32;
        clear_background(self.background);
        for (x, y, cell) in grid.iter_cells() {
            if cell.is_alive() {
                draw_rectangle(
                    x as f32 * cell_size,
                    y as f32 * cell_size,
                    cell_size,
                    cell_size,
                    self.alive_color,
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_round_trips_cell_counts() {
        let geometry = SurfaceGeometry::for_cells(40, 25, 8);
        assert_eq!((geometry.width, geometry.height), (320, 200));
        assert_eq!(geometry.cell_capacity(), (40, 25));
    }

    #[test]
    fn test_capacity_floors_partial_cells() {
        let geometry = SurfaceGeometry {
            width: 109,
            height: 57,
            cell_size: 10,
        };
        assert_eq!(geometry.cell_capacity(), (10, 5));
    }

    #[test]
    fn test_zero_cell_size_has_no_capacity() {
        let geometry = SurfaceGeometry {
            width: 100,
            height: 100,
            cell_size: 0,
        };
        assert_eq!(geometry.cell_capacity(), (0, 0));
    }
}
