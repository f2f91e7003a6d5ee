/// Default rendering size of one cell, in pixels
pub const DEFAULT_CELL_SIZE: u32 = 10;
/// Default tick cadence, in generations per second
pub const DEFAULT_SPEED: f64 = 10.0;
/// Default seeding identifier
pub const DEFAULT_SEED: &str = "default";

/// Settings owned by the engine and mutated only through its operations.
/// `rows`/`columns` default to zero so the first `init` has to supply them.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOptions {
    pub rows: usize,
    pub columns: usize,
    pub cell_size: u32,
    pub seed: String,
    pub speed: f64,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            rows: 0,
            columns: 0,
            cell_size: DEFAULT_CELL_SIZE,
            seed: DEFAULT_SEED.to_owned(),
            speed: DEFAULT_SPEED,
        }
    }
}

/// Partial options accepted by `init`. Unset fields retain the engine's
/// current values (or the defaults on first initialization).
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    pub rows: Option<usize>,
    pub columns: Option<usize>,
    pub cell_size: Option<u32>,
    pub seed: Option<String>,
}

impl InitOptions {
    /// Merge these partial options over the current ones
    pub fn merge_over(&self, current: &SimulationOptions) -> SimulationOptions {
        SimulationOptions {
            rows: self.rows.unwrap_or(current.rows),
            columns: self.columns.unwrap_or(current.columns),
            cell_size: self.cell_size.unwrap_or(current.cell_size),
            seed: self.seed.clone().unwrap_or_else(|| current.seed.clone()),
            speed: current.speed,
        }
    }
}

/// Immutable view of engine state handed to listeners on every change.
/// Built after the mutation it describes has been committed.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub paused: bool,
    pub generation: u64,
    pub options: SimulationOptions,
}
