mod engine;
mod notifier;
mod options;
mod scheduler;

pub use engine::{Engine, EngineError, EngineState};
pub use notifier::{ListenerHandle, Notifier, StateListener};
pub use options::{
    DEFAULT_CELL_SIZE, DEFAULT_SEED, DEFAULT_SPEED, EngineSnapshot, InitOptions, SimulationOptions,
};
pub use scheduler::{IntervalScheduler, ManualScheduler, Scheduler, TickHandle};
