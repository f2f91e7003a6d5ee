// Domain layer - grid state and the stepping rule
pub mod domain;

// Application layer - engine, scheduling, notification
pub mod application;

// Infrastructure layer - rendering surfaces
pub mod rendering;

// Re-exports for convenience
pub use application::{
    Engine, EngineError, EngineSnapshot, EngineState, InitOptions, IntervalScheduler,
    ListenerHandle, ManualScheduler, Scheduler, SimulationOptions, TickHandle,
};
pub use domain::{Cell, Grid, InvalidDimensions, Pattern, presets};
pub use rendering::{CanvasSurface, RenderSurface, SurfaceError, SurfaceGeometry};
