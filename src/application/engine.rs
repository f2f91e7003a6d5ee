use std::time::Duration;

use log::{debug, error};
use thiserror::Error;

use crate::domain::{Grid, InvalidDimensions};
use crate::rendering::{RenderSurface, SurfaceError, SurfaceGeometry};

use super::notifier::{ListenerHandle, Notifier};
use super::options::{EngineSnapshot, InitOptions, SimulationOptions};
use super::scheduler::{IntervalScheduler, Scheduler, TickHandle};

/// Grids at or above this many cells step with rayon
const PARALLEL_STEP_THRESHOLD: usize = 100 * 100;

/// Failures surfaced by engine operations. All are recoverable by the
/// caller; nothing is retried automatically.
#[derive(Debug, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    InvalidDimensions(#[from] InvalidDimensions),
    #[error("option {name} must be positive, got {value}")]
    InvalidOption { name: &'static str, value: f64 },
    #[error("engine is not ready for this operation")]
    NotReady,
    #[error("rendering surface unavailable")]
    RenderingUnavailable(#[source] SurfaceError),
}

/// Engine lifecycle. `Failed` is entered on a fatal tick failure
/// (grid/surface dimension mismatch) and left only through `init`;
/// `Disposed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Ready,
    Running,
    Failed,
    Disposed,
}

struct Playback {
    paused: bool,
    handle: Option<TickHandle>,
}

/// The simulation engine: owns the grid, the options, the playback state,
/// the tick scheduler, and the listener registry, and keeps the rendering
/// surface synchronized with the simulation.
///
/// Every operation takes `&mut self`, so operations, tick execution, and
/// listener callbacks are serialized on one logical thread of control;
/// overlapping initializations or ticks are unrepresentable. The host
/// drives the tick loop by calling [`Engine::pump`] from its frame loop.
pub struct Engine<S: RenderSurface, K: Scheduler = IntervalScheduler> {
    surface: Option<S>,
    scheduler: K,
    options: SimulationOptions,
    grid: Option<Grid>,
    generation: u64,
    state: EngineState,
    playback: Playback,
    notifier: Notifier,
}

impl<S: RenderSurface> Engine<S> {
    /// Engine over a surface, ticking on wall-clock time
    pub fn new(surface: S) -> Self {
        Self::with_scheduler(surface, IntervalScheduler::new())
    }
}

impl<S: RenderSurface, K: Scheduler> Engine<S, K> {
    /// Engine over a surface with a caller-supplied tick scheduler
    pub fn with_scheduler(surface: S, scheduler: K) -> Self {
        Self {
            surface: Some(surface),
            scheduler,
            options: SimulationOptions::default(),
            grid: None,
            generation: 0,
            state: EngineState::Uninitialized,
            playback: Playback {
                paused: true,
                handle: None,
            },
            notifier: Notifier::new(),
        }
    }

    /// (Re)initialize: merge `opts` over the current options, build and
    /// seed a fresh grid, reconfigure the surface, and land in `Ready`
    /// (paused) with the generation counter at zero.
    ///
    /// All failure paths run before any engine state is touched, so a
    /// failed reinit leaves the previous grid, options, and tick loop
    /// fully intact.
    pub fn init(&mut self, opts: InitOptions) -> Result<(), EngineError> {
        if self.state == EngineState::Disposed {
            return Err(EngineError::NotReady);
        }
        let merged = opts.merge_over(&self.options);
        if merged.cell_size == 0 {
            return Err(EngineError::InvalidOption {
                name: "cell_size",
                value: 0.0,
            });
        }
        let grid = Grid::new(merged.columns, merged.rows)?.reseed(&merged.seed);
        let surface = self.surface.as_mut().ok_or(EngineError::NotReady)?;
        surface
            .init(SurfaceGeometry::for_cells(
                merged.columns,
                merged.rows,
                merged.cell_size,
            ))
            .map_err(EngineError::RenderingUnavailable)?;

        self.cancel_active_tick();
        self.options = merged;
        self.grid = Some(grid);
        self.generation = 0;
        self.playback.paused = true;
        self.state = EngineState::Ready;
        debug!(
            "initialized {}x{} cells, seed {:?}",
            self.options.columns, self.options.rows, self.options.seed
        );
        self.render_and_report();
        self.notify();
        Ok(())
    }

    /// Begin (or resume) autonomous ticking. A no-op while `Running`;
    /// never creates a second schedule.
    pub fn start(&mut self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Running => Ok(()),
            EngineState::Ready => {
                let interval = interval_for(self.options.speed);
                self.playback.handle = Some(self.scheduler.schedule_recurring(interval));
                self.playback.paused = false;
                self.state = EngineState::Running;
                debug!("started at {} gen/s", self.options.speed);
                self.notify();
                Ok(())
            }
            _ => Err(EngineError::NotReady),
        }
    }

    /// Stop ticking. Once this returns, no further tick can fire until
    /// `start` is called again. A no-op while already paused.
    pub fn pause(&mut self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Ready => Ok(()),
            EngineState::Running => {
                self.cancel_active_tick();
                self.playback.paused = true;
                self.state = EngineState::Ready;
                debug!("paused at generation {}", self.generation);
                self.notify();
                Ok(())
            }
            _ => Err(EngineError::NotReady),
        }
    }

    /// Update the tick cadence. While `Running` the schedule is replaced
    /// at the new interval; the grid and generation counter are untouched.
    pub fn change_speed(&mut self, speed: f64) -> Result<(), EngineError> {
        if self.state == EngineState::Disposed {
            return Err(EngineError::NotReady);
        }
        if !speed.is_finite() || speed <= 0.0 {
            return Err(EngineError::InvalidOption {
                name: "speed",
                value: speed,
            });
        }
        self.options.speed = speed;
        if self.state == EngineState::Running {
            self.cancel_active_tick();
            self.playback.handle = Some(
                self.scheduler
                    .schedule_recurring(interval_for(speed)),
            );
        }
        debug!("speed changed to {} gen/s", speed);
        self.notify();
        Ok(())
    }

    /// Reseed the existing grid in place. Dimensions, the surface, and
    /// the playback state are untouched: a running simulation keeps
    /// running, stepping from the reseeded pattern.
    pub fn change_seed(&mut self, seed: impl Into<String>) -> Result<(), EngineError> {
        if !matches!(self.state, EngineState::Ready | EngineState::Running) {
            return Err(EngineError::NotReady);
        }
        let Some(grid) = self.grid.take() else {
            return Err(EngineError::NotReady);
        };
        let seed = seed.into();
        self.grid = Some(grid.reseed(&seed));
        self.options.seed = seed;
        self.generation = 0;
        debug!("reseeded with {:?}", self.options.seed);
        self.render_and_report();
        if self.state != EngineState::Failed {
            self.notify();
        }
        Ok(())
    }

    /// Add a state-change listener; returns the handle for `unregister`.
    /// The listener is not invoked at registration time.
    pub fn register_state_changed_listener(
        &mut self,
        listener: impl FnMut(&EngineSnapshot) + 'static,
    ) -> ListenerHandle {
        self.notifier.register(Box::new(listener))
    }

    /// Remove a previously registered listener
    pub fn unregister(&mut self, handle: ListenerHandle) -> bool {
        self.notifier.unregister(handle)
    }

    /// Tear the engine down: cancel any scheduled tick, clear listeners,
    /// drop the grid, and hand the rendering surface back to the caller.
    /// Every subsequent operation fails with `NotReady`.
    pub fn dispose(&mut self) -> Option<S> {
        self.cancel_active_tick();
        self.notifier.clear();
        self.grid = None;
        self.playback.paused = true;
        self.state = EngineState::Disposed;
        debug!("disposed");
        self.surface.take()
    }

    /// Host frame hook: run every tick the scheduler reports due.
    /// Each tick steps the grid, renders the new generation, and
    /// notifies listeners. Non-fatal tick failures are logged and the
    /// loop continues; a grid/surface dimension mismatch is fatal and
    /// parks the engine in `Failed` until the next `init`.
    pub fn pump(&mut self) {
        if self.state != EngineState::Running {
            return;
        }
        let Some(handle) = self.playback.handle else {
            return;
        };
        let due = self.scheduler.due_ticks(handle);
        for _ in 0..due {
            if self.state != EngineState::Running {
                break;
            }
            self.run_tick();
        }
    }

    /// Re-render the current generation, for hosts whose output is
    /// cleared every frame
    pub fn redraw(&mut self) {
        self.render_and_report();
    }

    /// Whether playback is currently paused
    pub fn paused(&self) -> bool {
        self.playback.paused
    }

    /// Generations advanced since the last init or reseed
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn options(&self) -> &SimulationOptions {
        &self.options
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Current generation buffer, if initialized
    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    /// Immutable view of the current options and playback state
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            paused: self.playback.paused,
            generation: self.generation,
            options: self.options.clone(),
        }
    }

    /// Access the tick scheduler, e.g. to advance a `ManualScheduler`
    pub fn scheduler_mut(&mut self) -> &mut K {
        &mut self.scheduler
    }

    fn run_tick(&mut self) {
        let Some(current) = self.grid.as_ref() else {
            return;
        };
        let (width, height) = current.dimensions();
        let next = if width * height >= PARALLEL_STEP_THRESHOLD {
            current.step_parallel()
        } else {
            current.step()
        };
        self.grid = Some(next);
        self.generation += 1;
        self.render_and_report();
        if self.state == EngineState::Running {
            self.notify();
        }
    }

    /// Push the current grid to the surface. Dimension mismatches are
    /// fatal; anything else is reported on the diagnostic channel and
    /// the loop keeps going.
    fn render_and_report(&mut self) {
        let Some(grid) = self.grid.as_ref() else {
            return;
        };
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        match surface.render(grid) {
            Ok(()) => {}
            Err(err @ SurfaceError::DimensionMismatch { .. }) => {
                error!("fatal render failure: {err}");
                self.enter_failed();
            }
            Err(err) => error!("render failed, continuing: {err}"),
        }
    }

    fn enter_failed(&mut self) {
        self.cancel_active_tick();
        self.playback.paused = true;
        self.state = EngineState::Failed;
        self.notify();
    }

    fn cancel_active_tick(&mut self) {
        if let Some(handle) = self.playback.handle.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn notify(&mut self) {
        let snapshot = self.snapshot();
        self.notifier.notify(&snapshot);
    }
}

/// Monotonic speed-to-interval mapping: higher speed, shorter interval.
/// Clamped to a nonzero interval so extreme speeds cannot degenerate
/// into a zero-length schedule.
fn interval_for(speed: f64) -> Duration {
    Duration::from_secs_f64(1.0 / speed).max(Duration::from_nanos(1))
}
