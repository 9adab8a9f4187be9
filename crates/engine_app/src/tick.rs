//! Fixed-timestep tick loop.
//!
//! Each tick advances the [`World`] by one step of `1 / tick_rate` seconds.
//! The loop runs on a tokio interval, so other tasks (e.g. background
//! content reloads) make progress between ticks.

use std::time::{Duration, Instant};

use engine_world::World;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Configuration for the tick loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl TickConfig {
    fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate.max(f64::EPSILON))
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
        }
    }
}

/// Drives a world at a fixed rate.
#[derive(Debug)]
pub struct TickLoop {
    ticks_run: u64,
    config: TickConfig,
    world: World,
}

impl TickLoop {
    /// Create a tick loop around `world`.
    #[must_use]
    pub fn new(config: TickConfig, world: World) -> Self {
        Self {
            ticks_run: 0,
            config,
            world,
        }
    }

    /// Number of ticks run by this loop.
    #[must_use]
    pub fn ticks_run(&self) -> u64 {
        self.ticks_run
    }

    /// Returns a reference to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Give the world back, e.g. for a final shutdown.
    #[must_use]
    pub fn into_world(self) -> World {
        self.world
    }

    fn finished(&self) -> bool {
        self.config.max_ticks > 0 && self.ticks_run >= self.config.max_ticks
    }

    /// Run one tick of `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        let start = Instant::now();
        self.world.tick(dt);
        self.ticks_run += 1;

        debug!(
            tick_id = self.world.tick_id(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "tick complete"
        );
    }

    /// Run the tick loop for the configured number of ticks, or
    /// indefinitely. Other tasks run between ticks.
    pub async fn run_async(&mut self) {
        let tick_duration = self.config.tick_duration();
        let mut interval = tokio::time::interval(tick_duration);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting async tick loop"
        );

        while !self.finished() {
            interval.tick().await;
            let start = Instant::now();
            self.tick(tick_duration.as_secs_f64());

            let elapsed = start.elapsed();
            if elapsed > tick_duration {
                warn!(
                    tick_id = self.world.tick_id(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }

        info!(ticks = self.ticks_run, "tick loop complete");
    }
}
