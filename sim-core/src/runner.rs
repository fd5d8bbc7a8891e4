//! Background simulation loop.
//!
//! The simulation lives behind an `Arc<parking_lot::Mutex<_>>`. The runner
//! thread holds the lock for exactly one tick at a time; the viewer takes it
//! briefly to read positions or to apply drag and reset commands, so it
//! never sees a half-updated graph.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use tracing::{error, info};

use crate::simulation::Simulation;

pub type SharedSimulation = Arc<Mutex<Simulation>>;

#[derive(Debug, Default)]
struct Flags {
    stop: AtomicBool,
    paused: AtomicBool,
    /// Wall time of the last tick, in microseconds.
    last_tick_us: AtomicU64,
}

/// Owns the simulation thread. Dropping it stops and joins the thread.
#[derive(Debug)]
pub struct Runner {
    shared: SharedSimulation,
    flags: Arc<Flags>,
    handle: Option<JoinHandle<()>>,
}

impl Runner {
    /// Moves `sim` behind a lock and starts ticking it at the configured cadence.
    pub fn spawn(sim: Simulation) -> std::io::Result<Self> {
        let shared = Arc::new(Mutex::new(sim));
        let flags = Arc::new(Flags::default());

        let handle = thread::Builder::new().name("simulation".into()).spawn({
            let shared = Arc::clone(&shared);
            let flags = Arc::clone(&flags);
            move || run_loop(&shared, &flags)
        })?;
        info!("simulation runner started");

        Ok(Self {
            shared,
            flags,
            handle: Some(handle),
        })
    }

    /// Handle to the lock-guarded simulation.
    pub fn shared(&self) -> &SharedSimulation {
        &self.shared
    }

    pub fn set_paused(&self, paused: bool) {
        self.flags.paused.store(paused, Ordering::Release);
    }

    pub fn is_paused(&self) -> bool {
        self.flags.paused.load(Ordering::Acquire)
    }

    /// How long the most recent tick held the lock.
    pub fn last_tick_duration(&self) -> Duration {
        Duration::from_micros(self.flags.last_tick_us.load(Ordering::Relaxed))
    }

    /// Stops the loop after the in-flight tick and waits for the thread.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.flags.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("simulation thread panicked");
            } else {
                info!("simulation runner stopped");
            }
        }
    }
}

impl Drop for Runner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop(shared: &Mutex<Simulation>, flags: &Flags) {
    let mut last = Instant::now();

    while !flags.stop.load(Ordering::Acquire) {
        let started = Instant::now();

        let interval = {
            let mut sim = shared.lock();
            let cfg = sim.config();
            let interval = Duration::from_millis(cfg.tick_interval_ms);

            if !flags.paused.load(Ordering::Acquire) {
                let dt = cfg.fixed_step.unwrap_or_else(|| {
                    started
                        .duration_since(last)
                        .as_secs_f32()
                        .min(cfg.max_delta_time)
                });
                if let Err(e) = sim.tick(dt) {
                    error!(error = %e, "simulation tick failed");
                }
            }
            interval
        };

        let elapsed = started.elapsed();
        flags
            .last_tick_us
            .store(elapsed.as_micros() as u64, Ordering::Relaxed);
        last = started;

        if let Some(rest) = interval.checked_sub(elapsed) {
            thread::sleep(rest);
        }
    }
}
