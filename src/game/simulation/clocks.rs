/// Pausable tick sources that gate simulation systems.
///
/// Every step, [`advance_clocks`] ticks each source in registration order. A
/// source fires when it is not paused, its parent fired this step, and its
/// interval timer (if any) finished. Systems opt in with [`clock_fired`].

use bevy::prelude::*;
use std::time::Duration;

use super::resources::{SimConfig, SimTick};
use crate::game::GameState;

/// Handle to a registered tick source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockId(usize);

impl ClockId {
    /// Fires every step while gameplay runs. Physics is gated on it.
    pub const RUNNING: ClockId = ClockId(0);
    /// Fires every step regardless of game state.
    pub const MENU: ClockId = ClockId(1);
    /// Fires every 100 ms of running time.
    pub const INTERVAL: ClockId = ClockId(2);
    /// Pursuer spawning cadence, child of `RUNNING`.
    pub const SPAWN: ClockId = ClockId(3);
}

#[derive(Debug, Clone)]
pub struct TickSource {
    pub name: &'static str,
    timer: Option<Timer>,
    parent: Option<ClockId>,
    paused: bool,
    fired: bool,
}

#[derive(Resource, Debug, Clone)]
pub struct TickSources {
    sources: Vec<TickSource>,
}

impl Default for TickSources {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

impl TickSources {
    pub fn new(spawn_interval: Duration) -> Self {
        let mut sources = Self { sources: Vec::new() };
        sources.register("running", None, None);
        sources.register("menu", None, None);
        sources.register("interval", Some(Duration::from_millis(100)), Some(ClockId::RUNNING));
        sources.register("spawn", Some(spawn_interval), Some(ClockId::RUNNING));
        sources
    }

    /// Add a source. A parent must already be registered, which keeps a single
    /// in-order pass sufficient to resolve the hierarchy.
    pub fn register(&mut self, name: &'static str, interval: Option<Duration>, parent: Option<ClockId>) -> ClockId {
        let id = ClockId(self.sources.len());
        let parent = parent.filter(|p| {
            let known = p.0 < id.0;
            if !known {
                warn!("[CLOCK] Ignoring unknown parent {:?} for '{}'", p, name);
            }
            known
        });

        self.sources.push(TickSource {
            name,
            timer: interval.map(|d| Timer::new(d, TimerMode::Repeating)),
            parent,
            paused: false,
            fired: false,
        });
        id
    }

    pub fn set_interval(&mut self, id: ClockId, interval: Duration) {
        if let Some(source) = self.sources.get_mut(id.0) {
            source.timer = Some(Timer::new(interval, TimerMode::Repeating));
        }
    }

    pub fn pause(&mut self, id: ClockId) {
        if let Some(source) = self.sources.get_mut(id.0) {
            source.paused = true;
            source.fired = false;
        }
    }

    pub fn resume(&mut self, id: ClockId) {
        if let Some(source) = self.sources.get_mut(id.0) {
            source.paused = false;
        }
    }

    pub fn is_paused(&self, id: ClockId) -> bool {
        self.sources.get(id.0).is_some_and(|s| s.paused)
    }

    /// Whether the source fired during the latest [`advance`](Self::advance).
    pub fn fired(&self, id: ClockId) -> bool {
        self.sources.get(id.0).is_some_and(|s| s.fired)
    }

    pub fn advance(&mut self, delta: Duration) {
        for i in 0..self.sources.len() {
            let parent_fired = match self.sources[i].parent {
                Some(parent) => self.sources[parent.0].fired,
                None => true,
            };

            let source = &mut self.sources[i];
            source.fired = false;
            if source.paused || !parent_fired {
                continue;
            }

            source.fired = match source.timer.as_mut() {
                Some(timer) => {
                    timer.tick(delta);
                    timer.just_finished()
                }
                None => true,
            };
        }
    }
}

/// Run condition: the given tick source fired this step.
pub fn clock_fired(id: ClockId) -> impl FnMut(Option<Res<TickSources>>) -> bool + Clone {
    move |sources: Option<Res<TickSources>>| sources.is_some_and(|s| s.fired(id))
}

// ============================================================================
// Systems
// ============================================================================

/// First system of every step.
pub fn advance_clocks(mut sources: ResMut<TickSources>, config: Res<SimConfig>) {
    sources.advance(Duration::from_secs_f64(1.0 / config.tick_rate));
}

pub fn increment_sim_tick(mut tick: ResMut<SimTick>) {
    tick.increment();
}

/// `OnEnter(GameState::Running)`.
pub fn resume_running_clock(mut sources: ResMut<TickSources>) {
    sources.resume(ClockId::RUNNING);
    info!("[CLOCK] Simulation resumed");
}

/// `OnExit(GameState::Running)`.
pub fn pause_running_clock(mut sources: ResMut<TickSources>, state: Option<Res<State<GameState>>>) {
    sources.pause(ClockId::RUNNING);
    info!("[CLOCK] Simulation paused (leaving {:?})", state.map(|s| *s.get()));
}
