// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The per-tick driver: drain platform input, then publish the frame phases.

use crate::event::{publish_frame_phases, EventBus};
use crate::platform::{Platform, PlatformEvent};
use std::time::Duration;

/// Default pause between ticks while the main window is minimized.
pub const DEFAULT_IDLE_DELAY: Duration = Duration::from_millis(10);

/// What a single [`FrameLoop::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Input was drained and all five phase events were published.
    Rendered,
    /// The main window is minimized: input was drained, no phase was published.
    Suspended,
}

/// Drives one frame per [`tick`](FrameLoop::tick) until a quit is requested.
#[derive(Debug)]
pub struct FrameLoop {
    running: bool,
    last_ticks: Option<u64>,
    idle_delay: Duration,
    frame_count: u64,
}

impl FrameLoop {
    /// Creates a running loop with the [`DEFAULT_IDLE_DELAY`].
    pub fn new() -> Self {
        Self {
            running: true,
            last_ticks: None,
            idle_delay: DEFAULT_IDLE_DELAY,
            frame_count: 0,
        }
    }

    /// Sets the pause applied to suspended ticks.
    pub fn with_idle_delay(mut self, idle_delay: Duration) -> Self {
        self.idle_delay = idle_delay;
        self
    }

    /// Returns `false` once a quit or a main-window close was observed.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stops the loop after the current tick.
    pub fn request_exit(&mut self) {
        self.running = false;
    }

    /// Number of ticks that published the phase events.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Runs one iteration.
    ///
    /// Every polled [`PlatformEvent`] is published before any phase event. A
    /// [`PlatformEvent::Quit`], or a close request for the main window, stops
    /// the loop once this tick has finished its phases.
    pub fn tick(&mut self, platform: &mut dyn Platform, bus: &EventBus) -> TickOutcome {
        let now = platform.ticks();
        let delta_time = match self.last_ticks {
            Some(last) => now.saturating_sub(last) as f32 / 1000.0,
            None => 0.0,
        };
        self.last_ticks = Some(now);

        let main_window = platform.main_window();
        for event in platform.poll_events() {
            bus.publish(&event);
            match event {
                PlatformEvent::Quit => {
                    log::info!("Quit requested, stopping after this frame.");
                    self.running = false;
                }
                PlatformEvent::CloseRequested { window } if Some(window) == main_window => {
                    log::info!("Main window close requested, stopping after this frame.");
                    self.running = false;
                }
                _ => {}
            }
        }

        if platform.is_main_window_minimized() {
            if !self.idle_delay.is_zero() {
                std::thread::sleep(self.idle_delay);
            }
            return TickOutcome::Suspended;
        }

        publish_frame_phases(bus, delta_time);
        self.frame_count += 1;
        TickOutcome::Rendered
    }

    /// Ticks until the loop stops.
    pub fn run(&mut self, platform: &mut dyn Platform, bus: &EventBus) {
        log::info!("Entering frame loop.");
        while self.running {
            self.tick(platform, bus);
        }
        log::info!("Frame loop finished after {} frame(s).", self.frame_count);
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}
