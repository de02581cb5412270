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

//! Periodic frame-time summary.

use hearth_core::event::{EventBus, FrameEnd, OwnerId};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// One summary of the frames seen during an interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsReport {
    /// Frames in the interval.
    pub frames: u32,
    /// Sum of the frames' delta times, in seconds.
    pub elapsed_secs: f32,
    /// Mean frame time in milliseconds.
    pub average_frame_ms: f32,
    /// Mean frames per second.
    pub fps: f32,
}

/// Subscribes to [`FrameEnd`] and logs a [`StatsReport`] every interval.
pub struct FrameStats {
    state: Arc<StatsState>,
    bus: Arc<EventBus>,
}

struct StatsState {
    interval_secs: f32,
    window: Mutex<StatsWindow>,
}

#[derive(Default)]
struct StatsWindow {
    frames: u32,
    elapsed_secs: f32,
    total_frames: u64,
    last_report: Option<StatsReport>,
}

impl FrameStats {
    /// Creates the statistics service and subscribes it to `bus`.
    pub fn new(bus: Arc<EventBus>, interval: Duration) -> Self {
        let state = Arc::new(StatsState {
            interval_secs: interval.as_secs_f32(),
            window: Mutex::new(StatsWindow::default()),
        });
        bus.subscribe_method(&state, StatsState::on_frame_end);
        Self { state, bus }
    }

    /// Frames seen since creation.
    pub fn total_frames(&self) -> u64 {
        self.state.lock().total_frames
    }

    /// The most recent completed interval, if any.
    pub fn last_report(&self) -> Option<StatsReport> {
        self.state.lock().last_report
    }
}

impl StatsState {
    fn lock(&self) -> std::sync::MutexGuard<'_, StatsWindow> {
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn on_frame_end(&self, event: &FrameEnd) {
        let mut window = self.lock();
        window.frames += 1;
        window.total_frames += 1;
        window.elapsed_secs += event.delta_time;

        if window.elapsed_secs >= self.interval_secs && window.elapsed_secs > 0.0 {
            let average = window.elapsed_secs / window.frames as f32;
            let report = StatsReport {
                frames: window.frames,
                elapsed_secs: window.elapsed_secs,
                average_frame_ms: average * 1000.0,
                fps: 1.0 / average,
            };
            log::info!(
                "{} frames in {:.1}s: {:.3} ms/frame ({:.1} FPS)",
                report.frames,
                report.elapsed_secs,
                report.average_frame_ms,
                report.fps
            );
            window.last_report = Some(report);
            window.frames = 0;
            window.elapsed_secs = 0.0;
        }
    }
}

impl Drop for FrameStats {
    fn drop(&mut self) {
        self.bus.unsubscribe_owner(OwnerId::of(self.state.as_ref()));
        log::debug!("FrameStats: {} frame(s) observed.", self.total_frames());
    }
}
