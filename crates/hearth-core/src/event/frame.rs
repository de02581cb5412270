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

//! Per-frame phase events.
//!
//! Every rendered tick publishes the phases in a fixed order, each carrying the
//! same elapsed time:
//!
//! 1. [`FrameBegin`]
//! 2. [`FrameUpdate`]: CPU-side preparation for this frame
//! 3. [`FrameUiRender`]: overlay content is built before any geometry is submitted
//! 4. [`FrameRender`]: GPU work, relying on this frame's update having completed
//! 5. [`FrameEnd`]

use super::EventBus;

/// Start of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameBegin {
    /// Seconds elapsed since the previous tick.
    pub delta_time: f32,
}

/// CPU-side update phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUpdate {
    /// Seconds elapsed since the previous tick.
    pub delta_time: f32,
}

/// Immediate-mode UI construction phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUiRender {
    /// Seconds elapsed since the previous tick.
    pub delta_time: f32,
}

/// GPU submission phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRender {
    /// Seconds elapsed since the previous tick.
    pub delta_time: f32,
}

/// End of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameEnd {
    /// Seconds elapsed since the previous tick.
    pub delta_time: f32,
}

/// The five phases, in the order they are published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramePhase {
    /// [`FrameBegin`]
    Begin,
    /// [`FrameUpdate`]
    Update,
    /// [`FrameUiRender`]
    UiRender,
    /// [`FrameRender`]
    Render,
    /// [`FrameEnd`]
    End,
}

impl FramePhase {
    /// All phases in protocol order.
    pub const ALL: [FramePhase; 5] = [
        FramePhase::Begin,
        FramePhase::Update,
        FramePhase::UiRender,
        FramePhase::Render,
        FramePhase::End,
    ];

    /// Publishes the event of this phase on `bus`.
    ///
    /// ## Returns
    /// The number of subscribers that received it.
    pub fn publish(self, bus: &EventBus, delta_time: f32) -> usize {
        match self {
            FramePhase::Begin => bus.publish(&FrameBegin { delta_time }),
            FramePhase::Update => bus.publish(&FrameUpdate { delta_time }),
            FramePhase::UiRender => bus.publish(&FrameUiRender { delta_time }),
            FramePhase::Render => bus.publish(&FrameRender { delta_time }),
            FramePhase::End => bus.publish(&FrameEnd { delta_time }),
        }
    }
}

/// Publishes the five phase events in order, all with `delta_time`.
pub fn publish_frame_phases(bus: &EventBus, delta_time: f32) {
    for phase in FramePhase::ALL {
        phase.publish(bus, delta_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn phases_are_published_in_protocol_order() {
        let bus = EventBus::new();
        let seen: Arc<Mutex<Vec<(FramePhase, f32)>>> = Arc::default();

        // Subscribe in reverse to make sure the order comes from the publisher.
        let log = seen.clone();
        bus.subscribe(move |e: &FrameEnd| {
            log.lock().unwrap().push((FramePhase::End, e.delta_time))
        });
        let log = seen.clone();
        bus.subscribe(move |e: &FrameRender| {
            log.lock().unwrap().push((FramePhase::Render, e.delta_time))
        });
        let log = seen.clone();
        bus.subscribe(move |e: &FrameUiRender| {
            log.lock().unwrap().push((FramePhase::UiRender, e.delta_time))
        });
        let log = seen.clone();
        bus.subscribe(move |e: &FrameUpdate| {
            log.lock().unwrap().push((FramePhase::Update, e.delta_time))
        });
        let log = seen.clone();
        bus.subscribe(move |e: &FrameBegin| {
            log.lock().unwrap().push((FramePhase::Begin, e.delta_time))
        });

        publish_frame_phases(&bus, 0.016);

        let expected: Vec<_> = FramePhase::ALL.iter().map(|p| (*p, 0.016)).collect();
        assert_eq!(*seen.lock().unwrap(), expected);
    }

    #[test]
    fn phase_without_subscribers_is_noop() {
        let bus = EventBus::new();
        assert_eq!(FramePhase::Render.publish(&bus, 1.0), 0);
    }
}
