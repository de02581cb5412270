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

use hearth_core::event::{EventBus, FrameBegin, FrameEnd, FrameRender, FrameUiRender, FrameUpdate};
use hearth_core::platform::{
    InputEvent, Platform, PlatformError, PlatformEvent, PlatformWindowHandle, WindowDescriptor,
    WindowId, WindowState,
};
use hearth_core::{FrameLoop, TickOutcome};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A scripted platform: every `poll_events` call pops one batch.
#[derive(Default)]
struct FakePlatform {
    windows: Vec<(WindowId, WindowState)>,
    batches: VecDeque<Vec<PlatformEvent>>,
    ticks: u64,
    tick_step: u64,
}

impl FakePlatform {
    fn with_main_window() -> Self {
        let mut platform = Self {
            tick_step: 16,
            ..Self::default()
        };
        platform
            .create_window(&WindowDescriptor::default())
            .expect("fake window creation cannot fail");
        platform
    }

    fn set_minimized(&mut self, minimized: bool) {
        self.windows[0].1.minimized = minimized;
    }
}

impl Platform for FakePlatform {
    fn create_window(&mut self, _: &WindowDescriptor) -> Result<WindowId, PlatformError> {
        let id = WindowId(self.windows.len() as u64 + 1);
        self.windows.push((
            id,
            WindowState {
                minimized: false,
                focused: true,
                visible: true,
            },
        ));
        Ok(id)
    }

    fn destroy_window(&mut self, id: WindowId) -> bool {
        let before = self.windows.len();
        self.windows.retain(|(window, _)| *window != id);
        self.windows.len() != before
    }

    fn main_window(&self) -> Option<WindowId> {
        self.windows.first().map(|(id, _)| *id)
    }

    fn window_size(&self, id: WindowId) -> Option<(u32, u32)> {
        self.window_state(id).map(|_| (1280, 720))
    }

    fn window_state(&self, id: WindowId) -> Option<WindowState> {
        self.windows
            .iter()
            .find(|(window, _)| *window == id)
            .map(|(_, state)| *state)
    }

    fn ticks(&self) -> u64 {
        self.ticks
    }

    fn poll_events(&mut self) -> Vec<PlatformEvent> {
        self.ticks += self.tick_step;
        self.batches.pop_front().unwrap_or_default()
    }

    fn window_handle(&self, _: WindowId) -> Option<PlatformWindowHandle> {
        None
    }
}

type Trace = Arc<Mutex<Vec<String>>>;

fn record_everything(bus: &EventBus) -> Trace {
    let trace = Trace::default();
    let t = trace.clone();
    bus.subscribe(move |event: &PlatformEvent| t.lock().unwrap().push(format!("{event:?}")));
    let t = trace.clone();
    bus.subscribe(move |e: &FrameBegin| t.lock().unwrap().push(format!("begin {}", e.delta_time)));
    let t = trace.clone();
    bus.subscribe(move |e: &FrameUpdate| {
        t.lock().unwrap().push(format!("update {}", e.delta_time))
    });
    let t = trace.clone();
    bus.subscribe(move |e: &FrameUiRender| t.lock().unwrap().push(format!("ui {}", e.delta_time)));
    let t = trace.clone();
    bus.subscribe(move |e: &FrameRender| {
        t.lock().unwrap().push(format!("render {}", e.delta_time))
    });
    let t = trace.clone();
    bus.subscribe(move |e: &FrameEnd| t.lock().unwrap().push(format!("end {}", e.delta_time)));
    trace
}

fn fast_loop() -> FrameLoop {
    FrameLoop::new().with_idle_delay(Duration::ZERO)
}

#[test]
fn test_input_is_published_before_phases_in_protocol_order() {
    // --- 1. ARRANGE ---
    let bus = EventBus::new();
    let trace = record_everything(&bus);
    let mut platform = FakePlatform::with_main_window();
    let window = platform.main_window().unwrap();
    platform.batches.push_back(vec![PlatformEvent::Input {
        window,
        event: InputEvent::KeyPressed {
            key_code: "KeyA".to_string(),
        },
    }]);
    let mut frame_loop = fast_loop();

    // --- 2. ACT ---
    let outcome = frame_loop.tick(&mut platform, &bus);

    // --- 3. ASSERT ---
    assert_eq!(outcome, TickOutcome::Rendered);
    let trace = trace.lock().unwrap();
    assert_eq!(trace.len(), 6);
    assert!(trace[0].starts_with("Input"));
    assert_eq!(trace[1..], ["begin 0", "update 0", "ui 0", "render 0", "end 0"]);
}

#[test]
fn test_delta_time_is_shared_by_all_phases() {
    let bus = EventBus::new();
    let mut platform = FakePlatform::with_main_window();
    let mut frame_loop = fast_loop();
    frame_loop.tick(&mut platform, &bus);

    let trace = record_everything(&bus);
    frame_loop.tick(&mut platform, &bus);

    assert_eq!(
        *trace.lock().unwrap(),
        ["begin 0.016", "update 0.016", "ui 0.016", "render 0.016", "end 0.016"]
    );
    assert_eq!(frame_loop.frame_count(), 2);
}

#[test]
fn test_minimized_window_suspends_phases_but_drains_input() {
    let bus = EventBus::new();
    let trace = record_everything(&bus);
    let mut platform = FakePlatform::with_main_window();
    let window = platform.main_window().unwrap();
    platform.set_minimized(true);
    platform
        .batches
        .push_back(vec![PlatformEvent::Minimized { window }]);
    let mut frame_loop = fast_loop();

    assert_eq!(frame_loop.tick(&mut platform, &bus), TickOutcome::Suspended);
    assert_eq!(frame_loop.tick(&mut platform, &bus), TickOutcome::Suspended);

    assert_eq!(*trace.lock().unwrap(), [format!("Minimized {{ window: {window:?} }}")]);
    assert_eq!(frame_loop.frame_count(), 0);
    assert!(frame_loop.is_running());

    platform.set_minimized(false);
    assert_eq!(frame_loop.tick(&mut platform, &bus), TickOutcome::Rendered);
}

#[test]
fn test_quit_stops_after_current_phases() {
    let bus = EventBus::new();
    let trace = record_everything(&bus);
    let mut platform = FakePlatform::with_main_window();
    platform.batches.push_back(Vec::new());
    platform.batches.push_back(vec![PlatformEvent::Quit]);
    let mut frame_loop = fast_loop();

    frame_loop.run(&mut platform, &bus);

    assert_eq!(frame_loop.frame_count(), 2);
    let trace = trace.lock().unwrap();
    assert_eq!(trace.last().map(String::as_str), Some("end 0.016"));
    assert_eq!(trace.iter().filter(|line| *line == "Quit").count(), 1);
}

#[test]
fn test_closing_main_window_stops_but_other_windows_do_not() {
    let bus = EventBus::new();
    let mut platform = FakePlatform::with_main_window();
    let main = platform.main_window().unwrap();
    let second = platform.create_window(&WindowDescriptor::default()).unwrap();
    platform
        .batches
        .push_back(vec![PlatformEvent::CloseRequested { window: second }]);
    platform
        .batches
        .push_back(vec![PlatformEvent::CloseRequested { window: main }]);
    let mut frame_loop = fast_loop();

    frame_loop.tick(&mut platform, &bus);
    assert!(frame_loop.is_running());
    frame_loop.tick(&mut platform, &bus);
    assert!(!frame_loop.is_running());
}

#[test]
fn test_request_exit_before_run() {
    let bus = EventBus::new();
    let mut platform = FakePlatform::with_main_window();
    let mut frame_loop = fast_loop();
    frame_loop.request_exit();

    frame_loop.run(&mut platform, &bus);

    assert_eq!(frame_loop.frame_count(), 0);
}
