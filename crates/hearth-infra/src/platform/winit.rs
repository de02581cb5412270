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

//! A `winit`-based implementation of the [`Platform`] trait.
//!
//! The `winit` event loop is pumped instead of run, so the engine keeps
//! ownership of its frame loop.

use super::input::translate_window_event;
use hearth_core::platform::{
    Platform, PlatformError, PlatformEvent, PlatformWindowHandle, WindowDescriptor, WindowId,
    WindowState,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId as WinitWindowId};

/// Desktop windowing backed by `winit`.
pub struct WinitPlatform {
    event_loop: EventLoop<()>,
    state: PlatformState,
    started: Instant,
}

/// A window owned by the platform, plus the flags `winit` reports as events.
struct TrackedWindow {
    window: Arc<Window>,
    occluded: bool,
    focused: bool,
    minimized: bool,
}

impl TrackedWindow {
    fn is_minimized(&self) -> bool {
        let size = self.window.inner_size();
        self.window.is_minimized().unwrap_or(false)
            || self.occluded
            || size.width == 0
            || size.height == 0
    }
}

/// The `winit` application handler. Windows can only be created from inside
/// the event loop, so requests are queued and served on the next pump.
#[derive(Default)]
struct PlatformState {
    windows: HashMap<WindowId, TrackedWindow>,
    by_winit_id: HashMap<WinitWindowId, WindowId>,
    main_window: Option<WindowId>,
    next_id: u64,
    requests: Vec<(WindowId, WindowDescriptor)>,
    failures: HashMap<WindowId, String>,
    events: VecDeque<PlatformEvent>,
    exited: bool,
}

impl PlatformState {
    fn create_requested_windows(&mut self, event_loop: &ActiveEventLoop) {
        for (id, descriptor) in std::mem::take(&mut self.requests) {
            let attributes = Window::default_attributes()
                .with_title(descriptor.title.as_str())
                .with_inner_size(LogicalSize::new(descriptor.width, descriptor.height))
                .with_resizable(descriptor.resizable)
                .with_visible(true);

            match event_loop.create_window(attributes) {
                Ok(window) => {
                    log::info!(
                        "Window '{}' created ({id}, {}x{}).",
                        descriptor.title,
                        descriptor.width,
                        descriptor.height
                    );
                    self.by_winit_id.insert(window.id(), id);
                    self.windows.insert(
                        id,
                        TrackedWindow {
                            focused: window.has_focus(),
                            window: Arc::new(window),
                            occluded: false,
                            minimized: false,
                        },
                    );
                    self.main_window.get_or_insert(id);
                }
                Err(e) => {
                    log::error!("Failed to create window '{}': {e}", descriptor.title);
                    self.failures.insert(id, e.to_string());
                }
            }
        }
    }

    /// Queues a `Minimized` or `Restored` event when the window's derived
    /// minimized state changed.
    fn track_minimized(&mut self, id: WindowId) {
        let Some(tracked) = self.windows.get_mut(&id) else {
            return;
        };
        let minimized = tracked.is_minimized();
        if minimized != tracked.minimized {
            tracked.minimized = minimized;
            self.events.push_back(if minimized {
                PlatformEvent::Minimized { window: id }
            } else {
                PlatformEvent::Restored { window: id }
            });
        }
    }
}

impl ApplicationHandler for PlatformState {
    fn new_events(&mut self, event_loop: &ActiveEventLoop, _cause: StartCause) {
        self.create_requested_windows(event_loop);
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);
        self.create_requested_windows(event_loop);
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WinitWindowId,
        event: WindowEvent,
    ) {
        let Some(&id) = self.by_winit_id.get(&window_id) else {
            return;
        };

        if let Some(tracked) = self.windows.get_mut(&id) {
            match event {
                WindowEvent::Occluded(occluded) => tracked.occluded = occluded,
                WindowEvent::Focused(focused) => tracked.focused = focused,
                _ => {}
            }
        }

        if let Some(translated) = translate_window_event(id, &event) {
            self.events.push_back(translated);
        }
        self.track_minimized(id);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.create_requested_windows(event_loop);
    }
}

impl WinitPlatform {
    /// Creates the native event loop. Only one may exist per process.
    ///
    /// # Errors
    /// [`PlatformError::EventLoop`] if `winit` cannot create the event loop
    /// (no display server, or an event loop already exists).
    pub fn new() -> Result<Self, PlatformError> {
        let event_loop = EventLoop::new().map_err(|e| PlatformError::EventLoop(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);
        log::info!("Winit event loop created.");
        Ok(Self {
            event_loop,
            state: PlatformState {
                next_id: 1,
                ..PlatformState::default()
            },
            started: Instant::now(),
        })
    }

    fn pump(&mut self) {
        if self.state.exited {
            return;
        }
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.state);
        if let PumpStatus::Exit(code) = status {
            log::info!("Winit event loop exited with code {code}.");
            self.state.exited = true;
            self.state.events.push_back(PlatformEvent::Quit);
        }
    }
}

impl Platform for WinitPlatform {
    fn create_window(&mut self, descriptor: &WindowDescriptor) -> Result<WindowId, PlatformError> {
        let id = WindowId(self.state.next_id);
        self.state.next_id += 1;
        self.state.requests.push((id, descriptor.clone()));
        self.pump();

        if self.state.windows.contains_key(&id) {
            return Ok(id);
        }
        self.state.requests.retain(|(pending, _)| *pending != id);
        let details = self
            .state
            .failures
            .remove(&id)
            .unwrap_or_else(|| "the event loop did not serve the request".to_string());
        Err(PlatformError::WindowCreation {
            title: descriptor.title.clone(),
            details,
        })
    }

    fn destroy_window(&mut self, id: WindowId) -> bool {
        let Some(tracked) = self.state.windows.remove(&id) else {
            return false;
        };
        self.state.by_winit_id.remove(&tracked.window.id());
        if self.state.main_window == Some(id) {
            self.state.main_window = None;
        }
        log::info!("Window {id} destroyed.");
        true
    }

    fn main_window(&self) -> Option<WindowId> {
        self.state.main_window
    }

    fn window_size(&self, id: WindowId) -> Option<(u32, u32)> {
        self.state.windows.get(&id).map(|tracked| {
            let size = tracked.window.inner_size();
            (size.width, size.height)
        })
    }

    fn window_state(&self, id: WindowId) -> Option<WindowState> {
        self.state.windows.get(&id).map(|tracked| WindowState {
            minimized: tracked.is_minimized(),
            focused: tracked.focused,
            visible: tracked.window.is_visible().unwrap_or(true),
        })
    }

    fn ticks(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn poll_events(&mut self) -> Vec<PlatformEvent> {
        self.pump();
        self.state.events.drain(..).collect()
    }

    fn window_handle(&self, id: WindowId) -> Option<PlatformWindowHandle> {
        self.state
            .windows
            .get(&id)
            .map(|tracked| tracked.window.clone() as PlatformWindowHandle)
    }
}

impl std::fmt::Debug for WinitPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WinitPlatform")
            .field("windows", &self.state.windows.len())
            .field("main_window", &self.state.main_window)
            .finish_non_exhaustive()
    }
}
