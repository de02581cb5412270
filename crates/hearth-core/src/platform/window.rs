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

//! Window identities, descriptors and the [`Platform`] contract.

use super::{PlatformError, PlatformEvent};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::fmt;
use std::sync::Arc;

/// Combines the windowing handle traits required by graphics backends into a
/// single trait usable as a trait object.
pub trait WindowHandle: HasWindowHandle + HasDisplayHandle {}

impl<T: HasWindowHandle + HasDisplayHandle> WindowHandle for T {}

/// A thread-safe, reference-counted handle to a native window, used by the
/// renderer to create a surface without knowing the windowing backend.
pub type PlatformWindowHandle = Arc<dyn WindowHandle + Send + Sync>;

/// Identifies one window of a [`Platform`]; usable as a map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// Parameters for [`Platform::create_window`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowDescriptor {
    /// Title bar text.
    pub title: String,
    /// Initial inner width in logical pixels.
    pub width: u32,
    /// Initial inner height in logical pixels.
    pub height: u32,
    /// Whether the user may resize the window.
    pub resizable: bool,
}

impl WindowDescriptor {
    /// Creates a resizable window descriptor.
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            resizable: true,
        }
    }
}

impl Default for WindowDescriptor {
    fn default() -> Self {
        Self::new("Hearth", 1280, 720)
    }
}

/// Visual state flags of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowState {
    /// Iconified, occluded or collapsed to a zero-sized area.
    pub minimized: bool,
    /// Holds keyboard focus.
    pub focused: bool,
    /// Shown on screen.
    pub visible: bool,
}

/// The windowing collaborator driven by the frame loop.
///
/// Any backend (winit, SDL, a headless fake...) implements this trait to
/// provide windows, a monotonic clock and polled input.
pub trait Platform {
    /// Creates a window. The first window created becomes the main window.
    fn create_window(&mut self, descriptor: &WindowDescriptor) -> Result<WindowId, PlatformError>;

    /// Destroys a window. Returns `false` if `id` is unknown.
    fn destroy_window(&mut self, id: WindowId) -> bool;

    /// Returns the main window, if one was created.
    fn main_window(&self) -> Option<WindowId>;

    /// Returns the physical inner size `(width, height)` of a window.
    fn window_size(&self, id: WindowId) -> Option<(u32, u32)>;

    /// Returns the visual state flags of a window.
    fn window_state(&self, id: WindowId) -> Option<WindowState>;

    /// Milliseconds elapsed since the platform was created. Monotonic.
    fn ticks(&self) -> u64;

    /// Drains every pending platform record, translated to engine events.
    fn poll_events(&mut self) -> Vec<PlatformEvent>;

    /// Returns a native handle for surface creation.
    fn window_handle(&self, id: WindowId) -> Option<PlatformWindowHandle>;

    /// Returns `true` if the main window exists and is minimized.
    fn is_main_window_minimized(&self) -> bool {
        self.main_window()
            .and_then(|id| self.window_state(id))
            .is_some_and(|state| state.minimized)
    }
}
