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

//! Provides abstractions over platform-specific functionalities.
//!
//! This module contains the [`Platform`] trait the frame loop drives, the
//! [`PlatformEvent`] values it publishes once per polled record, and the
//! backend-agnostic input types carried by those events.

pub mod input;
pub mod window;

pub use input::{InputEvent, MouseButton};
pub use window::{
    Platform, PlatformWindowHandle, WindowDescriptor, WindowHandle, WindowId, WindowState,
};

/// One polled platform record, translated to an engine event.
///
/// The frame loop publishes every `PlatformEvent` on the event bus as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    /// The application was asked to quit.
    Quit,
    /// The user asked to close a window.
    CloseRequested {
        /// The window to close.
        window: WindowId,
    },
    /// A window's inner area changed size.
    Resized {
        /// The resized window.
        window: WindowId,
        /// New physical width.
        width: u32,
        /// New physical height.
        height: u32,
    },
    /// A window was hidden, occluded or iconified.
    Minimized {
        /// The affected window.
        window: WindowId,
    },
    /// A minimized window became visible again.
    Restored {
        /// The affected window.
        window: WindowId,
    },
    /// A window gained or lost keyboard focus.
    Focused {
        /// The affected window.
        window: WindowId,
        /// `true` when focus was gained.
        focused: bool,
    },
    /// User input targeted at a window.
    Input {
        /// The window that received the input.
        window: WindowId,
        /// The translated input.
        event: InputEvent,
    },
}

impl PlatformEvent {
    /// Returns the window this event concerns, if any.
    pub fn window(&self) -> Option<WindowId> {
        match self {
            PlatformEvent::Quit => None,
            PlatformEvent::CloseRequested { window }
            | PlatformEvent::Resized { window, .. }
            | PlatformEvent::Minimized { window }
            | PlatformEvent::Restored { window }
            | PlatformEvent::Focused { window, .. }
            | PlatformEvent::Input { window, .. } => Some(*window),
        }
    }
}

/// Failures of the windowing collaborator.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The native event loop could not be created or driven.
    #[error("Event loop error: {0}")]
    EventLoop(String),
    /// The native window could not be created.
    #[error("Failed to create window '{title}': {details}")]
    WindowCreation {
        /// Title of the requested window.
        title: String,
        /// Native error description.
        details: String,
    },
}
