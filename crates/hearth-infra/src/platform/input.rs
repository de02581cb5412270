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

//! Translation of `winit` window events into engine [`PlatformEvent`]s.
//!
//! Minimized and restored transitions are not derived here: they depend on
//! several window properties at once and are tracked by
//! [`WinitPlatform`](super::WinitPlatform).

use hearth_core::platform::{InputEvent, MouseButton, PlatformEvent, WindowId};
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Translates a `winit` event targeted at `window`.
///
/// Returns `None` for events the engine does not forward (redraw requests,
/// key repeats, zero-length scrolls, ...).
pub fn translate_window_event(window: WindowId, event: &WindowEvent) -> Option<PlatformEvent> {
    match event {
        WindowEvent::CloseRequested => Some(PlatformEvent::CloseRequested { window }),
        WindowEvent::Resized(size) => Some(PlatformEvent::Resized {
            window,
            width: size.width,
            height: size.height,
        }),
        WindowEvent::Focused(focused) => Some(PlatformEvent::Focused {
            window,
            focused: *focused,
        }),
        _ => translate_input(event).map(|event| PlatformEvent::Input { window, event }),
    }
}

fn translate_input(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::KeyboardInput { event, .. } => {
            let PhysicalKey::Code(code) = event.physical_key else {
                return None;
            };
            let key_code = key_name(code);
            match event.state {
                ElementState::Pressed if !event.repeat => Some(InputEvent::KeyPressed { key_code }),
                ElementState::Released => Some(InputEvent::KeyReleased { key_code }),
                ElementState::Pressed => None,
            }
        }
        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::MouseMoved {
            x: position.x as f32,
            y: position.y as f32,
        }),
        WindowEvent::MouseInput { state, button, .. } => {
            let button = mouse_button(*button);
            Some(match state {
                ElementState::Pressed => InputEvent::MouseButtonPressed { button },
                ElementState::Released => InputEvent::MouseButtonReleased { button },
            })
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let (delta_x, delta_y) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                MouseScrollDelta::PixelDelta(pos) => (pos.x as f32, pos.y as f32),
            };
            (delta_x != 0.0 || delta_y != 0.0)
                .then_some(InputEvent::MouseWheelScrolled { delta_x, delta_y })
        }
        _ => None,
    }
}

fn key_name(code: KeyCode) -> String {
    format!("{code:?}")
}

fn mouse_button(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(id) => MouseButton::Other(id),
    }
}
