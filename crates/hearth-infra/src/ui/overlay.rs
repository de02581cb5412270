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

//! A status overlay built with `egui` on every ui-render phase.

use hearth_core::event::{EventBus, FrameUiRender, OwnerId};
use hearth_core::platform::{InputEvent, MouseButton, PlatformEvent, WindowId};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The widgets state of the overlay panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelState {
    /// Shows egui's inspection window.
    pub show_inspection_window: bool,
    /// Shows the secondary "Another Window".
    pub show_another_window: bool,
    /// Value of the float slider, in `0.0..=1.0`.
    pub value: f32,
    /// Number of clicks on the counter button.
    pub counter: u32,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            show_inspection_window: false,
            show_another_window: false,
            value: 0.0,
            counter: 0,
        }
    }
}

/// The tessellated output of one overlay pass, ready for a painter.
#[derive(Debug, Clone)]
pub struct OverlayFrame {
    /// Clipped triangle meshes, in paint order.
    pub primitives: Vec<egui::ClippedPrimitive>,
    /// Texture uploads and frees to apply before painting.
    pub textures_delta: egui::TexturesDelta,
    /// Physical pixels per logical point.
    pub pixels_per_point: f32,
    /// Physical size of the target surface.
    pub screen_size: (u32, u32),
}

impl OverlayFrame {
    /// Total number of vertices across all meshes.
    pub fn vertex_count(&self) -> usize {
        self.primitives
            .iter()
            .map(|clipped| match &clipped.primitive {
                egui::epaint::Primitive::Mesh(mesh) => mesh.vertices.len(),
                egui::epaint::Primitive::Callback(_) => 0,
            })
            .sum()
    }
}

/// Runs the overlay panel on each [`FrameUiRender`] and keeps the latest
/// [`OverlayFrame`].
///
/// The overlay follows `PlatformEvent::Resized` for its window and feeds the
/// pointer input of that window to the next pass. Dropping it removes its
/// subscriptions.
pub struct UiOverlay {
    state: Arc<OverlayState>,
    bus: Arc<EventBus>,
}

struct OverlayState {
    window: WindowId,
    ctx: egui::Context,
    inner: Mutex<OverlayInner>,
}

struct OverlayInner {
    panel: PanelState,
    screen_size: (u32, u32),
    elapsed: f64,
    passes: u64,
    last_frame: Option<OverlayFrame>,
    pointer: egui::Pos2,
    pending_input: Vec<egui::Event>,
}

impl UiOverlay {
    /// Creates the overlay for `window` and subscribes it to the bus.
    pub fn new(bus: Arc<EventBus>, window: WindowId, screen_size: (u32, u32)) -> Self {
        let state = Arc::new(OverlayState {
            window,
            ctx: egui::Context::default(),
            inner: Mutex::new(OverlayInner {
                panel: PanelState::default(),
                screen_size,
                elapsed: 0.0,
                passes: 0,
                last_frame: None,
                pointer: egui::Pos2::ZERO,
                pending_input: Vec::new(),
            }),
        });
        bus.subscribe_method(&state, OverlayState::on_ui_render);
        bus.subscribe_method(&state, OverlayState::on_platform_event);
        log::debug!("UiOverlay attached to {window}.");
        Self { state, bus }
    }

    /// Current panel state.
    pub fn panel(&self) -> PanelState {
        self.state.lock().panel.clone()
    }

    /// Replaces the panel state; takes effect on the next pass.
    pub fn set_panel(&self, panel: PanelState) {
        self.state.lock().panel = panel;
    }

    /// Number of overlay passes run so far.
    pub fn passes(&self) -> u64 {
        self.state.lock().passes
    }

    /// Physical size the overlay lays itself out in.
    pub fn screen_size(&self) -> (u32, u32) {
        self.state.lock().screen_size
    }

    /// Takes the output of the latest pass, if it was not taken yet.
    pub fn take_frame(&self) -> Option<OverlayFrame> {
        self.state.lock().last_frame.take()
    }
}

impl OverlayState {
    fn lock(&self) -> MutexGuard<'_, OverlayInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn on_platform_event(&self, event: &PlatformEvent) {
        match event {
            PlatformEvent::Resized {
                window,
                width,
                height,
            } if *window == self.window && *width > 0 && *height > 0 => {
                self.lock().screen_size = (*width, *height);
            }
            PlatformEvent::Input { window, event } if *window == self.window => {
                let mut inner = self.lock();
                if let Some(event) = translate_pointer(&mut inner.pointer, event) {
                    inner.pending_input.push(event);
                }
            }
            _ => {}
        }
    }

    fn on_ui_render(&self, event: &FrameUiRender) {
        let mut inner = self.lock();
        inner.elapsed += f64::from(event.delta_time);

        let (width, height) = inner.screen_size;
        let raw_input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(width as f32, height as f32),
            )),
            time: Some(inner.elapsed),
            predicted_dt: if event.delta_time > 0.0 {
                event.delta_time
            } else {
                1.0 / 60.0
            },
            events: std::mem::take(&mut inner.pending_input),
            ..Default::default()
        };

        let panel = &mut inner.panel;
        let output = self.ctx.run(raw_input, |ctx| show_panel(ctx, panel));
        let primitives = self.ctx.tessellate(output.shapes, output.pixels_per_point);

        // Texture deltas not yet consumed by a painter are carried over.
        let mut textures_delta = inner
            .last_frame
            .take()
            .map(|frame| frame.textures_delta)
            .unwrap_or_default();
        textures_delta.append(output.textures_delta);

        inner.last_frame = Some(OverlayFrame {
            primitives,
            textures_delta,
            pixels_per_point: output.pixels_per_point,
            screen_size: (width, height),
        });
        inner.passes += 1;
    }
}

/// Maps pointer input to egui, tracking the last cursor position for clicks.
fn translate_pointer(pointer: &mut egui::Pos2, event: &InputEvent) -> Option<egui::Event> {
    match event {
        InputEvent::MouseMoved { x, y } => {
            *pointer = egui::pos2(*x, *y);
            Some(egui::Event::PointerMoved(*pointer))
        }
        InputEvent::MouseButtonPressed { button } => pointer_button(*pointer, *button, true),
        InputEvent::MouseButtonReleased { button } => pointer_button(*pointer, *button, false),
        _ => None,
    }
}

fn pointer_button(pos: egui::Pos2, button: MouseButton, pressed: bool) -> Option<egui::Event> {
    let button = match button {
        MouseButton::Left => egui::PointerButton::Primary,
        MouseButton::Right => egui::PointerButton::Secondary,
        MouseButton::Middle => egui::PointerButton::Middle,
        MouseButton::Back => egui::PointerButton::Extra1,
        MouseButton::Forward => egui::PointerButton::Extra2,
        MouseButton::Other(_) => return None,
    };
    Some(egui::Event::PointerButton {
        pos,
        button,
        pressed,
        modifiers: egui::Modifiers::NONE,
    })
}

fn show_panel(ctx: &egui::Context, panel: &mut PanelState) {
    egui::Window::new("Hello, world!").show(ctx, |ui| {
        ui.label("This is some useful text.");
        ui.checkbox(&mut panel.show_inspection_window, "Inspection Window");
        ui.checkbox(&mut panel.show_another_window, "Another Window");

        ui.add(egui::Slider::new(&mut panel.value, 0.0..=1.0).text("float"));

        ui.horizontal(|ui| {
            if ui.button("Button").clicked() {
                panel.counter += 1;
            }
            ui.label(format!("counter = {}", panel.counter));
        });

        let dt = ui.input(|input| input.stable_dt);
        if dt > 0.0 {
            ui.label(format!(
                "Application average {:.3} ms/frame ({:.1} FPS)",
                dt * 1000.0,
                1.0 / dt
            ));
        }
    });

    if panel.show_inspection_window {
        egui::Window::new("Inspection")
            .open(&mut panel.show_inspection_window)
            .show(ctx, |ui| ctx.inspection_ui(ui));
    }

    if panel.show_another_window {
        let mut is_open = true;
        let mut should_close = false;
        egui::Window::new("Another Window")
            .open(&mut is_open)
            .show(ctx, |ui| {
                ui.label("Hello from another window!");
                if ui.button("Close Me").clicked() {
                    should_close = true;
                }
            });
        panel.show_another_window = is_open && !should_close;
    }
}

impl Drop for UiOverlay {
    fn drop(&mut self) {
        self.bus.unsubscribe_owner(OwnerId::of(self.state.as_ref()));
        log::debug!("UiOverlay detached from {}.", self.state.window);
    }
}

impl std::fmt::Debug for UiOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiOverlay")
            .field("window", &self.state.window)
            .field("passes", &self.passes())
            .finish_non_exhaustive()
    }
}
