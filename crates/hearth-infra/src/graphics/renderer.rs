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

//! The wgpu renderer subsystem.

use super::context::GpuContext;
use hearth_core::event::{EventBus, FrameRender, FrameUpdate, OwnerId};
use hearth_core::platform::{Platform, PlatformEvent, WindowId};
use hearth_core::renderer::RenderError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Background color of the main window.
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.45,
    g: 0.55,
    b: 0.60,
    a: 1.00,
};

/// Clears and presents the main window once per render phase.
///
/// Created with [`WgpuRenderer::setup`]; it reacts to the bus from then on:
/// * `FrameUpdate`: rebuilds the swapchain if a resize or a lost surface
///   asked for it.
/// * `FrameRender`: acquires, clears and presents a frame.
/// * `PlatformEvent::Resized` for its window: records the new size.
///
/// Dropping the renderer waits for the GPU to go idle, then unsubscribes.
pub struct WgpuRenderer {
    state: Arc<RendererState>,
    bus: Arc<EventBus>,
}

struct RendererState {
    window: WindowId,
    context: Mutex<GpuContext>,
    frames_presented: AtomicU64,
}

impl WgpuRenderer {
    /// Creates the GPU context for the platform's main window and subscribes
    /// the renderer to the frame phases.
    ///
    /// # Errors
    /// [`RenderError::NoWindow`] if the platform has no main window, or
    /// [`RenderError::InitializationFailed`] if wgpu setup fails.
    pub fn setup(platform: &dyn Platform, bus: Arc<EventBus>) -> Result<Self, RenderError> {
        let window = platform.main_window().ok_or(RenderError::NoWindow)?;
        let handle = platform.window_handle(window).ok_or(RenderError::NoWindow)?;
        let size = platform.window_size(window).unwrap_or((1, 1));

        let context = pollster::block_on(GpuContext::new(handle, size))?;
        log::info!(
            "WgpuRenderer: Ready on {} ({}x{}).",
            context.adapter_name,
            size.0,
            size.1
        );

        let state = Arc::new(RendererState {
            window,
            context: Mutex::new(context),
            frames_presented: AtomicU64::new(0),
        });
        bus.subscribe_method(&state, RendererState::on_update);
        bus.subscribe_method(&state, RendererState::on_render);
        bus.subscribe_method(&state, RendererState::on_platform_event);

        Ok(Self { state, bus })
    }

    /// The window this renderer presents to.
    pub fn window(&self) -> WindowId {
        self.state.window
    }

    /// Number of frames presented so far.
    pub fn frames_presented(&self) -> u64 {
        self.state.frames_presented.load(Ordering::Relaxed)
    }

    /// Current swapchain size.
    pub fn surface_size(&self) -> (u32, u32) {
        self.state.context().size()
    }
}

impl RendererState {
    fn context(&self) -> std::sync::MutexGuard<'_, GpuContext> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn on_platform_event(&self, event: &PlatformEvent) {
        match *event {
            PlatformEvent::Resized {
                window,
                width,
                height,
            } if window == self.window => self.context().resize(width, height),
            _ => {}
        }
    }

    fn on_update(&self, _: &FrameUpdate) {
        self.context().rebuild_if_needed();
    }

    fn on_render(&self, _: &FrameRender) {
        let mut context = self.context();

        let frame = match context.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::warn!(
                    "WgpuRenderer: Swapchain surface lost or outdated ({e:?}), \
                     rebuilding next frame."
                );
                context.mark_for_rebuild();
                return;
            }
            Err(e @ wgpu::SurfaceError::Timeout) => {
                log::warn!("WgpuRenderer: Swapchain Timeout acquiring frame. ({e:?})");
                return;
            }
            Err(e) => {
                log::error!(
                    "WgpuRenderer: {}",
                    RenderError::SurfaceAcquisitionFailed(format!("{e:?}"))
                );
                return;
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Hearth Frame Encoder"),
            });
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Hearth Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        self.frames_presented.fetch_add(1, Ordering::Relaxed);
    }
}

impl Drop for WgpuRenderer {
    fn drop(&mut self) {
        self.state.context().wait_idle();
        let removed = self.bus.unsubscribe_owner(OwnerId::of(self.state.as_ref()));
        log::info!(
            "WgpuRenderer: Shut down after {} frame(s), {removed} subscription(s) removed.",
            self.frames_presented()
        );
    }
}

impl std::fmt::Debug for WgpuRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuRenderer")
            .field("window", &self.state.window)
            .field("frames_presented", &self.frames_presented())
            .finish_non_exhaustive()
    }
}
