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

use hearth_core::platform::PlatformWindowHandle;
use hearth_core::renderer::RenderError;
use wgpu::SurfaceTargetUnsafe;

/// Holds the wgpu objects bound to one window surface.
pub struct GpuContext {
    pub surface: wgpu::Surface<'static>,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,

    // Configuration for the surface's swapchain behavior
    pub surface_config: wgpu::SurfaceConfiguration,
    pub adapter_name: String,

    // Set when the swapchain must be reconfigured before the next acquire.
    needs_rebuild: bool,
    // The surface borrows the native window: keep it alive, and drop it last.
    _window: PlatformWindowHandle,
}

impl GpuContext {
    /// Creates the instance, surface, adapter, device and queue for a window.
    ///
    /// ## Arguments
    /// * `window` - The native window the surface presents to.
    /// * `size` - The initial physical size of the window.
    pub async fn new(window: PlatformWindowHandle, size: (u32, u32)) -> Result<Self, RenderError> {
        log::info!("Initializing WGPU graphics context...");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        // --- 1. Create Surface ---
        let surface_target = unsafe {
            SurfaceTargetUnsafe::from_window(&window).map_err(|e| {
                RenderError::InitializationFailed(format!("Failed to create surface target: {e}"))
            })?
        };
        let surface = unsafe { instance.create_surface_unsafe(surface_target) }.map_err(|e| {
            RenderError::InitializationFailed(format!("Failed to create surface: {e}"))
        })?;
        log::debug!("WGPU surface created for the window.");

        // --- 2. Select an adapter able to present to the surface ---
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| {
                RenderError::InitializationFailed(format!("Failed to find a suitable adapter: {e}"))
            })?;
        let adapter_info = adapter.get_info();
        log::info!(
            "Using graphics adapter: \"{}\" (Backend: {:?})",
            adapter_info.name,
            adapter_info.backend
        );

        // --- 3. Create Logical Device and Command Queue ---
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Hearth Logical Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
            })
            .await
            .map_err(|e| {
                RenderError::InitializationFailed(format!("Failed to create logical device: {e}"))
            })?;
        log::info!("Logical device and command queue created.");

        device.on_uncaptured_error(Box::new(|e| {
            log::error!("WGPU Uncaptured Error: {e:?}");
        }));

        // --- 4. Configure Surface ---
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| {
                RenderError::InitializationFailed(
                    "Surface is incompatible with the adapter".to_string(),
                )
            })?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.0.max(1),
            height: size.1.max(1),
            present_mode: surface_caps
                .present_modes
                .iter()
                .copied()
                .find(|m| *m == wgpu::PresentMode::Mailbox)
                .unwrap_or(wgpu::PresentMode::Fifo), // Fifo is guaranteed to be supported
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        Ok(Self {
            surface,
            adapter,
            device,
            queue,
            surface_config,
            adapter_name: adapter_info.name,
            needs_rebuild: false,
            _window: window,
        })
    }

    /// Records a new target size; the swapchain is rebuilt before the next
    /// frame. Zero dimensions are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::debug!("GpuContext: Ignoring resize request to zero dimensions: {width}x{height}");
            return;
        }
        if (width, height) != self.size() {
            self.surface_config.width = width;
            self.surface_config.height = height;
            self.needs_rebuild = true;
        }
    }

    /// Forces a swapchain rebuild before the next frame.
    pub fn mark_for_rebuild(&mut self) {
        self.needs_rebuild = true;
    }

    /// Returns `true` while a rebuild is pending.
    pub fn needs_rebuild(&self) -> bool {
        self.needs_rebuild
    }

    /// Reconfigures the swapchain if a rebuild is pending.
    pub fn rebuild_if_needed(&mut self) {
        if self.needs_rebuild {
            log::info!(
                "GpuContext: Reconfiguring swapchain to {}x{}",
                self.surface_config.width,
                self.surface_config.height
            );
            self.surface.configure(&self.device, &self.surface_config);
            self.needs_rebuild = false;
        }
    }

    /// Blocks until the GPU has finished all submitted work.
    pub fn wait_idle(&self) {
        if let Err(e) = self.device.poll(wgpu::PollType::Wait) {
            log::warn!("GpuContext: Failed to wait for device idle: {e:?}");
        }
    }

    /// Returns the size of the swapchain.
    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }
}

impl std::fmt::Debug for GpuContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuContext")
            .field("adapter_name", &self.adapter_name)
            .field("size", &self.size())
            .field("needs_rebuild", &self.needs_rebuild)
            .finish_non_exhaustive()
    }
}
