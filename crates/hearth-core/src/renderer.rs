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

//! Error types shared by rendering backends.

/// An error raised by a rendering backend.
///
/// Transient swapchain conditions (lost or outdated surfaces) are not errors:
/// backends rebuild the swapchain and retry on the next frame.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The backend could not acquire a device, surface or other resource at
    /// setup time.
    #[error("Renderer initialization failed: {0}")]
    InitializationFailed(String),
    /// The platform has no window to render into.
    #[error("No window available for rendering")]
    NoWindow,
    /// A frame could not be acquired for a non-recoverable reason.
    #[error("Failed to acquire surface texture: {0}")]
    SurfaceAcquisitionFailed(String),
}
