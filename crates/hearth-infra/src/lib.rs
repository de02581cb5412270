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

//! # Hearth Infra
//!
//! Concrete collaborators for the Hearth core contracts: a `winit` platform,
//! a `wgpu` renderer and an `egui` overlay.

#[cfg(feature = "graphics")]
pub mod graphics;
#[cfg(feature = "platform")]
pub mod platform;
#[cfg(feature = "ui")]
pub mod ui;

#[cfg(feature = "graphics")]
pub use graphics::WgpuRenderer;
#[cfg(feature = "platform")]
pub use platform::WinitPlatform;
#[cfg(feature = "ui")]
pub use ui::{OverlayFrame, UiOverlay};
