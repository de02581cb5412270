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

//! The engine entry point.

use crate::config::AppConfig;
use crate::stats::FrameStats;
use anyhow::{Context, Result};
use hearth_core::event::EventBus;
use hearth_core::platform::{Platform, WindowDescriptor};
use hearth_core::{FrameLoop, SubsystemRegistry};
use hearth_infra::{UiOverlay, WgpuRenderer, WinitPlatform};
use std::sync::Arc;

/// User hooks around the frame loop.
///
/// `start` runs after the built-in subsystems are registered; it may register
/// more of them and subscribe to the [`EventBus`] (itself a subsystem, stored
/// as `Arc<EventBus>`). `stop` runs before teardown.
pub trait Application {
    /// Called once before the first frame.
    fn start(&mut self, _registry: &mut SubsystemRegistry) -> Result<()> {
        Ok(())
    }

    /// Called once after the last frame.
    fn stop(&mut self, _registry: &mut SubsystemRegistry) {}
}

/// An application with no hooks of its own.
#[derive(Debug, Default)]
pub struct DefaultApplication;

impl Application for DefaultApplication {}

/// Builds the standard subsystems and runs the frame loop.
pub struct Engine;

impl Engine {
    /// Runs `app` until the main window is closed or a quit is requested.
    ///
    /// Subsystems are registered in this order: event bus, platform (with its
    /// main window), renderer, UI overlay, frame statistics. They are torn down
    /// in the reverse order when the loop ends.
    ///
    /// ## Returns
    /// The process exit code.
    pub fn run(config: &AppConfig, mut app: impl Application) -> Result<i32> {
        config.validate().context("Invalid configuration")?;

        let mut registry = SubsystemRegistry::new();
        registry.initialize();

        let bus = registry.register(Arc::new(EventBus::new())).clone();

        let mut platform = WinitPlatform::new().context("Failed to start the windowing platform")?;
        let window = platform
            .create_window(&WindowDescriptor::new(
                config.title.as_str(),
                config.width,
                config.height,
            ))
            .context("Failed to create the main window")?;
        let screen_size = platform
            .window_size(window)
            .unwrap_or((config.width, config.height));
        registry.register(platform);

        registry
            .try_register_with(|registry| {
                WgpuRenderer::setup(registry.get::<WinitPlatform>(), bus.clone())
            })
            .context("Failed to set up the renderer")?;
        registry.register(UiOverlay::new(bus.clone(), window, screen_size));
        registry.register(FrameStats::new(bus.clone(), config.stats_interval()));

        log::info!("App {} setup", config.title);
        app.start(&mut registry).context("Application start failed")?;
        log::info!(
            "App {} start with subsystems {:?}",
            config.title,
            registry.registration_order()
        );

        let mut frame_loop = FrameLoop::new().with_idle_delay(config.idle_delay());
        frame_loop.run(registry.get_mut::<WinitPlatform>(), &bus);

        app.stop(&mut registry);
        registry.teardown();
        log::info!("App {} stopped after {} frame(s)", config.title, frame_loop.frame_count());
        Ok(0)
    }
}
