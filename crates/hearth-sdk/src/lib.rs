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

//! # Hearth SDK
//!
//! The public entry point for Hearth applications: configuration, logging,
//! frame statistics and [`Engine::run`].

#![warn(missing_docs)]

pub mod app;
pub mod config;
pub mod logging;
pub mod stats;

pub use app::{Application, DefaultApplication, Engine};
pub use config::{AppConfig, ConfigError, LogConfig};
pub use logging::{init_logging, LoggingError};
pub use stats::{FrameStats, StatsReport};

/// Re-exports for applications that hook into the registry and the bus.
pub mod prelude {
    pub use hearth_core::event::{
        EventBus, FrameBegin, FrameEnd, FrameRender, FrameUiRender, FrameUpdate, OwnerId,
        SubscriptionHandle,
    };
    pub use hearth_core::platform::{InputEvent, MouseButton, PlatformEvent, WindowId};
    pub use hearth_core::{CommandLine, SubsystemRegistry};

    pub use crate::{AppConfig, Application, Engine};
}
