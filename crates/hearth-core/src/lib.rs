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

//! # Hearth Core
//!
//! Foundational crate of the Hearth application shell: the subsystem registry,
//! the typed event bus, the frame loop and the contracts its collaborators
//! (windowing, rendering) implement.

#![warn(missing_docs)]

pub mod cli;
pub mod event;
pub mod frame_loop;
pub mod platform;
pub mod renderer;
pub mod subsystem;

pub use cli::{CliError, CommandLine};
pub use event::{EventBus, OwnerId, SubscriptionHandle};
pub use frame_loop::{FrameLoop, TickOutcome};
pub use subsystem::{SubsystemRegistry, SubsystemStatus};
