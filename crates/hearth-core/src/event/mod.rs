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

//! Provides the typed, synchronous event dispatch used across the engine.
//!
//! The primary component is the [`EventBus`], which delivers strongly-typed
//! event values to every subscriber of that exact type, in registration order.
//! The [`frame`] module defines the five per-frame phase events the frame loop
//! publishes.

mod bus;
pub mod frame;

pub use self::bus::{EventBus, OwnerId, SubscriptionHandle};
pub use self::frame::{
    publish_frame_phases, FrameBegin, FrameEnd, FramePhase, FrameRender, FrameUiRender,
    FrameUpdate,
};
