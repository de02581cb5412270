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

use anyhow::{Context, Result};
use hearth_sdk::prelude::*;
use hearth_sdk::init_logging;
use std::sync::Arc;

/// Logs keyboard input to show how applications reach the bus.
struct Runtime {
    subscription: Option<(Arc<EventBus>, SubscriptionHandle)>,
}

impl Application for Runtime {
    fn start(&mut self, registry: &mut SubsystemRegistry) -> Result<()> {
        let bus = registry.get::<Arc<EventBus>>().clone();
        let handle = bus.subscribe(|event: &PlatformEvent| {
            if let PlatformEvent::Input {
                event: InputEvent::KeyPressed { key_code },
                ..
            } = event
            {
                log::debug!("Key pressed: {key_code}");
            }
        });
        self.subscription = Some((bus, handle));
        Ok(())
    }

    fn stop(&mut self, _registry: &mut SubsystemRegistry) {
        if let Some((bus, handle)) = self.subscription.take() {
            bus.unsubscribe(handle);
        }
    }
}

fn main() -> Result<()> {
    let cli = CommandLine::from_env();
    let config = AppConfig::from_command_line(&cli).context("Failed to load configuration")?;
    init_logging(&config.log).context("Failed to initialize logging")?;
    log::info!("Options:\n{}", cli.options_summary());

    let code = Engine::run(&config, Runtime { subscription: None })?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
