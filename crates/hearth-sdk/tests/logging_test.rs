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

use hearth_sdk::{init_logging, LogConfig, LoggingError};

// Installing the global logger can only happen once per process, so the
// whole lifecycle lives in a single test.
#[test]
fn test_logger_tees_to_file_and_refuses_second_init() {
    // --- 1. ARRANGE ---
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log").join("logs.txt");
    let config = LogConfig {
        level: "info".to_string(),
        file: Some(path.clone()),
    };

    // --- 2. ACT ---
    init_logging(&config).unwrap();
    log::warn!("hearth-logging-probe");
    let second = init_logging(&LogConfig::default());

    // --- 3. ASSERT ---
    assert!(matches!(second, Err(LoggingError::AlreadyInitialized(_))));
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("hearth-logging-probe"));
}
