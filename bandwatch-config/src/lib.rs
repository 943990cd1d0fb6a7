/*
 *     Copyright 2025 The Bandwatch Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::path::PathBuf;

pub mod bwdaemon;
pub mod bwreport;

/// SERVICE_NAME is the name of the service.
pub const SERVICE_NAME: &str = "bandwatch";

/// CARGO_PKG_VERSION is the version of the cargo package.
pub const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// default_config_dir is the default config directory for bandwatch.
pub fn default_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    return PathBuf::from("/etc/bandwatch/");

    #[cfg(target_os = "macos")]
    return home::home_dir().unwrap().join(".bandwatch").join("config");
}

/// default_log_dir is the default log directory for bandwatch.
pub fn default_log_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    return PathBuf::from("/var/log/bandwatch/");

    #[cfg(target_os = "macos")]
    return home::home_dir().unwrap().join(".bandwatch").join("logs");
}

/// default_storage_dir is the default storage directory for bandwatch.
pub fn default_storage_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    return PathBuf::from("/var/lib/bandwatch/");

    #[cfg(target_os = "macos")]
    return home::home_dir().unwrap().join(".bandwatch").join("storage");
}
