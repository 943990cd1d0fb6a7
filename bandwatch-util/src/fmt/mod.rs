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

/// UNITS is the ascending unit ladder below the petabyte cap.
const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// format_bytes renders a byte count as a human-readable string with two
/// decimals, dividing by 1024 up the unit ladder and capping at petabytes.
/// Values beyond petabyte scale stay in PB rather than escalating further.
pub fn format_bytes(bytes: u128) -> String {
    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }

        size /= 1024.0;
    }

    format!("{:.2} PB", size)
}
