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

pub mod errors;
pub mod message;

pub use errors::ErrorType;
pub use errors::ExternalError;

pub use errors::OrErr;
pub use errors::WebhookError;

// BWError is the error for bandwatch.
#[derive(thiserror::Error, Debug)]
pub enum BWError {
    // IO is the error for IO operation.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    // Yaml is the error for serde_yaml.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    // JSON is the error for serde_json.
    #[error(transparent)]
    JSON(#[from] serde_json::Error),

    // ReqwestError is the error for reqwest.
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    // InterfaceNotFound is the error when the interface has no entry in the
    // network statistics source.
    #[error{"interface {0} not found"}]
    InterfaceNotFound(String),

    // WebhookError is the error when the webhook endpoint does not acknowledge
    // the notification.
    #[error(transparent)]
    WebhookError(WebhookError),

    // ExternalError is the error for external error.
    #[error(transparent)]
    ExternalError(#[from] ExternalError),

    // Unknown is the error when the error is unknown.
    #[error("unknown {0}")]
    Unknown(String),
}
