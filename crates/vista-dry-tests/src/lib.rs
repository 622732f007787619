// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and taps for Vista crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`log`] - Shared ordered call log
//! - [`scenes`] - Recording scene plus the tap tests read its events from
//! - [`supervisor`] - Supervisor fake that records starts and terminations
//! - [`drivers`] - Driver tap registered straight against a viewport
//! - [`graphs`] - Small graph layouts used across viewport tests

pub mod config;
pub mod drivers;
pub mod graphs;
pub mod log;
pub mod scenes;
pub mod supervisor;

// Re-export commonly used items at crate root for convenience
pub use config::InMemoryConfigStore;
pub use drivers::{connect_driver, DriverTap};
pub use log::CallLog;
pub use scenes::{RecordingScene, SceneEvent, SceneTap};
pub use supervisor::RecordingSupervisor;

use std::time::Duration;

/// How long taps wait for an expected event.
pub const TAP_TIMEOUT: Duration = Duration::from_secs(2);
