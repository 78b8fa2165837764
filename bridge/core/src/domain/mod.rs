// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Types shared by every other layer; no I/O lives here.

pub mod config;
pub mod error;
pub mod platform;
pub mod token;

pub use config::{BridgeConfig, ConfigKey};
pub use error::{ApiPayload, PingOneError};
pub use platform::{IdentityPlatform, OidcApplicationOptions, ProtectDecisionRequest};
pub use token::{TokenResponse, TokenSource, WorkerToken};
