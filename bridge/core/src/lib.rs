// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! PingOne Bridge Core
//!
//! Thin adapter over the PingOne identity-platform REST API, plus the two
//! front ends that expose it: an axum HTTP router and a stdio tool server.
//!
//! # Architecture
//!
//! - **domain:** configuration, error contract, worker-token model and the
//!   `IdentityPlatform` port
//! - **infrastructure:** worker-token provider, authenticated API client,
//!   status poller and the PingOne adapter
//! - **application:** tool catalogue and invocation service
//! - **presentation:** HTTP router and stdio JSON-RPC server

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
