// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`pingone-bridge-core`)
//!
//! Transports that translate external requests into platform and tool
//! service calls. No PingOne logic lives here.
//!
//! | Module | Transport | Description |
//! |--------|-----------|-------------|
//! | [`api`] | HTTP (Axum) | `POST /getProtectDecision` and `GET /health` |
//! | [`stdio`] | JSON-RPC 2.0 over stdio | Tool server for the five PingOne tools |
//! | [`framing`] | stdio | `Content-Length` frame reader and writer |

pub mod api;
pub mod framing;
pub mod stdio;
