// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// PingOne Infrastructure - Anti-Corruption Layer Implementation
//
// Everything that speaks HTTP to the identity platform lives here. The
// adapter translates between the `IdentityPlatform` port and PingOne's
// REST endpoints; the helpers below it own tokens, requests and polling.

pub mod api_client;
pub mod endpoints;
pub mod pingone;
pub mod poller;
pub mod token_provider;

pub use api_client::{ApiClient, ApiRequest};
pub use pingone::PingOneAdapter;
pub use poller::{PollOptions, StatusPoller};
pub use token_provider::WorkerTokenProvider;
