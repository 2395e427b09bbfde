// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! scribe-engine: job registry, driver loop, and query handling

mod config;
mod driver;
pub mod env;
mod error;
pub mod query;
mod registry;

pub use config::Config;
pub use driver::{DriverHandle, EventLoop};
pub use error::EngineError;
pub use query::handle_query;
pub use registry::{JobUpdate, Registry};
