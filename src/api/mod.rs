// Copyright (c) 2025 Eloquent
// SPDX-License-Identifier: MIT
// HTTP API layer

pub mod errors;
pub mod server;

pub use errors::{ApiError, ErrorResponse};
pub use server::{router, start_server, AppState};
