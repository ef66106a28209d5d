// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagewright — Core types and error definitions shared across all crates.

pub mod blob;
pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use blob::{BlobHandle, BlobStore};
pub use config::AppConfig;
pub use error::PagewrightError;
pub use types::*;
