//! # Recurrence Testing Utils
//!
//! Shared testing utilities for the recurrence workspace.
//!
//! ## Features
//!
//! - **Mock Repositories**: In-memory template/instance repositories with failure injection
//! - **Mock Notifier**: Records sent notifications, optionally failing per recipient
//! - **Test Data Builders**: Template builders for all three flavors
//! - **Helpers**: Timestamp parsing and test logging setup
//!
//! ## Usage
//!
//! ```toml
//! [dev-dependencies]
//! recurrence-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use helpers::*;
pub use mocks::*;
