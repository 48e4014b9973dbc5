//! Integration test suite for plugin-mirror
//!
//! End-to-end tests of a mirroring run. Nothing here needs network access,
//! `gh`, or credentials: HTTP endpoints are served by `wiremock` and the
//! pipeline capabilities are replaced by the recording fakes from
//! `plugin_mirror::test_utils`.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **pipeline_flow**: stage order, idempotent skip, tolerated exit codes, cleanup
//! - **oracle_http**: signed update-check requests and response handling
//! - **binary**: the `plugin-mirror` executable, inputs and exit codes

mod binary;
mod common;
mod oracle_http;
mod pipeline_flow;
