//! Core types shared by every stage of the mirroring pipeline
//!
//! # Error Management
//!
//! - **Strongly-typed errors** ([`MirrorError`]) for precise handling in code
//! - **Stage tagging** ([`StageError`], [`StageResultExt`]) so the first failing
//!   stage decides the process exit code
//! - **User-friendly contexts** ([`ErrorContext`]) rendered once by the binary
//!
//! # Stages
//!
//! [`Stage`] names each step of a run in execution order. Headings printed to
//! the job log and error labels both come from it.

pub mod error;
mod stage;

pub use error::{ErrorContext, MirrorError, StageError, StageResultExt, user_friendly_error};
pub use stage::Stage;
