//! Core library components.
//!
//! Matrix running, the release gate and formula publishing. Nothing in here
//! prints; the CLI layer owns all user-facing output.

pub mod cache;
pub mod config;
pub mod constants;
pub mod credential;
pub mod domain;
pub mod formula;
pub mod gate;
pub mod matrix;
pub mod prepare;
pub mod publish;
pub mod remote;
pub mod source;
pub mod step;
pub mod workspace;
