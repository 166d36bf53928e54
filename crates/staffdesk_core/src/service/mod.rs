//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate guard and repository calls into use-case level APIs.
//! - Own the outcome policy: callers get booleans and `Option`s, never
//!   store errors.

pub mod directory;
