//! # CLI Command Implementations
//!
//! Each operation of the `nested-sync` command-line tool lives in its own
//! file. A module contains the `clap` arguments it needs (if any) and an
//! `execute` function that calls into the `nested_sync` library.

pub mod sync;
pub mod tree;
