//! Common test utilities for extup-update
//!
//! This module provides shared test infrastructure including:
//! - A scripted source adapter recording every call
//! - A scripted installer with per-source behaviour
//! - Workspace fixtures and directory snapshots

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
