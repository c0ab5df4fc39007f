//! Bookstore - entity mapping walkthrough over SQLite
//!
//! This library crate exposes the configuration loader and the walkthrough
//! steps for integration testing.

pub mod config;
pub mod demo;
