//! # clawset Core
//!
//! Shared types, stores, and the operation pipeline for clawset.
//! The hub and CLI crates build on top of this one.

pub mod auth;
pub mod cancel;
pub mod catalog;
pub mod config;
pub mod error;
pub mod i18n;
pub mod operation;
pub mod settings;
