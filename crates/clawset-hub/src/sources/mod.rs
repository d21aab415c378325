//! Model catalog sources.

pub mod openclaw;

pub use openclaw::OpenclawCli;
