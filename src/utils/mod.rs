//! Developer tooling helpers.

pub mod templates;
