//! Shared domain and wire types for the proposal store.

pub mod api;
pub mod models;
