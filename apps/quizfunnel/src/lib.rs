//! # Quiz Funnel Application Library
//!
//! HTTP API, CLI, configuration and the completion client, exposed as a
//! library so integration tests can build routers directly.

pub mod api;
pub mod cli;
pub mod config;
pub mod generator;
