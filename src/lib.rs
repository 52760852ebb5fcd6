//! Library exports for authlink, shared between the binary and tests.

pub mod auth;
pub mod backend;
pub mod config;
pub mod routes;
pub mod startup;
pub mod state;
pub mod utils;
