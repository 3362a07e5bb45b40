//! Library crate for racha-back, exposing modules for binaries and integration tests.

pub mod config;
pub mod dao;
mod dto;
pub mod error;
pub mod gate;
pub mod identity;
pub mod routes;
pub mod services;
pub mod state;
