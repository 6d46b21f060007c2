//! BuyGenius marketplace API library.
//!
//! The binary in `main.rs` wires these modules into a server; the library
//! form lets the CLI reuse the repositories and lets tests build routers.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
