//! BuyGenius Core - Shared types library.
//!
//! This crate provides the types shared by every BuyGenius component:
//! - `server` - The marketplace JSON API
//! - `cli` - Migrations, seeding and admin management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. The product ranking used by search lives here
//! so it can be tested in isolation.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, validated emails and usernames, account roles
//! - [`ranking`] - Cost-benefit scoring and ordering of product offers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod ranking;
pub mod types;

pub use types::*;
