//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Signup, login and password hashing
//! - `notifications` - Store-and-publish notifications

pub mod auth;
pub mod notifications;
