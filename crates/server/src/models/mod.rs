//! Domain models for the marketplace.
//!
//! These are the validated types handlers work with and serialize back to
//! clients. Database row types stay private to the `db` module.

pub mod category;
pub mod dashboard;
pub mod feedback;
pub mod history;
pub mod message;
pub mod notification;
pub mod product;
pub mod retailer;
pub mod session;
pub mod user;
pub mod wishlist;

pub use category::Category;
pub use dashboard::{AdminDashboard, RetailerDashboard};
pub use feedback::{Feedback, NewFeedback};
pub use history::SearchHistoryEntry;
pub use message::{Message, NewMessage};
pub use notification::Notification;
pub use product::{NewProduct, Product, ProductDetail, ProductFilter, ProductUpdate};
pub use retailer::{NewRetailer, Retailer, RetailerUpdate};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{User, UserUpdate};
pub use wishlist::WishlistItem;
