//! Server-rendered HTML pages.

pub mod auth;
pub mod cart;
pub mod categories;
pub mod logs;
pub mod products;
pub mod users;

mod layout;

pub use layout::{alert, error_page, escape_html, page, url_encode};
