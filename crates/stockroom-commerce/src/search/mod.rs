//! Search module.
//!
//! Product search criteria and pagination.

mod filter;
mod page;

pub use filter::ProductFilter;
pub use page::{paginate, Page, Pagination};
