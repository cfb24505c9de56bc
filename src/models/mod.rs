pub mod allocations;
pub mod common;
pub mod users;

pub use common::{PaginationInfo, PaginationQuery};
