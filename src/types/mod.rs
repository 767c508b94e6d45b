//! Shared request/response types used across list endpoints and handlers.

mod pagination;
mod response;
mod sorting;

pub use pagination::{Paginated, PaginatedUsers, PaginationMeta, PaginationParams};
pub use response::{Created, NoContent};
pub use sorting::{SortField, SortOrder};
