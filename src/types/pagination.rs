//! Pagination types for list endpoints.

use serde::Serialize;
use utoipa::ToSchema;

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_NUMBER, MAX_PAGE_SIZE};

/// Page selection, 1-indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: u64,
    pub per_page: u64,
}

impl PaginationParams {
    /// Build params from optional query values, clamping both into range.
    pub fn new(page: Option<u64>, per_page: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(DEFAULT_PAGE_NUMBER).clamp(1, MAX_PAGE_NUMBER),
            per_page: per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Zero-based page index as SeaORM's paginator expects it
    pub fn page_index(&self) -> u64 {
        self.page.clamp(1, MAX_PAGE_NUMBER) - 1
    }

    /// Calculate offset for database query
    pub fn offset(&self) -> u64 {
        self.page_index() * self.limit()
    }

    /// Get limit capped at maximum
    pub fn limit(&self) -> u64 {
        self.per_page.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
#[aliases(PaginatedUsers = Paginated<crate::domain::UserResponse>)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, params: PaginationParams, total: u64) -> Self {
        let per_page = params.limit();
        let total_pages = total.div_ceil(per_page);

        Self {
            data,
            meta: PaginationMeta {
                page: params.page,
                per_page,
                total,
                total_pages,
            },
        }
    }
}
