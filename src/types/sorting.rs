//! Sort options for list endpoints.
//!
//! Unknown values never fail a request: they fall back to the defaults
//! (`created_at`, descending).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Lenient parse; anything but `asc` means descending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()) {
            Some(s) if s == "asc" => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

/// Columns a user listing may be ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Email,
    Username,
}

impl SortField {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("updated_at") => SortField::UpdatedAt,
            Some("email") => SortField::Email,
            Some("username") => SortField::Username,
            _ => SortField::CreatedAt,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Email => "email",
            SortField::Username => "username",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_defaults_to_desc() {
        assert_eq!(SortOrder::parse(None), SortOrder::Desc);
        assert_eq!(SortOrder::parse(Some("sideways")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(Some("ASC")), SortOrder::Asc);
    }

    #[test]
    fn test_unknown_sort_field_falls_back() {
        assert_eq!(SortField::parse(Some("password_hash")), SortField::CreatedAt);
        assert_eq!(SortField::parse(None), SortField::CreatedAt);
        assert_eq!(SortField::parse(Some(" Email ")), SortField::Email);
        assert_eq!(SortField::parse(Some("updated_at")).as_str(), "updated_at");
    }
}
