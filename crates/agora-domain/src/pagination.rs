//! Pagination and sort direction types shared by list endpoints.

use serde::{Deserialize, Serialize};

/// Generic sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sort {
    Desc,
    Asc,
}

/// Pagination parameters.
///
/// - `per_page`: 1–100, default 20
/// - `page`: ≥ 1, default 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_per_page", rename = "per-page")]
    pub per_page: u32,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_per_page() -> u32 {
    20
}

fn default_page() -> u32 {
    1
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            page: default_page(),
        }
    }
}

impl PageRequest {
    /// Clamp `per_page` to 1–100 and `page` to ≥ 1. Call after
    /// deserializing from query params.
    pub fn clamped(self) -> Self {
        Self {
            per_page: self.per_page.clamp(1, 100),
            page: self.page.max(1),
        }
    }

    /// Row limit for the backing query.
    pub fn limit(self) -> u64 {
        u64::from(self.clamped().per_page)
    }

    /// Row offset for the backing query.
    pub fn offset(self) -> u64 {
        let p = self.clamped();
        u64::from(p.page - 1) * u64::from(p.per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_per_page_20_page_1() {
        let p = PageRequest::default();
        assert_eq!(p.per_page, 20);
        assert_eq!(p.page, 1);
    }

    #[test]
    fn should_clamp_out_of_range_values() {
        let p = PageRequest {
            per_page: 500,
            page: 0,
        }
        .clamped();
        assert_eq!(p.per_page, 100);
        assert_eq!(p.page, 1);
    }

    #[test]
    fn should_compute_limit_and_offset() {
        let p = PageRequest {
            per_page: 20,
            page: 3,
        };
        assert_eq!(p.limit(), 20);
        assert_eq!(p.offset(), 40);
    }

    #[test]
    fn should_offset_zero_on_first_page() {
        assert_eq!(PageRequest::default().offset(), 0);
    }

    #[test]
    fn should_deserialize_kebab_case_fields() {
        let p: PageRequest = serde_json::from_str(r#"{"per-page": 5, "page": 2}"#).unwrap();
        assert_eq!(p.per_page, 5);
        assert_eq!(p.page, 2);
    }
}
