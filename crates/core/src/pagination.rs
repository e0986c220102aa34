//! Pagination primitives shared by repositories and services.

use serde::{Deserialize, Serialize};

/// A window into a list query, already clamped to sane bounds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    offset: u64,
    limit: u64,
}

impl PageRequest {
    /// Clamp raw caller input into a valid window.
    ///
    /// Negative offsets become 0; a non-positive limit falls back to
    /// `default_limit`; limits above `max_limit` are capped.
    pub fn clamped(offset: i64, limit: i64, default_limit: u64, max_limit: u64) -> Self {
        let offset = offset.max(0) as u64;
        let limit = if limit <= 0 {
            default_limit
        } else {
            (limit as u64).min(max_limit)
        };
        Self { offset, limit }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

/// One page of results plus the total number of matching records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_offset_is_clamped_to_zero() {
        let page = PageRequest::clamped(-5, 20, 10, 100);
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 20);
    }

    #[test]
    fn non_positive_limit_falls_back_to_default() {
        assert_eq!(PageRequest::clamped(0, 0, 10, 100).limit(), 10);
        assert_eq!(PageRequest::clamped(0, -1, 10, 100).limit(), 10);
    }

    #[test]
    fn oversized_limit_is_capped() {
        assert_eq!(PageRequest::clamped(0, 5000, 10, 100).limit(), 100);
    }
}
