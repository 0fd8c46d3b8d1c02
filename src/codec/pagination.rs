//! Codec for pagination.
//!
//! The wire `page` is 1-based while the in-memory `page_index` is 0-based.
//! The first page and the default page size are the implicit defaults and
//! are never written, to keep URLs short.

use crate::state::Pagination;

pub fn serialize(pagination: &Pagination, default_size: usize) -> (Option<u64>, Option<u64>) {
    let page = if pagination.page_index == 0 {
        None
    } else {
        Some(pagination.page_index as u64 + 1)
    };
    let size = if pagination.page_size == default_size || pagination.page_size == 0 {
        None
    } else {
        Some(pagination.page_size as u64)
    };
    (page, size)
}

pub fn parse(page: Option<u64>, size: Option<u64>, default_size: usize) -> Pagination {
    let page_index = match page {
        Some(p) if p >= 1 => (p - 1) as usize,
        _ => 0,
    };
    let page_size = match size {
        Some(s) if s >= 1 => s as usize,
        _ => default_size,
    };
    Pagination {
        page_index,
        page_size,
    }
}
