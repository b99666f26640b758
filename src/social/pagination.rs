use serde::Serialize;

use crate::util::QueryParams;

pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// Per-endpoint caps on `limit`.
pub const REVIEW_PAGE_CAP: usize = 50;
pub const COMMENT_PAGE_CAP: usize = 50;
pub const POST_PAGE_CAP: usize = 50;
pub const BOOKMARK_PAGE_CAP: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    /// `page` becomes an integer >= 1, `limit` an integer in `[1, cap]`.
    pub fn new(page: Option<f64>, limit: Option<f64>, cap: usize) -> Self {
        let cap = cap.max(1);
        let page = page.map(|p| p.trunc().max(1.0) as usize).unwrap_or(1);
        let limit = limit
            .map(|l| l.trunc().clamp(1.0, cap as f64) as usize)
            .unwrap_or(DEFAULT_PAGE_LIMIT.min(cap));
        Self { page, limit }
    }

    pub fn from_params(params: &QueryParams, cap: usize) -> Self {
        Self::new(params.get_number("page"), params.get_number("limit"), cap)
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
        }
    }

    /// Never less than one, even for an empty list.
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.limit).max(1)
    }
}

/// Slice an already filtered and sorted list. `total` is the full length.
pub fn paginate<T>(items: Vec<T>, req: PageRequest) -> Page<T> {
    let total = items.len();
    let items = items
        .into_iter()
        .skip(req.offset())
        .take(req.limit)
        .collect();

    Page {
        items,
        page: req.page,
        limit: req.limit,
        total,
    }
}
