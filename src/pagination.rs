use serde::Deserialize;

use crate::error::{AppError, AppResult};

pub const DEFAULT_PER_PAGE: u64 = 10;
pub const MAX_PER_PAGE: u64 = 20;

/// Raw `?page=&per_page=` values. Signed so that negative input reaches
/// [`PageQuery::validate`] instead of failing in the extractor.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    page: i64,
    #[serde(default = "default_per_page")]
    per_page: i64,
}

fn first_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    DEFAULT_PER_PAGE as i64
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: first_page(), per_page: default_per_page() }
    }
}

impl PageQuery {
    #[cfg(test)]
    pub fn new(page: i64, per_page: i64) -> Self {
        Self { page, per_page }
    }

    pub fn validate(self) -> AppResult<Self> {
        if self.page < 1 {
            return Err(AppError::invalid("page must be greater than or equal to 1"));
        }
        if !(1..=MAX_PER_PAGE as i64).contains(&self.per_page) {
            return Err(AppError::invalid(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}"
            )));
        }
        Ok(self)
    }

    /// Only meaningful after [`PageQuery::validate`].
    pub fn page(&self) -> u64 {
        self.page.unsigned_abs()
    }

    pub fn per_page(&self) -> u64 {
        self.per_page.unsigned_abs()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageWindow {
    pub page: u64,
    pub per_page: u64,
    pub offset: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub valid: bool,
}

impl PageWindow {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// An empty catalog is a valid (empty) page rather than an error.
    pub fn ensure_valid(self) -> AppResult<Self> {
        if self.valid { Ok(self) } else { Err(AppError::OutOfRangePage) }
    }
}

/// `per_page` must already be at least 1; see [`PageQuery::validate`].
pub fn paginate(total_items: u64, page: u64, per_page: u64) -> PageWindow {
    let total_pages = total_items.div_ceil(per_page);
    PageWindow {
        page,
        per_page,
        offset: page.saturating_sub(1).saturating_mul(per_page),
        total_items,
        total_pages,
        valid: total_pages == 0 || page <= total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        for per_page in 1..=MAX_PER_PAGE {
            for total in 0..=65u64 {
                let w = paginate(total, 1, per_page);
                let expected = if total == 0 { 0 } else { (total + per_page - 1) / per_page };
                assert_eq!(w.total_pages, expected, "total={total} per_page={per_page}");
            }
        }
    }

    #[test]
    fn offset_of_every_valid_page_is_inside_the_collection() {
        for per_page in 1..=MAX_PER_PAGE {
            for total in 1..=65u64 {
                let pages = paginate(total, 1, per_page).total_pages;
                for page in 1..=pages {
                    let w = paginate(total, page, per_page);
                    assert!(w.valid);
                    assert_eq!(w.offset, (page - 1) * per_page);
                    assert!(w.offset < total);
                }
            }
        }
    }

    #[test]
    fn twenty_five_items_in_pages_of_ten() {
        let first = paginate(25, 1, 10);
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.offset, 0);
        assert!(first.has_next());
        assert!(!first.has_prev());

        let last = paginate(25, 3, 10);
        assert_eq!(last.offset, 20);
        assert!(!last.has_next());
        assert!(last.has_prev());

        let past = paginate(25, 4, 10);
        assert!(!past.valid);
        assert!(matches!(past.ensure_valid(), Err(AppError::OutOfRangePage)));
    }

    #[test]
    fn empty_catalog_is_never_out_of_range() {
        let w = paginate(0, 1, 10);
        assert_eq!(w.total_pages, 0);
        assert!(w.ensure_valid().is_ok());
        assert!(!w.has_next());

        assert!(paginate(0, 3, 10).valid);
    }

    #[test]
    fn query_bounds() {
        assert!(PageQuery::default().validate().is_ok());
        assert!(PageQuery::new(1, 20).validate().is_ok());
        assert!(matches!(PageQuery::new(0, 10).validate(), Err(AppError::InvalidRequest(_))));
        assert!(matches!(PageQuery::new(1, 0).validate(), Err(AppError::InvalidRequest(_))));
        assert!(matches!(PageQuery::new(1, 21).validate(), Err(AppError::InvalidRequest(_))));
        assert!(matches!(PageQuery::new(-1, 10).validate(), Err(AppError::InvalidRequest(_))));
        assert!(matches!(PageQuery::new(1, -5).validate(), Err(AppError::InvalidRequest(_))));

        let q = PageQuery::new(3, 15).validate().unwrap();
        assert_eq!((q.page(), q.per_page()), (3, 15));
    }
}
