//! # Request Utilities
//!
//! Pagination, search and response helpers shared by every handler.

use axum::{http::StatusCode, Json};
use error::Result;
use sea_orm::{
    sea_query::LikeExpr,
    ConnectionTrait,
    DbErr,
    EntityTrait,
    FromQueryResult,
    PaginatorTrait,
    Select,
    SqlErr,
};
use serde::{Deserialize, Serialize};

/// Default page size for list endpoints
pub const DEFAULT_PER_PAGE: u64 = 20;
/// Upper bound on the page size a client may request
pub const MAX_PER_PAGE: u64 = 100;
/// Highest page number whose row offset still fits a signed 64-bit OFFSET
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PER_PAGE;

/// Pagination query parameters accepted by every list endpoint
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    /// Page number (1-based, default: 1)
    pub page:     Option<u64>,
    /// Items per page (default: 20, max: 100)
    pub per_page: Option<u64>,
}

impl PageParams {
    /// Get page number (1-based, default: 1, capped at [`MAX_PAGE`])
    pub fn page(&self) -> u64 { self.page.unwrap_or(1).clamp(1, MAX_PAGE) }

    /// Get items per page (default: 20, max: 100)
    pub fn per_page(&self) -> u64 { self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE) }
}

/// Pagination information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page number
    pub page:        u64,
    /// Items per page
    pub per_page:    u64,
    /// Total number of items
    pub total:       u64,
    /// Total number of pages
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(params: &PageParams, total: u64) -> Self {
        let per_page = params.per_page();
        Self {
            page: params.page(),
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }
}

/// One page of a list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items:      Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Convert every item, keeping the pagination.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items:      self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

/// Fetch one page of `select`, counting the full result set.
///
/// # Errors
///
/// Returns a database error if either query fails.
pub async fn paginate<'db, C, E, M>(db: &'db C, select: Select<E>, params: &PageParams) -> Result<Page<M>>
where
    C: ConnectionTrait,
    E: EntityTrait<Model = M>,
    M: FromQueryResult + Sized + Send + Sync + 'db,
{
    let paginator = select.paginate(db, params.per_page());
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(params.page() - 1).await?;

    Ok(Page {
        items,
        pagination: Pagination::new(params, total),
    })
}

/// Escape LIKE wildcards (`%`, `_` and the escape character itself)
pub fn escape_like_wildcards(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Substring pattern for a free-text search term, with wildcards escaped.
pub fn search_pattern(term: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like_wildcards(term.trim()))).escape('\\')
}

/// Normalized search term, `None` when blank
pub fn search_term(search: Option<&String>) -> Option<&str> {
    search.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Generic success message body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

/// Whether an insert failed because another writer got the unique row in first
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// `201 Created` with a JSON body
pub fn created<T>(body: T) -> (StatusCode, Json<T>) { (StatusCode::CREATED, Json(body)) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params_defaults() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), 20);
    }

    #[test]
    fn test_page_params_clamped() {
        let params = PageParams {
            page:     Some(0),
            per_page: Some(1000),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), 100);
    }

    #[test]
    fn test_huge_page_offset_fits() {
        let params = PageParams {
            page:     Some(u64::MAX),
            per_page: Some(u64::MAX),
        };
        assert_eq!(params.page(), MAX_PAGE);
        let offset = (params.page() - 1).checked_mul(params.per_page());
        assert!(offset.is_some_and(|offset| offset <= i64::MAX as u64));
    }

    #[test]
    fn test_pagination_total_pages() {
        let params = PageParams {
            page:     Some(2),
            per_page: Some(10),
        };
        assert_eq!(Pagination::new(&params, 0).total_pages, 0);
        assert_eq!(Pagination::new(&params, 10).total_pages, 1);
        assert_eq!(Pagination::new(&params, 11).total_pages, 2);
    }

    #[test]
    fn test_is_unique_violation() {
        assert!(!is_unique_violation(&DbErr::RecordNotFound("profile".to_string())));
    }

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like_wildcards("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like_wildcards("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_search_term() {
        assert_eq!(search_term(Some(&"  acme ".to_string())), Some("acme"));
        assert_eq!(search_term(Some(&"   ".to_string())), None);
        assert_eq!(search_term(None), None);
    }
}
