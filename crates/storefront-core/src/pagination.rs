use serde::Serialize;

use crate::CoreError;

pub const DEFAULT_OFFSET: u64 = 0;
pub const DEFAULT_LIMIT: u64 = 10;

/// Validated `offset` / `limit` query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: DEFAULT_OFFSET,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Applies defaults (`offset = 0`, `limit = 10`) and rejects negative
    /// offsets and non-positive limits.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPagination`] naming the offending field.
    pub fn from_query(offset: Option<i64>, limit: Option<i64>) -> Result<Self, CoreError> {
        let offset = match offset {
            None => DEFAULT_OFFSET,
            Some(v) => u64::try_from(v).map_err(|_| CoreError::InvalidPagination {
                field: "offset",
                constraint: "zero or greater",
                value: v,
            })?,
        };
        let limit = match limit {
            None => DEFAULT_LIMIT,
            Some(v) if v >= 1 => v.unsigned_abs(),
            Some(v) => {
                return Err(CoreError::InvalidPagination {
                    field: "limit",
                    constraint: "at least 1",
                    value: v,
                })
            }
        };
        Ok(Self { offset, limit })
    }
}

/// Paginated response envelope: `{data, offset, limit, total}`.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T: Serialize> {
    pub data: Vec<T>,
    pub offset: u64,
    pub limit: u64,
    pub total: u64,
}

impl<T: Serialize> Page<T> {
    #[must_use]
    pub fn new(data: Vec<T>, pagination: Pagination, total: u64) -> Self {
        Self {
            data,
            offset: pagination.offset,
            limit: pagination.limit,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_absent() {
        assert_eq!(
            Pagination::from_query(None, None),
            Ok(Pagination {
                offset: 0,
                limit: 10
            })
        );
    }

    #[test]
    fn explicit_values_pass_through() {
        assert_eq!(
            Pagination::from_query(Some(20), Some(5)),
            Ok(Pagination {
                offset: 20,
                limit: 5
            })
        );
    }

    #[test]
    fn negative_offset_is_rejected() {
        let err = Pagination::from_query(Some(-1), None).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPagination { field: "offset", .. }));
    }

    #[test]
    fn zero_limit_is_rejected() {
        let err = Pagination::from_query(None, Some(0)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPagination { field: "limit", .. }));
    }

    #[test]
    fn page_envelope_serializes_all_fields() {
        let page = Page::new(vec!["a", "b"], Pagination::default(), 42);
        let json = serde_json::to_value(&page).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"data": ["a", "b"], "offset": 0, "limit": 10, "total": 42})
        );
    }
}
