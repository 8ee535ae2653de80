use serde::Serialize;

pub const DEFAULT_PAGE_NUM: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// 分页请求（pageNum 从 1 开始）
///
/// 缺省或 ≤0 的页码按 1 处理，缺省或 ≤0 的每页条数按 10 处理。
///
/// # Examples
///
/// ```
/// use alertdesk_alert::PageRequest;
///
/// let page = PageRequest::new(Some(3), Some(10));
/// assert_eq!(page.offset(), 20);
///
/// let coerced = PageRequest::new(Some(0), Some(-5));
/// assert_eq!((coerced.page_num, coerced.page_size), (1, 10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_num: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub fn new(page_num: Option<i64>, page_size: Option<i64>) -> Self {
        let coerce = |value: Option<i64>, default: u64| match value {
            Some(v) if v > 0 => v as u64,
            _ => default,
        };
        Self {
            page_num: coerce(page_num, DEFAULT_PAGE_NUM),
            page_size: coerce(page_size, DEFAULT_PAGE_SIZE),
        }
    }

    /// Row offset of the first item on this page. Saturates instead of
    /// overflowing; the result never exceeds `i64::MAX`, the largest offset a
    /// SQL backend accepts.
    pub fn offset(&self) -> u64 {
        (self.page_num - 1)
            .saturating_mul(self.page_size)
            .min(i64::MAX as u64)
    }

    pub fn limit(&self) -> u64 {
        self.page_size.min(i64::MAX as u64)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_num: DEFAULT_PAGE_NUM,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the total match count.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page_num: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            data,
            total,
            page_num: request.page_num,
            page_size: request.page_size,
        }
    }

    /// Number of pages needed to hold `total` items.
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.page_size.max(1))
    }
}
