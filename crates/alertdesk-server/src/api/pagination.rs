use alertdesk_alert::{AlertError, PageRequest};
use serde::Deserialize;
use utoipa::IntoParams;

/// A page parameter as sent: JSON number or (query string) text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PageValue {
    Number(i64),
    Text(String),
}

impl PageValue {
    fn resolve(&self, field: &str) -> Result<Option<i64>, AlertError> {
        match self {
            PageValue::Number(n) => Ok(Some(*n)),
            PageValue::Text(text) => parse_page_text(field, text),
        }
    }
}

/// Blank text means "not given"; anything else must be an integer.
pub fn parse_page_text(field: &str, text: &str) -> Result<Option<i64>, AlertError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<i64>()
        .map(Some)
        .map_err(|_| AlertError::validation(format!("{field} must be an integer, got '{text}'")))
}

/// 分页参数（pageNum 从 1 开始）
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    /// 页码（默认 1，≤0 按 1 处理）
    #[param(required = false, value_type = Option<i64>)]
    #[serde(default)]
    pub page_num: Option<PageValue>,
    /// 每页条数（默认 10，≤0 按 10 处理）
    #[param(required = false, value_type = Option<i64>)]
    #[serde(default)]
    pub page_size: Option<PageValue>,
}

impl PageParams {
    pub fn page_request(&self) -> Result<PageRequest, AlertError> {
        let page_num = match &self.page_num {
            Some(v) => v.resolve("pageNum")?,
            None => None,
        };
        let page_size = match &self.page_size {
            Some(v) => v.resolve("pageSize")?,
            None => None,
        };
        Ok(PageRequest::new(page_num, page_size))
    }
}
