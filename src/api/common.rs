// ==========================================
// 魔法搬运调度系统 - API 公共部分
// ==========================================
// 职责: 列表请求参数、过滤条件与负载解码
// ==========================================

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::error::{ApiError, ApiResult, ValidationViolation};
use crate::repository::query::{ListOptions, QueryFilter, DEFAULT_PAGE};

/// 列表请求（字段缺省时使用默认值）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListRequest {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
}

impl ListRequest {
    pub fn page(page: i64, limit: i64) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            sort: None,
        }
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// 转换为仓储查询选项
    ///
    /// 显式传入的 0 / 负数不做修正，交由仓储报 InvalidQuery
    pub fn to_options(&self, default_limit: i64) -> ListOptions {
        ListOptions {
            page: self.page.unwrap_or(DEFAULT_PAGE),
            limit: self.limit.unwrap_or(default_limit),
            sort: self.sort.clone(),
        }
    }
}

/// 解析过滤条件: null 视为无条件，其余必须是 JSON 对象
pub(crate) fn parse_filter(filter: &Value) -> ApiResult<QueryFilter> {
    match filter {
        Value::Null => Ok(QueryFilter::new()),
        Value::Object(map) => Ok(map.clone()),
        other => Err(ApiError::InvalidQuery(format!(
            "过滤条件必须是对象: {}",
            other
        ))),
    }
}

/// 将已通过校验的负载解码为领域结构
pub(crate) fn decode_payload<T: DeserializeOwned>(payload: &Value) -> ApiResult<T> {
    serde_json::from_value(payload.clone())
        .map_err(|e| ApiError::ValidationFailed(ValidationViolation::new("value", e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_request_defaults() {
        let options = ListRequest::default().to_options(10);
        assert_eq!(options, ListOptions::new(1, 10));

        let options = ListRequest::page(3, 0).with_sort("name").to_options(10);
        assert_eq!(options.page, 3);
        assert_eq!(options.limit, 0);
        assert_eq!(options.sort.as_deref(), Some("name"));
    }

    #[test]
    fn test_parse_filter() {
        assert!(parse_filter(&Value::Null).unwrap().is_empty());
        assert_eq!(parse_filter(&json!({"name": "a"})).unwrap().len(), 1);
        assert!(matches!(
            parse_filter(&json!("name=a")),
            Err(ApiError::InvalidQuery(_))
        ));
    }
}
