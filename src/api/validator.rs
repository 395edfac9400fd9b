// ==========================================
// 魔法搬运调度系统 - 请求负载校验器
// ==========================================
// 职责: 按字段类型 schema 校验 JSON 负载，只返回第一个违规
// 红线: 校验失败的请求不得进入仓储或引擎
// ==========================================
// 消息格式: "<字段路径>" <原因>，例如
// - "name" is required
// - "weight" must be a number
// - "cargo[0].itemId" must be a string
// ==========================================

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::error::ValidationViolation;

// ==========================================
// ValidationMode - 校验模式
// ==========================================

/// 校验模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationMode {
    /// 严格模式：schema 中每个字段都必须出现（创建）
    Strict,
    /// 部分模式：顶层字段可任选子集（更新），嵌套对象仍按严格模式
    Partial,
}

// ==========================================
// Schema 定义
// ==========================================

/// 字段类型
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    /// 嵌套对象（按子 schema 严格校验）
    Object(&'static [FieldSpec]),
    /// 数组；元素 schema 为 None 时元素任意
    Array(Option<&'static [FieldSpec]>),
}

/// 单个字段
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
}

impl FieldSpec {
    pub const fn new(name: &'static str, field_type: FieldType) -> Self {
        Self { name, field_type }
    }
}

/// 物品负载
pub const ITEM_SCHEMA: &[FieldSpec] = &[
    FieldSpec::new("name", FieldType::String),
    FieldSpec::new("weight", FieldType::Number),
];

/// 搬运者负载
pub const MOVER_SCHEMA: &[FieldSpec] = &[
    FieldSpec::new("name", FieldType::String),
    FieldSpec::new("weightLimit", FieldType::Number),
];

/// 任务日志负载
pub const MISSION_LOG_SCHEMA: &[FieldSpec] = &[
    FieldSpec::new("moverId", FieldType::String),
    FieldSpec::new("activity", FieldType::String),
];

// ==========================================
// PayloadValidator - 负载校验器
// ==========================================

/// 负载校验器
///
/// 校验顺序: 先按 schema 字段顺序检查，再检查未声明字段
#[derive(Debug, Clone, Default)]
pub struct PayloadValidator {
    allow_unknown_fields: bool,
}

impl PayloadValidator {
    pub fn new(allow_unknown_fields: bool) -> Self {
        Self {
            allow_unknown_fields,
        }
    }

    /// 校验负载
    ///
    /// # 返回
    /// - Ok(()): 校验通过
    /// - Err(ValidationViolation): 第一个违规
    pub fn validate(
        &self,
        payload: &Value,
        schema: &[FieldSpec],
        mode: ValidationMode,
    ) -> Result<(), ValidationViolation> {
        let object = payload
            .as_object()
            .ok_or_else(|| violation("value", "must be of type object"))?;

        self.validate_object(object, schema, "", mode)
    }

    fn validate_object(
        &self,
        object: &Map<String, Value>,
        schema: &[FieldSpec],
        prefix: &str,
        mode: ValidationMode,
    ) -> Result<(), ValidationViolation> {
        for spec in schema {
            let path = join_path(prefix, spec.name);
            match object.get(spec.name) {
                Some(value) => self.validate_value(value, spec.field_type, &path)?,
                None if mode == ValidationMode::Strict => {
                    return Err(violation(&path, "is required"));
                }
                None => {}
            }
        }

        if !self.allow_unknown_fields {
            if let Some(unknown) = object
                .keys()
                .find(|key| !schema.iter().any(|spec| spec.name == key.as_str()))
            {
                return Err(violation(&join_path(prefix, unknown), "is not allowed"));
            }
        }

        Ok(())
    }

    fn validate_value(
        &self,
        value: &Value,
        field_type: FieldType,
        path: &str,
    ) -> Result<(), ValidationViolation> {
        match field_type {
            FieldType::String => match value {
                Value::String(s) if s.is_empty() => {
                    Err(violation(path, "is not allowed to be empty"))
                }
                Value::String(_) => Ok(()),
                _ => Err(violation(path, "must be a string")),
            },
            FieldType::Number => match value {
                Value::Number(_) => Ok(()),
                _ => Err(violation(path, "must be a number")),
            },
            FieldType::Boolean => match value {
                Value::Bool(_) => Ok(()),
                _ => Err(violation(path, "must be a boolean")),
            },
            FieldType::Date => {
                if is_valid_date(value) {
                    Ok(())
                } else {
                    Err(violation(path, "must be a valid date"))
                }
            }
            FieldType::Object(children) => {
                let object = value
                    .as_object()
                    .ok_or_else(|| violation(path, "must be of type object"))?;
                self.validate_object(object, children, path, ValidationMode::Strict)
            }
            FieldType::Array(items) => {
                let elements = value
                    .as_array()
                    .ok_or_else(|| violation(path, "must be an array"))?;

                if let Some(children) = items {
                    for (index, element) in elements.iter().enumerate() {
                        let element_path = format!("{}[{}]", path, index);
                        let object = element
                            .as_object()
                            .ok_or_else(|| violation(&element_path, "must be of type object"))?;
                        self.validate_object(
                            object,
                            children,
                            &element_path,
                            ValidationMode::Strict,
                        )?;
                    }
                }
                Ok(())
            }
        }
    }
}

// ==========================================
// 领域取值规则（在 schema 校验之后执行，字段缺失时跳过）
// ==========================================

/// 数值必须 ≥ min
pub fn require_min(payload: &Value, field: &str, min: f64) -> Result<(), ValidationViolation> {
    match payload.get(field).and_then(Value::as_f64) {
        Some(n) if n < min => Err(violation(
            field,
            &format!("must be greater than or equal to {}", min),
        )),
        _ => Ok(()),
    }
}

/// 数值必须 > 0
pub fn require_positive(payload: &Value, field: &str) -> Result<(), ValidationViolation> {
    match payload.get(field).and_then(Value::as_f64) {
        Some(n) if n <= 0.0 => Err(violation(field, "must be a positive number")),
        _ => Ok(()),
    }
}

/// 字符串必须为候选值之一
pub fn require_one_of(
    payload: &Value,
    field: &str,
    allowed: &[&str],
) -> Result<(), ValidationViolation> {
    match payload.get(field).and_then(Value::as_str) {
        Some(s) if !allowed.contains(&s) => Err(violation(
            field,
            &format!("must be one of [{}]", allowed.join(", ")),
        )),
        _ => Ok(()),
    }
}

// ==========================================
// 辅助函数
// ==========================================

fn violation(path: &str, reason: &str) -> ValidationViolation {
    ValidationViolation::new(path, format!("\"{}\" {}", path, reason))
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// 日期: RFC3339 / `YYYY-MM-DD` / `YYYY-MM-DDTHH:MM:SS[.f]` 字符串，或毫秒时间戳
fn is_valid_date(value: &Value) -> bool {
    match value {
        Value::String(s) => {
            DateTime::parse_from_rfc3339(s).is_ok()
                || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
                || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        }
        Value::Number(n) => n
            .as_i64()
            .map(|ms| DateTime::<Utc>::from_timestamp_millis(ms).is_some())
            .unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CARGO_ENTRY: &[FieldSpec] = &[
        FieldSpec::new("itemId", FieldType::String),
        FieldSpec::new("weight", FieldType::Number),
    ];

    const HOME: &[FieldSpec] = &[FieldSpec::new("city", FieldType::String)];

    const RICH_SCHEMA: &[FieldSpec] = &[
        FieldSpec::new("name", FieldType::String),
        FieldSpec::new("active", FieldType::Boolean),
        FieldSpec::new("since", FieldType::Date),
        FieldSpec::new("home", FieldType::Object(HOME)),
        FieldSpec::new("tags", FieldType::Array(None)),
        FieldSpec::new("cargo", FieldType::Array(Some(CARGO_ENTRY))),
    ];

    fn message(result: Result<(), ValidationViolation>) -> String {
        result.unwrap_err().message
    }

    fn valid_rich() -> Value {
        json!({
            "name": "Atlas",
            "active": true,
            "since": "2026-01-05",
            "home": {"city": "Lyon"},
            "tags": ["a", 1],
            "cargo": [{"itemId": "i1", "weight": 3}]
        })
    }

    #[test]
    fn test_valid_payload_passes() {
        let validator = PayloadValidator::default();
        assert!(validator
            .validate(&valid_rich(), RICH_SCHEMA, ValidationMode::Strict)
            .is_ok());
    }

    #[test]
    fn test_required_and_type_messages() {
        let validator = PayloadValidator::default();

        assert_eq!(
            message(validator.validate(&json!({"weight": 1}), ITEM_SCHEMA, ValidationMode::Strict)),
            "\"name\" is required"
        );
        assert_eq!(
            message(validator.validate(
                &json!({"name": "Box", "weight": "heavy"}),
                ITEM_SCHEMA,
                ValidationMode::Strict
            )),
            "\"weight\" must be a number"
        );
        assert_eq!(
            message(validator.validate(
                &json!({"name": "", "weight": 1}),
                ITEM_SCHEMA,
                ValidationMode::Strict
            )),
            "\"name\" is not allowed to be empty"
        );
        assert_eq!(
            message(validator.validate(&json!([1, 2]), ITEM_SCHEMA, ValidationMode::Strict)),
            "\"value\" must be of type object"
        );
    }

    #[test]
    fn test_nested_paths_in_messages() {
        let validator = PayloadValidator::default();

        let mut payload = valid_rich();
        payload["tags"] = json!("not-a-list");
        assert_eq!(
            message(validator.validate(&payload, RICH_SCHEMA, ValidationMode::Strict)),
            "\"tags\" must be an array"
        );

        let mut payload = valid_rich();
        payload["cargo"] = json!([{"itemId": "i1", "weight": 1}, {"itemId": 7, "weight": 1}]);
        assert_eq!(
            message(validator.validate(&payload, RICH_SCHEMA, ValidationMode::Strict)),
            "\"cargo[1].itemId\" must be a string"
        );

        let mut payload = valid_rich();
        payload["home"] = json!({});
        assert_eq!(
            message(validator.validate(&payload, RICH_SCHEMA, ValidationMode::Partial)),
            "\"home.city\" is required"
        );

        let mut payload = valid_rich();
        payload["since"] = json!("yesterday");
        assert_eq!(
            message(validator.validate(&payload, RICH_SCHEMA, ValidationMode::Strict)),
            "\"since\" must be a valid date"
        );

        let mut payload = valid_rich();
        payload["active"] = json!("yes");
        assert_eq!(
            message(validator.validate(&payload, RICH_SCHEMA, ValidationMode::Strict)),
            "\"active\" must be a boolean"
        );
    }

    #[test]
    fn test_partial_mode_accepts_subset() {
        let validator = PayloadValidator::default();
        assert!(validator
            .validate(&json!({"weightLimit": 5}), MOVER_SCHEMA, ValidationMode::Partial)
            .is_ok());
        assert!(validator
            .validate(&json!({}), MOVER_SCHEMA, ValidationMode::Partial)
            .is_ok());
        assert_eq!(
            message(validator.validate(
                &json!({"weightLimit": null}),
                MOVER_SCHEMA,
                ValidationMode::Partial
            )),
            "\"weightLimit\" must be a number"
        );
    }

    #[test]
    fn test_unknown_fields() {
        let payload = json!({"name": "Box", "weight": 1, "x": true});

        let strict = PayloadValidator::new(false);
        assert_eq!(
            message(strict.validate(&payload, ITEM_SCHEMA, ValidationMode::Strict)),
            "\"x\" is not allowed"
        );

        let lenient = PayloadValidator::new(true);
        assert!(lenient
            .validate(&payload, ITEM_SCHEMA, ValidationMode::Strict)
            .is_ok());
    }

    #[test]
    fn test_range_rules() {
        assert_eq!(
            message(require_min(&json!({"weight": -0.5}), "weight", 0.0)),
            "\"weight\" must be greater than or equal to 0"
        );
        assert!(require_min(&json!({"weight": 0}), "weight", 0.0).is_ok());

        assert_eq!(
            message(require_positive(&json!({"weightLimit": 0}), "weightLimit")),
            "\"weightLimit\" must be a positive number"
        );
        assert!(require_positive(&json!({}), "weightLimit").is_ok());

        assert_eq!(
            message(require_one_of(
                &json!({"activity": "flying"}),
                "activity",
                &["resting", "loading", "on-mission"]
            )),
            "\"activity\" must be one of [resting, loading, on-mission]"
        );
    }
}
