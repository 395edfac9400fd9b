// ==========================================
// 魔法搬运调度系统 - 列表查询构建
// ==========================================
// 职责: 将 (过滤条件, 分页, 排序) 编译为参数化 SQL
// 红线1: 过滤值一律走参数绑定，列名只来自字段白名单
// 红线2: total 与 results 使用同一个 WHERE 条件
// 红线3: 最终以 rowid (插入顺序) 作为排序兜底
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// 过滤条件: JSON 字段名 → 值
pub type QueryFilter = serde_json::Map<String, JsonValue>;

/// 默认页码
pub const DEFAULT_PAGE: i64 = 1;

/// 默认每页条数
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

// ==========================================
// 字段定义
// ==========================================

/// 字段匹配方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 文本: 大小写不敏感的子串匹配
    Text,
    /// 标识符: 精确匹配
    Identifier,
    /// 枚举: 精确匹配，且值必须在候选列表内
    Enum(&'static [&'static str]),
    /// 数值: 精确相等
    Number,
    /// 整数: 精确相等
    Integer,
    /// 时间戳: 前缀匹配 (例如 "2026-01-05" 匹配当天)
    Timestamp,
}

/// 可过滤/排序字段
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,   // 对外字段名 (camelCase)
    pub column: &'static str, // 数据库列名
    pub kind: FieldKind,
}

impl FieldDef {
    pub const fn new(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self { name, column, kind }
    }
}

fn lookup_field<'a>(fields: &'a [FieldDef], name: &str) -> Option<&'a FieldDef> {
    fields.iter().find(|f| f.name == name)
}

// ==========================================
// 分页 / 排序参数
// ==========================================

/// 列表查询选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListOptions {
    pub page: i64,
    pub limit: i64,
    pub sort: Option<String>, // 形如 "missionCount:desc,name"
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_LIMIT,
            sort: None,
        }
    }
}

impl ListOptions {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page,
            limit,
            sort: None,
        }
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// 校验分页参数并计算 OFFSET
    pub fn offset(&self) -> RepositoryResult<i64> {
        if self.page <= 0 {
            return Err(RepositoryError::InvalidQuery(format!(
                "page 必须大于 0: {}",
                self.page
            )));
        }
        if self.limit <= 0 {
            return Err(RepositoryError::InvalidQuery(format!(
                "limit 必须大于 0: {}",
                self.limit
            )));
        }

        (self.page - 1).checked_mul(self.limit).ok_or_else(|| {
            RepositoryError::InvalidQuery(format!(
                "分页超出范围: page={}, limit={}",
                self.page, self.limit
            ))
        })
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// 单个排序项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    /// 解析排序表达式
    ///
    /// 语法: 逗号分隔的 `field[:asc|desc]`，方向缺省为 asc，按从左到右的优先级
    pub fn parse_list(raw: &str) -> RepositoryResult<Vec<SortSpec>> {
        let mut specs = Vec::new();

        for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (field, direction) = match token.split_once(':') {
                Some((field, dir)) => {
                    let direction = match dir.trim().to_ascii_lowercase().as_str() {
                        "asc" => SortDirection::Asc,
                        "desc" => SortDirection::Desc,
                        other => {
                            return Err(RepositoryError::InvalidQuery(format!(
                                "无效的排序方向: {}",
                                other
                            )))
                        }
                    };
                    (field.trim(), direction)
                }
                None => (token, SortDirection::Asc),
            };

            if field.is_empty() {
                return Err(RepositoryError::InvalidQuery(format!(
                    "排序字段为空: {}",
                    token
                )));
            }

            specs.push(SortSpec {
                field: field.to_string(),
                direction,
            });
        }

        Ok(specs)
    }
}

// ==========================================
// 分页结果
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub results: Vec<T>,
}

// ==========================================
// 编译
// ==========================================

/// 编译后的查询片段
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    pub where_clause: String, // 含 "WHERE"，无条件时为空串
    pub order_clause: String, // 含 "ORDER BY"
    pub params: Vec<Value>,
}

/// 编译过滤条件
pub fn compile_filter(
    fields: &[FieldDef],
    filter: &QueryFilter,
) -> RepositoryResult<(String, Vec<Value>)> {
    let mut conditions = Vec::new();
    let mut params = Vec::new();

    for (key, value) in filter {
        let field = lookup_field(fields, key).ok_or_else(|| {
            RepositoryError::InvalidQuery(format!("未知的过滤字段: {}", key))
        })?;

        let type_error = |expected: &str| {
            RepositoryError::InvalidQuery(format!(
                "过滤字段 {} 需要 {}，实际为 {}",
                key, expected, value
            ))
        };

        match field.kind {
            FieldKind::Text => {
                let s = value.as_str().ok_or_else(|| type_error("字符串"))?;
                conditions.push(format!("instr(LOWER({}), LOWER(?)) > 0", field.column));
                params.push(Value::Text(s.to_string()));
            }
            FieldKind::Identifier => {
                let s = value.as_str().ok_or_else(|| type_error("字符串"))?;
                conditions.push(format!("{} = ?", field.column));
                params.push(Value::Text(s.to_string()));
            }
            FieldKind::Enum(allowed) => {
                let s = value.as_str().ok_or_else(|| type_error("字符串"))?;
                if !allowed.contains(&s) {
                    return Err(RepositoryError::InvalidQuery(format!(
                        "过滤字段 {} 的取值必须是 [{}] 之一: {}",
                        key,
                        allowed.join(", "),
                        s
                    )));
                }
                conditions.push(format!("{} = ?", field.column));
                params.push(Value::Text(s.to_string()));
            }
            FieldKind::Number => {
                let n = value.as_f64().ok_or_else(|| type_error("数值"))?;
                conditions.push(format!("{} = ?", field.column));
                params.push(Value::Real(n));
            }
            FieldKind::Integer => {
                let n = value.as_i64().ok_or_else(|| type_error("整数"))?;
                conditions.push(format!("{} = ?", field.column));
                params.push(Value::Integer(n));
            }
            FieldKind::Timestamp => {
                let s = value.as_str().ok_or_else(|| type_error("时间字符串"))?;
                conditions.push(format!("substr({}, 1, ?) = ?", field.column));
                params.push(Value::Integer(s.chars().count() as i64));
                params.push(Value::Text(s.to_string()));
            }
        }
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    Ok((where_clause, params))
}

/// 编译排序表达式（始终以 rowid 兜底）
pub fn compile_sort(fields: &[FieldDef], sort: Option<&str>) -> RepositoryResult<String> {
    let mut terms = Vec::new();

    if let Some(raw) = sort {
        for spec in SortSpec::parse_list(raw)? {
            let field = lookup_field(fields, &spec.field).ok_or_else(|| {
                RepositoryError::InvalidQuery(format!("未知的排序字段: {}", spec.field))
            })?;
            terms.push(format!("{} {}", field.column, spec.direction.as_sql()));
        }
    }

    terms.push("rowid ASC".to_string());
    Ok(format!("ORDER BY {}", terms.join(", ")))
}

/// 编译完整的列表查询
pub fn compile(
    fields: &[FieldDef],
    filter: &QueryFilter,
    options: &ListOptions,
) -> RepositoryResult<CompiledQuery> {
    let (where_clause, params) = compile_filter(fields, filter)?;
    let order_clause = compile_sort(fields, options.sort.as_deref())?;

    Ok(CompiledQuery {
        where_clause,
        order_clause,
        params,
    })
}

/// 执行分页查询
///
/// # 参数
/// - `table`: 表名
/// - `columns`: SELECT 列清单（需与 map_row 对齐）
/// - `fields`: 字段白名单
/// - `map_row`: 行映射
pub fn fetch_page<T, F>(
    conn: &Connection,
    table: &str,
    columns: &str,
    fields: &[FieldDef],
    filter: &QueryFilter,
    options: &ListOptions,
    map_row: F,
) -> RepositoryResult<PaginatedResult<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let offset = options.offset()?;
    let compiled = compile(fields, filter, options)?;

    let count_sql = format!("SELECT COUNT(*) FROM {} {}", table, compiled.where_clause);
    let total: i64 = conn.query_row(
        &count_sql,
        params_from_iter(compiled.params.iter()),
        |row| row.get(0),
    )?;

    let select_sql = format!(
        "SELECT {} FROM {} {} {} LIMIT ? OFFSET ?",
        columns, table, compiled.where_clause, compiled.order_clause
    );

    let mut params = compiled.params;
    params.push(Value::Integer(options.limit));
    params.push(Value::Integer(offset));

    let mut stmt = conn.prepare(&select_sql)?;
    let results = stmt
        .query_map(params_from_iter(params.iter()), map_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(PaginatedResult {
        total,
        page: options.page,
        limit: options.limit,
        results,
    })
}
