// ==========================================
// 魔法搬运调度系统 - 物品领域模型
// ==========================================
// 物品被搬运者的货物条目"引用"而非"持有":
// 装载时复制重量，此后物品的修改/删除不影响已装载货物
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Item - 货物物品
// ==========================================
// 对齐: magic_item 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,   // 物品ID (UUID)
    pub name: String, // 名称
    pub weight: f64,  // 重量 (≥ 0)
}

/// 新建物品的数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    pub weight: f64,
}

/// 物品部分更新
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    pub name: Option<String>,
    pub weight: Option<f64>,
}
