//! 规则定义模型
//!
//! 存储层保存的 JSON 规则树，只引用绑定名，由 [`crate::compiler::RuleCompiler`]
//! 解析为可编译的规则树。

use crate::operators::{LogicalOperator, Operator};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// 规则定义
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub id: String,
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub root: RuleNodeDefinition,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl RuleDefinition {
    pub fn new(name: impl Into<String>, root: RuleNodeDefinition) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            version: default_version(),
            root,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

/// 规则节点定义（条件或逻辑组）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleNodeDefinition {
    Condition(ConditionDefinition),
    Group(GroupDefinition),
}

/// 条件定义
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionDefinition {
    /// 绑定名
    pub field: String,
    pub operator: Operator,
    /// 空值检查操作符可以省略
    #[serde(default)]
    pub value: Value,
}

impl ConditionDefinition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

/// 逻辑组定义
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub operator: LogicalOperator,
    #[serde(default)]
    pub children: Vec<RuleNodeDefinition>,
}

impl GroupDefinition {
    pub fn new(operator: LogicalOperator, children: Vec<RuleNodeDefinition>) -> Self {
        Self { operator, children }
    }

    pub fn and(children: Vec<RuleNodeDefinition>) -> Self {
        Self::new(LogicalOperator::And, children)
    }

    pub fn or(children: Vec<RuleNodeDefinition>) -> Self {
        Self::new(LogicalOperator::Or, children)
    }
}

impl From<ConditionDefinition> for RuleNodeDefinition {
    fn from(condition: ConditionDefinition) -> Self {
        Self::Condition(condition)
    }
}

impl From<GroupDefinition> for RuleNodeDefinition {
    fn from(group: GroupDefinition) -> Self {
        Self::Group(group)
    }
}
