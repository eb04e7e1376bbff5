//! 规则引擎错误类型
//!
//! 所有错误都在规则构造或编译时同步产生，确定且不可重试。

use crate::operators::Operator;
use crate::value::RuleValueKind;
use thiserror::Error;

/// 查询转换器返回的错误，原样透传给调用方
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("查询转换失败 [{target}]: {message}")]
pub struct TranslationError {
    /// 转换目标，例如存储名称
    pub target: String,
    pub message: String,
}

impl TranslationError {
    pub fn new(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("无效的操作符: 字段 {binding} 的值域 {kind} 不支持 {operator}")]
    Configuration {
        binding: String,
        kind: RuleValueKind,
        operator: Operator,
    },

    #[error("无效的规则值: 字段 {binding} 的 {operator} 条件: {reason}")]
    InvalidRuleValue {
        binding: String,
        operator: Operator,
        reason: String,
    },

    #[error("字段绑定不存在: {0}")]
    UnresolvedBinding(String),

    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error("无效的规则定义: {0}")]
    InvalidDefinition(String),

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),
}

impl RuleError {
    /// 稳定的错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "RULE_CONFIGURATION",
            Self::InvalidRuleValue { .. } => "INVALID_RULE_VALUE",
            Self::UnresolvedBinding(_) => "UNRESOLVED_BINDING",
            Self::Translation(_) => "TRANSLATION_FAILED",
            Self::InvalidDefinition(_) => "INVALID_DEFINITION",
            Self::Json(_) => "JSON_ERROR",
        }
    }

    /// 在错误信息前附加规则定义中的节点路径
    pub(crate) fn at(self, path: &str) -> Self {
        match self {
            Self::InvalidRuleValue {
                binding,
                operator,
                reason,
            } => Self::InvalidRuleValue {
                binding,
                operator,
                reason: format!("{reason} (节点 {path})"),
            },
            Self::UnresolvedBinding(name) => Self::UnresolvedBinding(format!("{name} (节点 {path})")),
            Self::Configuration {
                binding,
                kind,
                operator,
            } => Self::Configuration {
                binding: format!("{binding} (节点 {path})"),
                kind,
                operator,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;
