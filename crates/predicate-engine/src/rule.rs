//! 规则与规则组
//!
//! `Rule` 在构造时完成全部校验：先检查操作符与值域是否兼容，再转换规则值。
//! 因此一棵构造成功的规则树编译时不会失败。

use crate::binding::{BindingSource, FieldBinding};
use crate::error::{Result, RuleError};
use crate::expr::{ConditionLabel, Expr, Operand};
use crate::operators::{LogicalOperator, Operator};
use crate::predicate::CompiledPredicate;
use crate::value::RuleValue;
use std::sync::Arc;

/// 单条规则：{绑定, 操作符, 值}
#[derive(Debug)]
pub struct Rule<E> {
    binding: FieldBinding<E>,
    operator: Operator,
    value: RuleValue,
}

impl<E> Rule<E> {
    pub fn new(
        binding: FieldBinding<E>,
        operator: Operator,
        value: impl Into<RuleValue>,
    ) -> Result<Self> {
        let kind = binding.kind();
        if !kind.supports(operator) {
            return Err(RuleError::Configuration {
                binding: binding.name().to_string(),
                kind,
                operator,
            });
        }

        let value = kind
            .coerce_operand(operator, value.into())
            .map_err(|reason| RuleError::InvalidRuleValue {
                binding: binding.name().to_string(),
                operator,
                reason,
            })?;

        Ok(Self {
            binding,
            operator,
            value,
        })
    }

    pub fn binding(&self) -> &FieldBinding<E> {
        &self.binding
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// 转换后的规则值
    pub fn value(&self) -> &RuleValue {
        &self.value
    }

    pub fn compile(&self) -> CompiledPredicate<E> {
        CompiledPredicate::new(self.to_expr())
    }

    pub(crate) fn to_expr(&self) -> Expr<E> {
        let literal = Operand::Literal(self.value.clone());
        let body = match self.binding.source() {
            BindingSource::Scalar(accessor) => {
                self.operator.build(Operand::Field(accessor.clone()), literal)
            }
            BindingSource::Quantified {
                quantifier,
                projection,
            } => Expr::Quantified {
                binding: Arc::from(self.binding.name()),
                quantifier: *quantifier,
                source: projection.clone(),
                predicate: Box::new(self.operator.build(Operand::Element, literal)),
            },
        };

        Expr::Condition {
            label: ConditionLabel {
                binding: Arc::from(self.binding.name()),
                operator: self.operator,
                value: self.value.clone(),
            },
            body: Box::new(body),
        }
    }
}

impl<E> Clone for Rule<E> {
    fn clone(&self) -> Self {
        Self {
            binding: self.binding.clone(),
            operator: self.operator,
            value: self.value.clone(),
        }
    }
}

/// 规则组
#[derive(Debug)]
pub struct RuleGroup<E> {
    operator: LogicalOperator,
    children: Vec<RuleNode<E>>,
}

impl<E> RuleGroup<E> {
    pub fn new(operator: LogicalOperator, children: Vec<RuleNode<E>>) -> Self {
        Self { operator, children }
    }

    pub fn and(children: Vec<RuleNode<E>>) -> Self {
        Self::new(LogicalOperator::And, children)
    }

    pub fn or(children: Vec<RuleNode<E>>) -> Self {
        Self::new(LogicalOperator::Or, children)
    }

    /// 追加子节点
    pub fn push(mut self, node: impl Into<RuleNode<E>>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn operator(&self) -> LogicalOperator {
        self.operator
    }

    pub fn children(&self) -> &[RuleNode<E>] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn compile(&self) -> CompiledPredicate<E> {
        CompiledPredicate::new(self.to_expr())
    }

    // 子节点按原顺序放入同一个列表节点，空组取中性值
    pub(crate) fn to_expr(&self) -> Expr<E> {
        if self.children.is_empty() {
            return Expr::Const(self.operator.identity());
        }
        let children = self.children.iter().map(RuleNode::to_expr).collect();
        match self.operator {
            LogicalOperator::And => Expr::And(children),
            LogicalOperator::Or => Expr::Or(children),
        }
    }
}

impl<E> Clone for RuleGroup<E> {
    fn clone(&self) -> Self {
        Self {
            operator: self.operator,
            children: self.children.clone(),
        }
    }
}

/// 规则节点（规则或规则组）
#[derive(Debug)]
pub enum RuleNode<E> {
    Rule(Rule<E>),
    Group(RuleGroup<E>),
}

impl<E> RuleNode<E> {
    pub fn compile(&self) -> CompiledPredicate<E> {
        CompiledPredicate::new(self.to_expr())
    }

    pub(crate) fn to_expr(&self) -> Expr<E> {
        match self {
            Self::Rule(rule) => rule.to_expr(),
            Self::Group(group) => group.to_expr(),
        }
    }
}

impl<E> Clone for RuleNode<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Rule(rule) => Self::Rule(rule.clone()),
            Self::Group(group) => Self::Group(group.clone()),
        }
    }
}

impl<E> From<Rule<E>> for RuleNode<E> {
    fn from(rule: Rule<E>) -> Self {
        Self::Rule(rule)
    }
}

impl<E> From<RuleGroup<E>> for RuleNode<E> {
    fn from(group: RuleGroup<E>) -> Self {
        Self::Group(group)
    }
}
