//! 规则操作符定义
//!
//! 每个操作符同时定义两套语义：作用于具体值的标量规则 [`Operator::matches`]，
//! 以及构造表达式树的 IR 规则 [`Operator::build`]。两者在任意输入上结果一致。

use crate::expr::{Comparison, Expr, Operand, TextOp};
use crate::value::{RuleValue, compare_values, set_contains, values_equal};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// 条件操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    // 空值检查
    IsNull,
    IsNotNull,
    IsEmpty,
    IsNotEmpty,

    // 相等
    IsEqualTo,
    IsNotEqualTo,

    // 字符串操作
    StartsWith,
    EndsWith,
    Contains,
    NotContains,

    // 数值/时间比较
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,

    // 集合
    In,
    NotIn,
}

impl Operator {
    pub const ALL: [Operator; 16] = [
        Self::IsNull,
        Self::IsNotNull,
        Self::IsEmpty,
        Self::IsNotEmpty,
        Self::IsEqualTo,
        Self::IsNotEqualTo,
        Self::StartsWith,
        Self::EndsWith,
        Self::Contains,
        Self::NotContains,
        Self::GreaterThan,
        Self::GreaterThanOrEqualTo,
        Self::LessThan,
        Self::LessThanOrEqualTo,
        Self::In,
        Self::NotIn,
    ];

    /// 不读取规则值的操作符
    pub fn is_null_check(self) -> bool {
        matches!(
            self,
            Self::IsNull | Self::IsNotNull | Self::IsEmpty | Self::IsNotEmpty
        )
    }

    pub fn is_equality(self) -> bool {
        matches!(self, Self::IsEqualTo | Self::IsNotEqualTo)
    }

    pub fn is_set_operator(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }

    /// 标量规则：直接比较两个具体值
    pub fn matches(self, left: &RuleValue, right: &RuleValue) -> bool {
        match self {
            Self::IsNull => left.is_null(),
            Self::IsNotNull => !left.is_null(),
            Self::IsEmpty => left.is_blank(),
            Self::IsNotEmpty => !left.is_blank(),
            Self::IsEqualTo => loose_equals(left, right),
            Self::IsNotEqualTo => !loose_equals(left, right),
            Self::StartsWith => text_matches(left, right, |l, r| l.starts_with(r)),
            Self::EndsWith => text_matches(left, right, |l, r| l.ends_with(r)),
            Self::Contains => text_matches(left, right, |l, r| l.contains(r)),
            Self::NotContains => !text_matches(left, right, |l, r| l.contains(r)),
            Self::GreaterThan => ordered(left, right, Ordering::is_gt),
            Self::GreaterThanOrEqualTo => ordered(left, right, Ordering::is_ge),
            Self::LessThan => ordered(left, right, Ordering::is_lt),
            Self::LessThanOrEqualTo => ordered(left, right, Ordering::is_le),
            Self::In => !left.is_null() && set_contains(right, left),
            Self::NotIn => left.is_null() || !set_contains(right, left),
        }
    }

    /// IR 规则：用显式的空值守卫构造布尔表达式
    ///
    /// 表达式中的比较节点在任一操作数缺失时为 false，因此缺失值的语义
    /// 全部由这里的 `IsNull` / `Coalesce` 节点表达。
    pub fn build<E>(self, left: Operand<E>, right: Operand<E>) -> Expr<E> {
        match self {
            Self::IsNull => Expr::IsNull(left),
            Self::IsNotNull => Expr::not(Expr::IsNull(left)),
            Self::IsEmpty => Expr::IsBlank(left),
            Self::IsNotEmpty => Expr::not(Expr::IsBlank(left)),
            Self::IsEqualTo => equal_to(left, right),
            Self::IsNotEqualTo => Expr::not(equal_to(left, right)),
            Self::StartsWith => text(TextOp::StartsWith, left, right),
            Self::EndsWith => text(TextOp::EndsWith, left, right),
            Self::Contains => text(TextOp::Contains, left, right),
            Self::NotContains => Expr::not(text(TextOp::Contains, left, right)),
            Self::GreaterThan => ordering(Comparison::Gt, left, right),
            Self::GreaterThanOrEqualTo => ordering(Comparison::Ge, left, right),
            Self::LessThan => ordering(Comparison::Lt, left, right),
            Self::LessThanOrEqualTo => ordering(Comparison::Le, left, right),
            Self::In => member_of(left, right),
            Self::NotIn => Expr::not(member_of(left, right)),
        }
    }
}

fn loose_equals(left: &RuleValue, right: &RuleValue) -> bool {
    match (left.is_null(), right.is_null()) {
        (true, true) => true,
        (false, false) => values_equal(left, right),
        _ => false,
    }
}

fn text_matches(left: &RuleValue, right: &RuleValue, test: impl Fn(&str, &str) -> bool) -> bool {
    let left = match left {
        RuleValue::Null => "",
        RuleValue::String(s) => s.as_str(),
        _ => return false,
    };
    right.as_str().is_some_and(|right| test(left, right))
}

fn ordered(left: &RuleValue, right: &RuleValue, test: fn(Ordering) -> bool) -> bool {
    if left.is_null() || right.is_null() {
        return false;
    }
    compare_values(left, right).is_some_and(test)
}

// (l IS NULL AND r IS NULL) OR (l IS NOT NULL AND r IS NOT NULL AND l = r)
fn equal_to<E>(left: Operand<E>, right: Operand<E>) -> Expr<E> {
    let both_null = Expr::and(
        Expr::IsNull(left.clone()),
        Expr::IsNull(right.clone()),
    );
    let both_present = Expr::and(
        Expr::not(Expr::IsNull(left.clone())),
        Expr::not(Expr::IsNull(right.clone())),
    );
    Expr::or(
        both_null,
        Expr::and(both_present, Expr::compare(Comparison::Eq, left, right)),
    )
}

fn text<E>(op: TextOp, left: Operand<E>, right: Operand<E>) -> Expr<E> {
    Expr::Text {
        op,
        left: Operand::coalesce(left, RuleValue::String(String::new())),
        right,
    }
}

fn ordering<E>(op: Comparison, left: Operand<E>, right: Operand<E>) -> Expr<E> {
    Expr::and(
        Expr::not(Expr::IsNull(left.clone())),
        Expr::compare(op, left, right),
    )
}

fn member_of<E>(left: Operand<E>, set: Operand<E>) -> Expr<E> {
    Expr::and(
        Expr::not(Expr::IsNull(left.clone())),
        Expr::In { operand: left, set },
    )
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::IsNull => "is_null",
            Self::IsNotNull => "is_not_null",
            Self::IsEmpty => "is_empty",
            Self::IsNotEmpty => "is_not_empty",
            Self::IsEqualTo => "is_equal_to",
            Self::IsNotEqualTo => "is_not_equal_to",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::GreaterThan => "greater_than",
            Self::GreaterThanOrEqualTo => "greater_than_or_equal_to",
            Self::LessThan => "less_than",
            Self::LessThanOrEqualTo => "less_than_or_equal_to",
            Self::In => "in",
            Self::NotIn => "not_in",
        };
        write!(f, "{}", s)
    }
}

/// 逻辑操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    /// 空组的中性值
    pub fn identity(self) -> bool {
        matches!(self, Self::And)
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}
