//! 谓词表达式树
//!
//! 编译产物是一棵以单个实体为参数的布尔表达式树。结构完全公开且只读，
//! 内存求值与查询转换器消费的是同一棵树。
//!
//! 比较类节点（`Compare` / `Text` / `In`）在任一操作数缺失时为 false，
//! 不依赖隐式的空值传播；缺失值语义由 `IsNull` / `Coalesce` 守卫显式表达。

use crate::binding::{Accessor, Projection, Quantifier};
use crate::operators::Operator;
use crate::value::{RuleValue, compare_values, set_contains, values_equal};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// 比较操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    fn test(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering.is_eq(),
            Self::Lt => ordering.is_lt(),
            Self::Le => ordering.is_le(),
            Self::Gt => ordering.is_gt(),
            Self::Ge => ordering.is_ge(),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// 字符串测试，区分大小写
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextOp {
    StartsWith,
    EndsWith,
    Contains,
}

impl TextOp {
    fn test(self, haystack: &str, needle: &str) -> bool {
        match self {
            Self::StartsWith => haystack.starts_with(needle),
            Self::EndsWith => haystack.ends_with(needle),
            Self::Contains => haystack.contains(needle),
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::StartsWith => "STARTS WITH",
            Self::EndsWith => "ENDS WITH",
            Self::Contains => "CONTAINS",
        }
    }
}

/// 表达式操作数
#[derive(Debug)]
pub enum Operand<E> {
    /// 实体上的标量字段
    Field(Accessor<E>),
    /// 量词当前绑定的集合元素
    Element,
    Literal(RuleValue),
    /// 操作数缺失时使用 `fallback`
    Coalesce {
        operand: Box<Operand<E>>,
        fallback: RuleValue,
    },
}

impl<E> Operand<E> {
    pub fn coalesce(operand: Operand<E>, fallback: RuleValue) -> Self {
        Self::Coalesce {
            operand: Box::new(operand),
            fallback,
        }
    }

    /// 对实体求值
    pub fn resolve<'a>(&'a self, entity: &E, element: Option<&'a RuleValue>) -> Cow<'a, RuleValue> {
        match self {
            Self::Field(accessor) => Cow::Owned(accessor.read(entity)),
            Self::Element => element.map_or(Cow::Owned(RuleValue::Null), Cow::Borrowed),
            Self::Literal(value) => Cow::Borrowed(value),
            Self::Coalesce { operand, fallback } => {
                let value = operand.resolve(entity, element);
                if value.is_null() {
                    Cow::Borrowed(fallback)
                } else {
                    value
                }
            }
        }
    }

    fn collect_fields(&self, names: &mut BTreeSet<String>) {
        match self {
            Self::Field(accessor) => {
                names.insert(accessor.name().to_string());
            }
            Self::Coalesce { operand, .. } => operand.collect_fields(names),
            Self::Element | Self::Literal(_) => {}
        }
    }
}

impl<E> Clone for Operand<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Field(accessor) => Self::Field(accessor.clone()),
            Self::Element => Self::Element,
            Self::Literal(value) => Self::Literal(value.clone()),
            Self::Coalesce { operand, fallback } => Self::Coalesce {
                operand: operand.clone(),
                fallback: fallback.clone(),
            },
        }
    }
}

impl<E> fmt::Display for Operand<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(accessor) => write!(f, "{}", accessor.name()),
            Self::Element => write!(f, "it"),
            Self::Literal(value) => write!(f, "{value}"),
            Self::Coalesce { operand, fallback } => write!(f, "COALESCE({operand}, {fallback})"),
        }
    }
}

/// 单条规则在表达式树中的来源
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionLabel {
    pub binding: Arc<str>,
    pub operator: Operator,
    pub value: RuleValue,
}

impl fmt::Display for ConditionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operator.is_null_check() {
            write!(f, "{} {}", self.binding, self.operator)
        } else {
            write!(f, "{} {} {}", self.binding, self.operator, self.value)
        }
    }
}

/// 布尔表达式
#[derive(Debug)]
pub enum Expr<E> {
    Const(bool),
    IsNull(Operand<E>),
    /// 缺失或只含空白字符的字符串
    IsBlank(Operand<E>),
    Compare {
        op: Comparison,
        left: Operand<E>,
        right: Operand<E>,
    },
    Text {
        op: TextOp,
        left: Operand<E>,
        right: Operand<E>,
    },
    In {
        operand: Operand<E>,
        set: Operand<E>,
    },
    Not(Box<Expr<E>>),
    /// 从左到右短路求值，空列表为 true
    And(Vec<Expr<E>>),
    /// 从左到右短路求值，空列表为 false
    Or(Vec<Expr<E>>),
    /// 对投影出的每个元素求值 `predicate`，元素通过 [`Operand::Element`] 读取
    Quantified {
        /// 量化绑定名
        binding: Arc<str>,
        quantifier: Quantifier,
        source: Projection<E>,
        predicate: Box<Expr<E>>,
    },
    /// 一条规则编译出的子树，求值结果等于 `body`
    Condition {
        label: ConditionLabel,
        body: Box<Expr<E>>,
    },
}

impl<E> Expr<E> {
    pub fn not(expr: Expr<E>) -> Self {
        Self::Not(Box::new(expr))
    }

    pub fn and(left: Expr<E>, right: Expr<E>) -> Self {
        Self::And(vec![left, right])
    }

    pub fn or(left: Expr<E>, right: Expr<E>) -> Self {
        Self::Or(vec![left, right])
    }

    pub fn compare(op: Comparison, left: Operand<E>, right: Operand<E>) -> Self {
        Self::Compare { op, left, right }
    }

    /// 对实体求值
    pub fn evaluate(&self, entity: &E) -> bool {
        self.eval(entity, None)
    }

    /// 在量词绑定的元素下求值
    pub fn eval(&self, entity: &E, element: Option<&RuleValue>) -> bool {
        match self {
            Self::Const(value) => *value,
            Self::IsNull(operand) => operand.resolve(entity, element).is_null(),
            Self::IsBlank(operand) => operand.resolve(entity, element).is_blank(),
            Self::Compare { op, left, right } => {
                let left = left.resolve(entity, element);
                let right = right.resolve(entity, element);
                if left.is_null() || right.is_null() {
                    return false;
                }
                match op {
                    Comparison::Eq => values_equal(&left, &right),
                    _ => compare_values(&left, &right).is_some_and(|ord| op.test(ord)),
                }
            }
            Self::Text { op, left, right } => {
                let left = left.resolve(entity, element);
                let right = right.resolve(entity, element);
                match (left.as_str(), right.as_str()) {
                    (Some(l), Some(r)) => op.test(l, r),
                    _ => false,
                }
            }
            Self::In { operand, set } => {
                let value = operand.resolve(entity, element);
                !value.is_null() && set_contains(&set.resolve(entity, element), &value)
            }
            Self::Not(inner) => !inner.eval(entity, element),
            Self::And(children) => children.iter().all(|child| child.eval(entity, element)),
            Self::Or(children) => children.iter().any(|child| child.eval(entity, element)),
            Self::Quantified {
                quantifier,
                source,
                predicate,
                ..
            } => {
                let items = source.values(entity);
                match quantifier {
                    Quantifier::Any => items.iter().any(|item| predicate.eval(entity, Some(item))),
                    Quantifier::All => items.iter().all(|item| predicate.eval(entity, Some(item))),
                }
            }
            Self::Condition { body, .. } => body.eval(entity, element),
        }
    }

    /// 表达式读取的绑定名
    pub fn referenced_bindings(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_bindings(&mut names);
        names
    }

    fn collect_bindings(&self, names: &mut BTreeSet<String>) {
        match self {
            Self::Const(_) => {}
            Self::IsNull(operand) | Self::IsBlank(operand) => operand.collect_fields(names),
            Self::Compare { left, right, .. } | Self::Text { left, right, .. } => {
                left.collect_fields(names);
                right.collect_fields(names);
            }
            Self::In { operand, set } => {
                operand.collect_fields(names);
                set.collect_fields(names);
            }
            Self::Not(inner) => inner.collect_bindings(names),
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.collect_bindings(names);
                }
            }
            Self::Quantified {
                binding, predicate, ..
            } => {
                names.insert(binding.to_string());
                predicate.collect_bindings(names);
            }
            Self::Condition { body, .. } => body.collect_bindings(names),
        }
    }
}

impl<E> Clone for Expr<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Const(value) => Self::Const(*value),
            Self::IsNull(operand) => Self::IsNull(operand.clone()),
            Self::IsBlank(operand) => Self::IsBlank(operand.clone()),
            Self::Compare { op, left, right } => Self::Compare {
                op: *op,
                left: left.clone(),
                right: right.clone(),
            },
            Self::Text { op, left, right } => Self::Text {
                op: *op,
                left: left.clone(),
                right: right.clone(),
            },
            Self::In { operand, set } => Self::In {
                operand: operand.clone(),
                set: set.clone(),
            },
            Self::Not(inner) => Self::Not(inner.clone()),
            Self::And(children) => Self::And(children.clone()),
            Self::Or(children) => Self::Or(children.clone()),
            Self::Quantified {
                binding,
                quantifier,
                source,
                predicate,
            } => Self::Quantified {
                binding: Arc::clone(binding),
                quantifier: *quantifier,
                source: source.clone(),
                predicate: predicate.clone(),
            },
            Self::Condition { label, body } => Self::Condition {
                label: label.clone(),
                body: body.clone(),
            },
        }
    }
}

impl<E> fmt::Display for Expr<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(true) => write!(f, "TRUE"),
            Self::Const(false) => write!(f, "FALSE"),
            Self::IsNull(operand) => write!(f, "({operand} IS NULL)"),
            Self::IsBlank(operand) => write!(f, "({operand} IS BLANK)"),
            Self::Compare { op, left, right } => write!(f, "({left} {} {right})", op.symbol()),
            Self::Text { op, left, right } => write!(f, "({left} {} {right})", op.keyword()),
            Self::In { operand, set } => write!(f, "({operand} IN {set})"),
            Self::Not(inner) => write!(f, "NOT {inner}"),
            Self::And(children) => write_list(f, children, "AND", "TRUE"),
            Self::Or(children) => write_list(f, children, "OR", "FALSE"),
            Self::Quantified {
                quantifier,
                source,
                predicate,
                ..
            } => write!(
                f,
                "{quantifier}({}.{} AS it: {predicate})",
                source.collection(),
                source.item()
            ),
            Self::Condition { body, .. } => write!(f, "{body}"),
        }
    }
}

fn write_list<E>(
    f: &mut fmt::Formatter<'_>,
    children: &[Expr<E>],
    keyword: &str,
    empty: &str,
) -> fmt::Result {
    match children {
        [] => write!(f, "{empty}"),
        [only] => write!(f, "{only}"),
        _ => {
            write!(f, "(")?;
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    write!(f, " {keyword} ")?;
                }
                write!(f, "{child}")?;
            }
            write!(f, ")")
        }
    }
}
