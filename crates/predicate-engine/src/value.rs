//! 规则值与值域
//!
//! `RuleValue` 是规则比较时使用的运行时值，`RuleValueKind` 描述字段绑定声明的值域，
//! 决定合法的操作符以及规则值的转换方式。

use crate::operators::Operator;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// 运行时规则值
///
/// `Null` 是"缺失"的唯一表示：可选字段在访问器边界上被归一化为 `Null` 或其内部值，
/// 因此 `Option<DateTime>` 与 `DateTime` 在比较时不再有区别。
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RuleValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    String(String),
    DateTime(DateTime<Utc>),
    /// 枚举编码，比较时按底层整数值处理
    Code(i64),
    List(Vec<RuleValue>),
}

impl RuleValue {
    /// 枚举编码值
    pub fn code(value: impl Into<i64>) -> Self {
        Self::Code(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// 缺失，或者是只包含空白字符的字符串
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RuleValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// 获取值的类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::String(_) => "string",
            Self::DateTime(_) => "datetime",
            Self::Code(_) => "enum_code",
            Self::List(_) => "list",
        }
    }

    /// 从规则定义中的 JSON 值转换
    ///
    /// 对象没有对应的规则值，返回 `None`。
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Some(Self::Int(i));
                }
                Decimal::from_str(&n.to_string())
                    .ok()
                    .or_else(|| n.as_f64().and_then(Decimal::from_f64))
                    .map(Self::Decimal)
            }
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Option<Vec<_>>>()
                .map(Self::List),
            Value::Object(_) => None,
        }
    }
}

/// 两个存在的值是否相等
///
/// 任一侧为 `Null` 时返回 false，缺失值的语义由操作符自行处理。
/// 枚举编码按底层整数参与比较。
pub(crate) fn values_equal(a: &RuleValue, b: &RuleValue) -> bool {
    use RuleValue as V;

    match (a, b) {
        (V::Null, _) | (_, V::Null) => false,
        (V::Bool(x), V::Bool(y)) => x == y,
        (V::Int(x) | V::Code(x), V::Int(y) | V::Code(y)) => x == y,
        (V::Decimal(x), V::Decimal(y)) => x == y,
        (V::Int(x) | V::Code(x), V::Decimal(y)) | (V::Decimal(y), V::Int(x) | V::Code(x)) => {
            Decimal::from(*x) == *y
        }
        (V::String(x), V::String(y)) => x == y,
        (V::DateTime(x), V::DateTime(y)) => x == y,
        (V::List(x), V::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| values_equal(l, r))
        }
        _ => false,
    }
}

/// 两个存在的值的全序比较，不可比较时返回 `None`
pub(crate) fn compare_values(a: &RuleValue, b: &RuleValue) -> Option<Ordering> {
    use RuleValue as V;

    match (a, b) {
        (V::Int(x) | V::Code(x), V::Int(y) | V::Code(y)) => Some(x.cmp(y)),
        (V::Decimal(x), V::Decimal(y)) => Some(x.cmp(y)),
        (V::Int(x) | V::Code(x), V::Decimal(y)) => Some(Decimal::from(*x).cmp(y)),
        (V::Decimal(x), V::Int(y) | V::Code(y)) => Some(x.cmp(&Decimal::from(*y))),
        (V::DateTime(x), V::DateTime(y)) => Some(x.cmp(y)),
        (V::String(x), V::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// 集合成员检查，`set` 不是列表时视为空集
pub(crate) fn set_contains(set: &RuleValue, value: &RuleValue) -> bool {
    set.as_list()
        .is_some_and(|items| items.iter().any(|item| values_equal(value, item)))
}

impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "\"{v}\""),
            Self::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Self::Code(v) => write!(f, "#{v}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for RuleValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for RuleValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for RuleValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<Decimal> for RuleValue {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<&str> for RuleValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for RuleValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<DateTime<Utc>> for RuleValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::DateTime(v)
    }
}

impl<T: Into<RuleValue>> From<Option<T>> for RuleValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<RuleValue>> From<Vec<T>> for RuleValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<RuleValue> + Clone> From<&[T]> for RuleValue {
    fn from(v: &[T]) -> Self {
        Self::List(v.iter().cloned().map(Into::into).collect())
    }
}

/// 字段绑定声明的值域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleValueKind {
    Boolean,
    Integer,
    OptionalInteger,
    /// 整数集合：只能用 In / NotIn 与一组整数比较
    IntegerSet,
    /// 金额等十进制数
    Decimal,
    String,
    DateTime,
    EnumCode,
}

const BOOLEAN_OPERATORS: &[Operator] = &[
    Operator::IsNull,
    Operator::IsNotNull,
    Operator::IsEmpty,
    Operator::IsNotEmpty,
    Operator::IsEqualTo,
    Operator::IsNotEqualTo,
];

const INTEGER_OPERATORS: &[Operator] = &[
    Operator::IsNull,
    Operator::IsNotNull,
    Operator::IsEmpty,
    Operator::IsNotEmpty,
    Operator::IsEqualTo,
    Operator::IsNotEqualTo,
    Operator::GreaterThan,
    Operator::GreaterThanOrEqualTo,
    Operator::LessThan,
    Operator::LessThanOrEqualTo,
    Operator::In,
    Operator::NotIn,
];

const ORDERED_OPERATORS: &[Operator] = &[
    Operator::IsNull,
    Operator::IsNotNull,
    Operator::IsEmpty,
    Operator::IsNotEmpty,
    Operator::IsEqualTo,
    Operator::IsNotEqualTo,
    Operator::GreaterThan,
    Operator::GreaterThanOrEqualTo,
    Operator::LessThan,
    Operator::LessThanOrEqualTo,
];

const STRING_OPERATORS: &[Operator] = &[
    Operator::IsNull,
    Operator::IsNotNull,
    Operator::IsEmpty,
    Operator::IsNotEmpty,
    Operator::IsEqualTo,
    Operator::IsNotEqualTo,
    Operator::StartsWith,
    Operator::EndsWith,
    Operator::Contains,
    Operator::NotContains,
    Operator::In,
    Operator::NotIn,
];

const ENUM_OPERATORS: &[Operator] = &[
    Operator::IsNull,
    Operator::IsNotNull,
    Operator::IsEmpty,
    Operator::IsNotEmpty,
    Operator::IsEqualTo,
    Operator::IsNotEqualTo,
    Operator::In,
    Operator::NotIn,
];

const SET_OPERATORS: &[Operator] = &[Operator::In, Operator::NotIn];

impl RuleValueKind {
    /// 该值域允许的操作符
    pub fn supported_operators(self) -> &'static [Operator] {
        match self {
            Self::Boolean => BOOLEAN_OPERATORS,
            Self::Integer | Self::OptionalInteger => INTEGER_OPERATORS,
            Self::Decimal | Self::DateTime => ORDERED_OPERATORS,
            Self::String => STRING_OPERATORS,
            Self::EnumCode => ENUM_OPERATORS,
            Self::IntegerSet => SET_OPERATORS,
        }
    }

    pub fn supports(self, operator: Operator) -> bool {
        self.supported_operators().contains(&operator)
    }

    /// 规则值是否允许为 null（仅用于相等比较）
    pub fn is_nullable(self) -> bool {
        matches!(self, Self::OptionalInteger)
    }

    /// In / NotIn 列表元素的值域
    pub fn element_kind(self) -> Self {
        match self {
            Self::IntegerSet | Self::OptionalInteger => Self::Integer,
            other => other,
        }
    }

    /// 按操作符把规则值转换为该值域的值
    ///
    /// 空值检查操作符忽略规则值；In / NotIn 要求列表，并逐个转换元素。
    pub fn coerce_operand(
        self,
        operator: Operator,
        value: RuleValue,
    ) -> std::result::Result<RuleValue, String> {
        if operator.is_null_check() {
            return Ok(RuleValue::Null);
        }

        if operator.is_set_operator() {
            let RuleValue::List(items) = value else {
                return Err(format!(
                    "{operator} 操作符需要列表值，实际为 {}",
                    value.type_name()
                ));
            };
            let element = self.element_kind();
            return items
                .into_iter()
                .map(|item| {
                    if item.is_null() {
                        Err(format!("{operator} 列表不能包含 null"))
                    } else {
                        element.coerce(item)
                    }
                })
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(RuleValue::List);
        }

        if value.is_null() {
            if self.is_nullable() && operator.is_equality() {
                return Ok(RuleValue::Null);
            }
            return Err(format!("{self} 值域的 {operator} 操作符不接受 null 值"));
        }

        self.coerce(value)
    }

    /// 无损转换单个非空值
    pub fn coerce(self, value: RuleValue) -> std::result::Result<RuleValue, String> {
        use RuleValue as V;

        let mismatch = |value: &RuleValue| format!("无法将 {} 值 {value} 转换为 {self}", value.type_name());

        match (self, value) {
            (Self::Boolean, V::Bool(b)) => Ok(V::Bool(b)),
            (Self::Boolean, V::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(V::Bool(true)),
                "false" => Ok(V::Bool(false)),
                _ => Err(mismatch(&V::String(s))),
            },

            (Self::Integer | Self::OptionalInteger | Self::IntegerSet, V::Int(i) | V::Code(i)) => {
                Ok(V::Int(i))
            }
            (Self::Integer | Self::OptionalInteger | Self::IntegerSet, V::Decimal(d)) => {
                if d.fract().is_zero() {
                    d.to_i64().map(V::Int).ok_or_else(|| mismatch(&V::Decimal(d)))
                } else {
                    Err(mismatch(&V::Decimal(d)))
                }
            }
            (Self::Integer | Self::OptionalInteger | Self::IntegerSet, V::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(V::Int)
                .map_err(|_| mismatch(&V::String(s.clone()))),

            (Self::Decimal, V::Int(i)) => Ok(V::Decimal(Decimal::from(i))),
            (Self::Decimal, V::Decimal(d)) => Ok(V::Decimal(d)),
            (Self::Decimal, V::String(s)) => Decimal::from_str(s.trim())
                .map(V::Decimal)
                .map_err(|_| mismatch(&V::String(s.clone()))),

            (Self::String, V::String(s)) => Ok(V::String(s)),

            (Self::DateTime, V::DateTime(dt)) => Ok(V::DateTime(dt)),
            (Self::DateTime, V::String(s)) => parse_datetime(&s)
                .map(V::DateTime)
                .ok_or_else(|| mismatch(&V::String(s.clone()))),

            (Self::EnumCode, V::Code(c) | V::Int(c)) => Ok(V::Code(c)),

            (_, other) => Err(mismatch(&other)),
        }
    }
}

/// 解析 RFC 3339 日期时间或 `YYYY-MM-DD` 日期（UTC 零点）
pub(crate) fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

impl fmt::Display for RuleValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::OptionalInteger => "optional_integer",
            Self::IntegerSet => "integer_set",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::DateTime => "datetime",
            Self::EnumCode => "enum_code",
        };
        write!(f, "{}", s)
    }
}
