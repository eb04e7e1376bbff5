//! 客户分群绑定
//!
//! 客户/订单实体以及对应的字段绑定注册表，供 `segment-filter` 命令行工具使用。

use crate::binding::{BindingRegistry, FieldBinding, Projection};
use crate::value::{RuleValue, RuleValueKind};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 性别编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male = 1,
    Female = 2,
    Other = 3,
}

impl From<Gender> for RuleValue {
    fn from(gender: Gender) -> Self {
        RuleValue::Code(gender as i64)
    }
}

/// 订单状态编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending = 10,
    Processing = 20,
    Complete = 30,
    Cancelled = 40,
}

impl From<OrderStatus> for RuleValue {
    fn from(status: OrderStatus) -> Self {
        RuleValue::Code(status as i64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub status: OrderStatus,
    pub total: Decimal,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_tax_exempt: bool,
    #[serde(default)]
    pub billing_country_id: Option<i64>,
    #[serde(default)]
    pub total_spent: Decimal,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub role_ids: Vec<i64>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

fn purchased_products() -> Projection<Customer> {
    Projection::new("orders.items", "product_id", |c: &Customer| {
        c.orders
            .iter()
            .flat_map(|order| &order.items)
            .map(|item| RuleValue::Int(item.product_id))
            .collect()
    })
}

/// 客户分群可用的字段绑定
pub fn customer_bindings() -> BindingRegistry<Customer> {
    use crate::binding::Quantifier;
    use RuleValueKind as K;

    BindingRegistry::new()
        .with(FieldBinding::scalar("customer.id", K::Integer, |c: &Customer| c.id.into()))
        .with(FieldBinding::scalar("customer.email", K::String, |c: &Customer| {
            c.email.clone().into()
        }))
        .with(FieldBinding::scalar("customer.full_name", K::String, |c: &Customer| {
            c.full_name.clone().into()
        }))
        .with(FieldBinding::scalar(
            "customer.is_tax_exempt",
            K::Boolean,
            |c: &Customer| c.is_tax_exempt.into(),
        ))
        .with(FieldBinding::scalar(
            "customer.billing_country_id",
            K::OptionalInteger,
            |c: &Customer| c.billing_country_id.into(),
        ))
        .with(FieldBinding::scalar("customer.total_spent", K::Decimal, |c: &Customer| {
            c.total_spent.into()
        }))
        .with(FieldBinding::scalar("customer.created_at", K::DateTime, |c: &Customer| {
            c.created_at.into()
        }))
        .with(FieldBinding::scalar(
            "customer.last_login_at",
            K::DateTime,
            |c: &Customer| c.last_login_at.into(),
        ))
        .with(FieldBinding::scalar("customer.gender", K::EnumCode, |c: &Customer| {
            c.gender.into()
        }))
        .with(FieldBinding::any(
            "customer.roles.any",
            K::IntegerSet,
            "role_ids",
            |c: &Customer| c.role_ids.as_slice(),
            "id",
            |id: &i64| RuleValue::Int(*id),
        ))
        .with(FieldBinding::all(
            "customer.roles.all",
            K::IntegerSet,
            "role_ids",
            |c: &Customer| c.role_ids.as_slice(),
            "id",
            |id: &i64| RuleValue::Int(*id),
        ))
        .with(FieldBinding::any(
            "customer.order_status.any",
            K::EnumCode,
            "orders",
            |c: &Customer| c.orders.as_slice(),
            "status",
            |order: &Order| order.status.into(),
        ))
        .with(FieldBinding::any(
            "customer.order_total.any",
            K::Decimal,
            "orders",
            |c: &Customer| c.orders.as_slice(),
            "total",
            |order: &Order| order.total.into(),
        ))
        .with(FieldBinding::quantified(
            "customer.purchased_products.any",
            K::IntegerSet,
            Quantifier::Any,
            purchased_products(),
        ))
        .with(FieldBinding::quantified(
            "customer.purchased_products.all",
            K::IntegerSet,
            Quantifier::All,
            purchased_products(),
        ))
}
