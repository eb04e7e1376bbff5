//! 集成测试共用的客户数据
#![allow(dead_code)]

use predicate_engine::customer::{Customer, customer_bindings};
use predicate_engine::{BindingRegistry, Operator, Rule, RuleValue};
use serde_json::json;

/// 六个客户，覆盖缺失值、空白字符串、空集合等情况
pub fn customers() -> Vec<Customer> {
    serde_json::from_value(json!([
        {
            "id": 1,
            "email": "sam@shop.test",
            "full_name": "Sam Carter",
            "is_tax_exempt": true,
            "billing_country_id": 2,
            "total_spent": "1500.00",
            "created_at": "2023-05-01T09:30:00Z",
            "last_login_at": "2024-06-01T00:00:00Z",
            "gender": "female",
            "role_ids": [2, 3],
            "orders": [
                {"id": 101, "status": "complete", "total": "1500.00", "items": [{"product_id": 7}, {"product_id": 8}]}
            ]
        },
        {
            "id": 2,
            "email": "ann@shop.test",
            "full_name": "ann lee",
            "is_tax_exempt": true,
            "billing_country_id": 1,
            "total_spent": "80.00",
            "created_at": "2024-01-10T12:00:00Z",
            "gender": "female",
            "role_ids": [2],
            "orders": [
                {"id": 201, "status": "pending", "total": "80.00", "items": [{"product_id": 1}]}
            ]
        },
        {
            "id": 3,
            "email": "sid@shop.test",
            "full_name": "Sid Vale",
            "billing_country_id": 2,
            "total_spent": "0",
            "created_at": "2024-03-03T08:00:00Z",
            "last_login_at": "2024-06-01T00:00:00Z",
            "gender": "male"
        },
        {
            "id": 4,
            "email": "bob@shop.test",
            "total_spent": "250.00",
            "created_at": "2022-12-31T23:59:59Z",
            "last_login_at": "2024-02-02T10:00:00Z",
            "role_ids": [1, 3],
            "orders": [
                {"id": 401, "status": "complete", "total": "200.00", "items": [{"product_id": 9}, {"product_id": 11}]},
                {"id": 402, "status": "cancelled", "total": "50.00", "items": [{"product_id": 12}]}
            ]
        },
        {
            "id": 5,
            "email": "sara@shop.test",
            "full_name": "sara ng",
            "is_tax_exempt": true,
            "total_spent": "999.99",
            "created_at": "2024-06-01T00:00:00Z",
            "gender": "other",
            "role_ids": [3],
            "orders": [
                {"id": 501, "status": "complete", "total": "999.99", "items": [{"product_id": 10, "quantity": 3}]}
            ]
        },
        {
            "id": 6,
            "email": "tom@shop.test",
            "full_name": "  ",
            "billing_country_id": 3,
            "total_spent": "42.00",
            "created_at": "2023-07-07T07:07:07Z",
            "last_login_at": "2024-06-01T00:00:00Z",
            "gender": "male",
            "role_ids": [4],
            "orders": [
                {"id": 601, "status": "processing", "total": "42.00", "items": [{"product_id": 2}, {"product_id": 3}]}
            ]
        }
    ]))
    .expect("fixture must deserialize")
}

pub fn registry() -> BindingRegistry<Customer> {
    customer_bindings()
}

pub fn rule(binding: &str, operator: Operator, value: impl Into<RuleValue>) -> Rule<Customer> {
    Rule::new(
        registry().resolve(binding).expect("binding must exist"),
        operator,
        value,
    )
    .expect("rule must be valid")
}

pub fn ids<'a>(customers: impl IntoIterator<Item = &'a Customer>) -> Vec<i64> {
    customers.into_iter().map(|c| c.id).collect()
}
