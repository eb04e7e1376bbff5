//! 客户分群集成测试
//!
//! 在固定的六个客户上验证操作符语义、规则组合以及量词。

mod common;

use common::{customers, ids, registry, rule};
use predicate_engine::customer::Gender;
use predicate_engine::{Operator, Rule, RuleGroup, RuleNode, RuleValue};

#[test]
fn test_tax_exempt_in_country() {
    let customers = customers();
    let tax_exempt = rule("customer.is_tax_exempt", Operator::IsEqualTo, true);
    let in_country = rule("customer.billing_country_id", Operator::IsEqualTo, 2i64);

    assert_eq!(ids(tax_exempt.compile().filter(&customers)), vec![1, 2, 5]);
    assert_eq!(ids(in_country.compile().filter(&customers)), vec![1, 3]);

    let and = RuleGroup::and(vec![tax_exempt.clone().into(), in_country.clone().into()]).compile();
    assert_eq!(ids(and.filter(&customers)), vec![1]);

    let or = RuleGroup::or(vec![tax_exempt.into(), in_country.into()]).compile();
    assert_eq!(ids(or.filter(&customers)), vec![1, 2, 3, 5]);
}

#[test]
fn test_starts_with_is_case_sensitive() {
    let customers = customers();
    let lower = rule("customer.full_name", Operator::StartsWith, "s").compile();
    let upper = rule("customer.full_name", Operator::StartsWith, "S").compile();

    assert_eq!(ids(lower.filter(&customers)), vec![5]);
    assert_eq!(ids(upper.filter(&customers)), vec![1, 3]);
}

#[test]
fn test_empty_checks() {
    let customers = customers();
    let empty = rule("customer.full_name", Operator::IsEmpty, RuleValue::Null).compile();
    let not_empty = rule("customer.full_name", Operator::IsNotEmpty, RuleValue::Null).compile();

    assert_eq!(ids(empty.filter(&customers)), vec![4, 6]);
    assert_eq!(ids(not_empty.filter(&customers)), vec![1, 2, 3, 5]);
}

#[test]
fn test_optional_datetime_equality() {
    let customers = customers();
    let logged_in = rule("customer.last_login_at", Operator::IsEqualTo, "2024-06-01").compile();
    let never = rule("customer.last_login_at", Operator::IsNull, RuleValue::Null).compile();

    assert_eq!(ids(logged_in.filter(&customers)), vec![1, 3, 6]);
    assert_eq!(ids(never.filter(&customers)), vec![2, 5]);
}

#[test]
fn test_enum_code_equality() {
    let customers = customers();
    let female = rule("customer.gender", Operator::IsEqualTo, Gender::Female).compile();
    let not_female = rule("customer.gender", Operator::IsNotEqualTo, Gender::Female).compile();

    assert_eq!(ids(female.filter(&customers)), vec![1, 2]);
    // 缺失的性别与任何存在的值都不相等
    assert_eq!(ids(not_female.filter(&customers)), vec![3, 4, 5, 6]);
}

#[test]
fn test_decimal_ordering() {
    let customers = customers();
    let big = rule("customer.total_spent", Operator::GreaterThan, 100i64).compile();
    let small = rule("customer.total_spent", Operator::LessThanOrEqualTo, "80").compile();

    assert_eq!(ids(big.filter(&customers)), vec![1, 4, 5]);
    assert_eq!(ids(small.filter(&customers)), vec![2, 3, 6]);
}

#[test]
fn test_optional_integer_set_membership() {
    let customers = customers();
    let inside = rule("customer.billing_country_id", Operator::In, vec![1i64, 2]).compile();
    let outside = rule("customer.billing_country_id", Operator::NotIn, vec![1i64, 2]).compile();

    assert_eq!(ids(inside.filter(&customers)), vec![1, 2, 3]);
    assert_eq!(ids(outside.filter(&customers)), vec![4, 5, 6]);
}

#[test]
fn test_roles_quantifiers() {
    let customers = customers();
    let any = rule("customer.roles.any", Operator::In, vec![2i64, 3]).compile();
    let all = rule("customer.roles.all", Operator::In, vec![2i64, 3]).compile();

    assert_eq!(ids(any.filter(&customers)), vec![1, 2, 4, 5]);
    // 没有角色的客户 3 对 All 为真
    assert_eq!(ids(all.filter(&customers)), vec![1, 2, 3, 5]);
}

#[test]
fn test_purchased_products() {
    let customers = customers();
    let any = rule(
        "customer.purchased_products.any",
        Operator::In,
        vec![7i64, 8, 9, 10],
    )
    .compile();

    assert_eq!(ids(any.filter(&customers)), vec![1, 4, 5]);
}

#[test]
fn test_nested_groups() {
    let customers = customers();
    // 免税 AND (国家 2 OR 购买过产品 10)
    let group = RuleGroup::and(vec![
        rule("customer.is_tax_exempt", Operator::IsEqualTo, true).into(),
        RuleNode::Group(RuleGroup::or(vec![
            rule("customer.billing_country_id", Operator::IsEqualTo, 2i64).into(),
            rule("customer.purchased_products.any", Operator::In, vec![10i64]).into(),
        ])),
    ]);

    assert_eq!(ids(group.compile().filter(&customers)), vec![1, 5]);
}

#[test]
fn test_empty_groups_are_neutral() {
    let customers = customers();
    let all = RuleGroup::and(vec![]).compile();
    let none = RuleGroup::or(vec![]).compile();

    assert_eq!(all.filter(&customers).len(), customers.len());
    assert!(none.filter(&customers).is_empty());
}

#[test]
fn test_compile_is_repeatable() {
    let customers = customers();
    let rule = rule("customer.email", Operator::EndsWith, "@shop.test");
    let first = rule.compile();
    let second = rule.compile();

    for customer in &customers {
        assert_eq!(first.evaluate(customer), second.evaluate(customer));
    }
    assert_eq!(first.filter(&customers).len(), 6);
}

#[test]
fn test_referenced_bindings() {
    let predicate = RuleGroup::and(vec![
        rule("customer.is_tax_exempt", Operator::IsEqualTo, true).into(),
        rule("customer.roles.any", Operator::In, vec![1i64]).into(),
    ])
    .compile();

    let names: Vec<_> = predicate.referenced_bindings().into_iter().collect();
    assert_eq!(names, vec!["customer.is_tax_exempt", "customer.roles.any"]);
}

#[test]
fn test_registry_rejects_unknown_binding() {
    let err = registry().resolve("customer.age").unwrap_err();
    assert_eq!(err.code(), "UNRESOLVED_BINDING");
}

#[test]
fn test_wide_or_group() {
    let customers = customers();
    let binding = registry().resolve("customer.id").unwrap();

    let group = RuleGroup::or(
        (0..200_000i64)
            .map(|i| {
                Rule::new(binding.clone(), Operator::IsEqualTo, i + 1000)
                    .unwrap()
                    .into()
            })
            .chain(std::iter::once(rule("customer.id", Operator::IsEqualTo, 3i64).into()))
            .collect(),
    );
    let predicate = group.compile();

    assert_eq!(ids(predicate.filter(&customers)), vec![3]);
    drop(predicate);
    drop(group);
}

#[test]
fn test_wide_and_group() {
    let customers = customers();
    let binding = registry().resolve("customer.total_spent").unwrap();

    let predicate = RuleGroup::and(
        (0..100_000i64)
            .map(|i| {
                Rule::new(binding.clone(), Operator::GreaterThan, i % 100)
                    .unwrap()
                    .into()
            })
            .collect(),
    )
    .compile();

    assert_eq!(ids(predicate.filter(&customers)), vec![1, 4, 5]);
}

