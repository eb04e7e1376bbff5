//! 客户分群性能基准测试
//!
//! 测试覆盖：
//! - 规则定义编译性能
//! - 不同客户数量下的过滤吞吐
//! - 量化绑定（Any/All）的求值开销

use chrono::{Duration, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use predicate_engine::customer::{Customer, Order, OrderItem, OrderStatus, customer_bindings};
use predicate_engine::{Operator, Rule, RuleCompiler, RuleGroup, RuleValue};
use rust_decimal::Decimal;
use serde_json::json;
use std::hint::black_box;

/// 生成确定性的客户数据
fn create_customers(count: usize) -> Vec<Customer> {
    let epoch = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    (0..count as i64)
        .map(|i| Customer {
            id: i,
            email: format!("customer{}@shop.test", i),
            full_name: (i % 7 != 0).then(|| format!("customer {}", i)),
            is_tax_exempt: i % 3 == 0,
            billing_country_id: (i % 5 != 0).then_some(i % 4),
            total_spent: Decimal::new(i * 137 % 100_000, 2),
            created_at: epoch + Duration::days(i % 365),
            last_login_at: (i % 2 == 0).then(|| epoch + Duration::days(i % 500)),
            gender: None,
            role_ids: (0..i % 4).collect(),
            orders: (0..i % 6)
                .map(|n| Order {
                    id: i * 10 + n,
                    status: if n % 3 == 0 {
                        OrderStatus::Complete
                    } else {
                        OrderStatus::Pending
                    },
                    total: Decimal::new(1000 + n * 250, 2),
                    items: vec![OrderItem {
                        product_id: (i + n) % 50,
                        quantity: 1,
                    }],
                })
                .collect(),
        })
        .collect()
}

fn segment_definition() -> String {
    json!({
        "id": "bench-segment",
        "name": "bench_segment",
        "root": {
            "type": "group",
            "operator": "AND",
            "children": [
                {"type": "condition", "field": "customer.is_tax_exempt", "operator": "is_equal_to", "value": true},
                {"type": "condition", "field": "customer.billing_country_id", "operator": "in", "value": [1, 2]},
                {
                    "type": "group",
                    "operator": "OR",
                    "children": [
                        {"type": "condition", "field": "customer.total_spent", "operator": "greater_than", "value": "500.00"},
                        {"type": "condition", "field": "customer.purchased_products.any", "operator": "in", "value": [7, 8, 9, 10]}
                    ]
                }
            ]
        }
    })
    .to_string()
}

/// 规则编译基准
fn bench_compile(c: &mut Criterion) {
    let registry = customer_bindings();
    let json = segment_definition();

    c.bench_function("compile_definition", |b| {
        b.iter(|| {
            RuleCompiler::new(&registry)
                .compile_from_json(black_box(&json))
                .unwrap()
        })
    });
}

/// 不同数据量下的过滤吞吐
fn bench_filter(c: &mut Criterion) {
    let registry = customer_bindings();
    let compiled = RuleCompiler::new(&registry)
        .compile_from_json(&segment_definition())
        .unwrap();

    let mut group = c.benchmark_group("filter_customers");
    for size in [100usize, 1_000, 10_000] {
        let customers = create_customers(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &customers, |b, customers| {
            b.iter(|| compiled.predicate().filter(black_box(customers)).len())
        });
    }
    group.finish();
}

/// 量化绑定求值基准
fn bench_quantifiers(c: &mut Criterion) {
    let registry = customer_bindings();
    let customers = create_customers(1_000);
    let products = RuleValue::from(vec![1i64, 2, 3, 4, 5]);

    let any = Rule::new(
        registry.resolve("customer.purchased_products.any").unwrap(),
        Operator::In,
        products.clone(),
    )
    .unwrap();
    let all = Rule::new(
        registry.resolve("customer.purchased_products.all").unwrap(),
        Operator::In,
        products,
    )
    .unwrap();

    let mut group = c.benchmark_group("quantifiers");
    group.throughput(Throughput::Elements(customers.len() as u64));

    let any = any.compile();
    group.bench_function("any", |b| b.iter(|| any.filter(black_box(&customers)).len()));

    let all = all.compile();
    group.bench_function("all", |b| b.iter(|| all.filter(black_box(&customers)).len()));

    let either = RuleGroup::<Customer>::or(vec![]).compile();
    group.bench_function("empty_or", |b| {
        b.iter(|| either.filter(black_box(&customers)).len())
    });

    group.finish();
}

criterion_group!(benches, bench_compile, bench_filter, bench_quantifiers);
criterion_main!(benches);
