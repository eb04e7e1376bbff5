//! 规则定义工作流集成测试
//!
//! 测试完整的 JSON 加载、编译、执行流程。

mod common;

use common::{customers, ids, registry};
use predicate_engine::{PredicateExecutor, RuleCompiler, RuleError};
use segment_shared::config::EngineConfig;
use serde_json::json;

#[test]
fn test_full_workflow() {
    let registry = registry();
    let compiler = RuleCompiler::new(&registry);

    let compiled = compiler
        .compile_from_json(
            &json!({
                "id": "segment-vip",
                "name": "vip_customers",
                "version": "2.0",
                "root": {
                    "type": "group",
                    "operator": "AND",
                    "children": [
                        {
                            "type": "condition",
                            "field": "customer.total_spent",
                            "operator": "greater_than_or_equal_to",
                            "value": 250
                        },
                        {
                            "type": "group",
                            "operator": "OR",
                            "children": [
                                {
                                    "type": "condition",
                                    "field": "customer.roles.any",
                                    "operator": "in",
                                    "value": [2]
                                },
                                {
                                    "type": "condition",
                                    "field": "customer.order_status.any",
                                    "operator": "is_equal_to",
                                    "value": 40
                                }
                            ]
                        }
                    ]
                }
            })
            .to_string(),
        )
        .unwrap();

    assert_eq!(compiled.name(), "vip_customers");
    assert_eq!(compiled.version, "2.0");
    assert_eq!(
        compiled.required_fields.iter().collect::<Vec<_>>(),
        vec![
            "customer.order_status.any",
            "customer.roles.any",
            "customer.total_spent"
        ]
    );

    let customers = customers();
    // 客户 1 有角色 2，客户 4 有已取消订单
    assert_eq!(ids(compiled.predicate().filter(&customers)), vec![1, 4]);
}

#[test]
fn test_executor_trace_over_definition() {
    let registry = registry();
    let compiled = RuleCompiler::new(&registry)
        .compile_from_json(
            &json!({
                "id": "segment-inactive",
                "name": "inactive",
                "root": {
                    "type": "group",
                    "operator": "OR",
                    "children": [
                        {"type": "condition", "field": "customer.last_login_at", "operator": "is_null"},
                        {"type": "condition", "field": "customer.last_login_at", "operator": "less_than", "value": "2024-03-01"}
                    ]
                }
            })
            .to_string(),
        )
        .unwrap();

    let customers = customers();
    let executor = PredicateExecutor::new().with_trace();

    let never = &customers[1];
    let result = executor.execute(compiled.predicate(), never);
    assert!(result.matched);
    assert_eq!(
        result.evaluation_trace,
        vec![
            "root: 开始评估 OR 组 (共 2 个子节点)".to_string(),
            "root.children[0]: customer.last_login_at is_null => MATCHED".to_string(),
            "root: OR 短路 - 子节点 0 匹配".to_string(),
        ]
    );

    let stale = &customers[3];
    let result = executor.execute(compiled.predicate(), stale);
    assert!(result.matched);
    assert_eq!(result.matched_conditions.len(), 1);

    let active = &customers[0];
    let result = executor.execute(compiled.predicate(), active);
    assert!(!result.matched);
    assert!(result.evaluation_trace.iter().any(|t| t == "root: OR 组无匹配"));
}

#[test]
fn test_engine_config_depth() {
    let registry = registry();
    let config = EngineConfig {
        max_definition_depth: 1,
        trace_enabled: false,
    };
    let compiler = RuleCompiler::with_config(&registry, &config);

    let err = compiler
        .compile_from_json(
            &json!({
                "id": "too-deep",
                "name": "too_deep",
                "root": {
                    "type": "group",
                    "operator": "AND",
                    "children": [
                        {"type": "condition", "field": "customer.id", "operator": "is_not_null"}
                    ]
                }
            })
            .to_string(),
        )
        .unwrap_err();

    assert!(matches!(err, RuleError::InvalidDefinition(_)));
    assert_eq!(err.code(), "INVALID_DEFINITION");
}

#[test]
fn test_invalid_value_in_definition() {
    let registry = registry();
    let err = RuleCompiler::new(&registry)
        .compile_from_json(
            &json!({
                "id": "bad-value",
                "name": "bad_value",
                "root": {
                    "type": "condition",
                    "field": "customer.roles.any",
                    "operator": "in",
                    "value": 2
                }
            })
            .to_string(),
        )
        .unwrap_err();

    assert_eq!(err.code(), "INVALID_RULE_VALUE");
    assert!(err.to_string().contains("(节点 root)"));
}

#[test]
fn test_wide_definition() {
    let registry = registry();
    let customers = customers();

    let children: Vec<_> = (0..50_000)
        .map(|i| json!({"type": "condition", "field": "customer.id", "operator": "is_equal_to", "value": i + 1000}))
        .chain(std::iter::once(
            json!({"type": "condition", "field": "customer.gender", "operator": "is_equal_to", "value": 2}),
        ))
        .collect();
    let definition = json!({
        "id": "wide",
        "name": "wide_or",
        "root": {"type": "group", "operator": "OR", "children": children}
    })
    .to_string();

    let compiled = RuleCompiler::new(&registry)
        .compile_from_json(&definition)
        .unwrap();
    assert_eq!(ids(compiled.predicate().filter(&customers)), vec![1, 2]);

    let result = PredicateExecutor::new()
        .with_trace()
        .execute(compiled.predicate(), &customers[0]);
    assert!(result.matched);
    assert_eq!(
        result.evaluation_trace.last().map(String::as_str),
        Some("root: OR 短路 - 子节点 50000 匹配")
    );
}
