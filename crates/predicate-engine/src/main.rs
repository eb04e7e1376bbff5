//! 客户分群过滤工具
//!
//! 用法：`segment-filter <rule.json> <customers.json>`，按规则过滤客户并逐行输出匹配的客户 ID。

use anyhow::{Context, Result, bail};
use predicate_engine::customer::{Customer, customer_bindings};
use predicate_engine::{PredicateExecutor, RuleCompiler};
use segment_shared::config::AppConfig;
use segment_shared::observability;
use std::fs;
use tracing::{debug, info};

const SERVICE_NAME: &str = "segment-filter";

fn main() -> Result<()> {
    let config = AppConfig::load(SERVICE_NAME).context("加载配置失败")?;
    observability::init(&config.observability)?;

    let mut args = std::env::args().skip(1);
    let (Some(rule_path), Some(customers_path)) = (args.next(), args.next()) else {
        bail!("usage: {SERVICE_NAME} <rule.json> <customers.json>");
    };

    let rule_json = fs::read_to_string(&rule_path)
        .with_context(|| format!("无法读取规则文件 {rule_path}"))?;
    let customers_json = fs::read_to_string(&customers_path)
        .with_context(|| format!("无法读取客户文件 {customers_path}"))?;
    let customers: Vec<Customer> =
        serde_json::from_str(&customers_json).context("客户数据格式错误")?;

    let registry = customer_bindings();
    let compiled = RuleCompiler::with_config(&registry, &config.engine)
        .compile_from_json(&rule_json)
        .with_context(|| format!("规则编译失败: {rule_path}"))?;

    info!(
        rule_id = %compiled.id(),
        rule_name = %compiled.name(),
        customers = customers.len(),
        "Evaluating segment"
    );

    let executor = if config.engine.trace_enabled {
        PredicateExecutor::new().with_trace()
    } else {
        PredicateExecutor::new()
    };

    let mut matched = 0usize;
    for customer in &customers {
        let result = executor.execute(compiled.predicate(), customer);
        for line in &result.evaluation_trace {
            debug!(customer_id = customer.id, "{}", line);
        }
        if result.matched {
            matched += 1;
            println!("{}", customer.id);
        }
    }

    info!(matched, total = customers.len(), "Segment evaluated");

    Ok(())
}
