//! 谓词执行器
//!
//! 对单个实体执行编译后的谓词，按需记录评估追踪：每条规则的结果以及 AND/OR 的短路位置。
//! 结果与 [`CompiledPredicate::evaluate`] 完全一致。

use crate::expr::Expr;
use crate::predicate::CompiledPredicate;
use crate::value::RuleValue;
use serde::Serialize;
use std::time::Instant;
use tracing::trace;

/// 评估结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationResult {
    pub matched: bool,
    pub matched_conditions: Vec<String>,
    pub evaluation_trace: Vec<String>,
    pub evaluation_time_us: u64,
}

/// 谓词执行器
#[derive(Debug, Clone, Default)]
pub struct PredicateExecutor {
    /// 是否记录详细评估追踪
    trace_enabled: bool,
}

#[derive(Clone, Copy)]
enum Connective {
    And,
    Or,
}

impl PredicateExecutor {
    pub fn new() -> Self {
        Self {
            trace_enabled: false,
        }
    }

    /// 启用评估追踪
    pub fn with_trace(mut self) -> Self {
        self.trace_enabled = true;
        self
    }

    pub fn trace_enabled(&self) -> bool {
        self.trace_enabled
    }

    /// 执行谓词评估
    pub fn execute<E>(&self, predicate: &CompiledPredicate<E>, entity: &E) -> EvaluationResult {
        let start = Instant::now();

        let mut result = EvaluationResult::default();
        let matched = self.evaluate_node(predicate.expr(), entity, None, &mut result, "root");

        result.matched = matched;
        result.evaluation_time_us = start.elapsed().as_micros() as u64;

        trace!(
            matched = result.matched,
            elapsed_us = result.evaluation_time_us,
            "Predicate evaluated"
        );

        result
    }

    fn evaluate_node<E>(
        &self,
        expr: &Expr<E>,
        entity: &E,
        element: Option<&RuleValue>,
        result: &mut EvaluationResult,
        path: &str,
    ) -> bool {
        match expr {
            Expr::And(children) => {
                self.evaluate_group(Connective::And, children, entity, element, result, path)
            }
            Expr::Or(children) => {
                self.evaluate_group(Connective::Or, children, entity, element, result, path)
            }
            Expr::Not(inner) => !self.evaluate_node(inner, entity, element, result, path),
            Expr::Condition { label, body } => {
                let matched = body.eval(entity, element);

                if self.trace_enabled {
                    result.evaluation_trace.push(format!(
                        "{}: {} => {}",
                        path,
                        label,
                        if matched { "MATCHED" } else { "NOT_MATCHED" }
                    ));
                }

                if matched {
                    result.matched_conditions.push(format!("{}: {}", path, label));
                }

                matched
            }
            Expr::Const(value) => {
                if self.trace_enabled {
                    result
                        .evaluation_trace
                        .push(format!("{}: 空组取中性值 {}", path, value));
                }
                *value
            }
            other => other.eval(entity, element),
        }
    }

    /// 按顺序评估逻辑组的子节点（短路求值）
    fn evaluate_group<E>(
        &self,
        connective: Connective,
        children: &[Expr<E>],
        entity: &E,
        element: Option<&RuleValue>,
        result: &mut EvaluationResult,
        path: &str,
    ) -> bool {
        let name = match connective {
            Connective::And => "AND",
            Connective::Or => "OR",
        };

        if self.trace_enabled {
            result.evaluation_trace.push(format!(
                "{}: 开始评估 {} 组 (共 {} 个子节点)",
                path,
                name,
                children.len()
            ));
        }

        // AND 遇到 false 立即返回，OR 遇到 true 立即返回
        let stop_on = matches!(connective, Connective::Or);
        for (i, child) in children.iter().enumerate() {
            let child_path = format!("{}.children[{}]", path, i);
            if self.evaluate_node(child, entity, element, result, &child_path) == stop_on {
                if self.trace_enabled {
                    let outcome = if stop_on { "匹配" } else { "不匹配" };
                    result
                        .evaluation_trace
                        .push(format!("{}: {} 短路 - 子节点 {} {}", path, name, i, outcome));
                }
                return stop_on;
            }
        }

        if self.trace_enabled {
            let summary = if stop_on { "OR 组无匹配" } else { "AND 组全部匹配" };
            result.evaluation_trace.push(format!("{}: {}", path, summary));
        }
        !stop_on
    }
}
