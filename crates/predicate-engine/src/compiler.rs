//! 规则编译器
//!
//! 将 JSON 规则定义解析为规则树：校验结构、限制嵌套深度、通过注册表解析绑定名，
//! 然后编译为谓词。错误信息带有出错节点的路径，例如 `root.children[1]`。

use crate::binding::BindingRegistry;
use crate::error::{Result, RuleError};
use crate::models::{ConditionDefinition, RuleDefinition, RuleNodeDefinition};
use crate::predicate::CompiledPredicate;
use crate::rule::{Rule, RuleGroup, RuleNode};
use crate::value::RuleValue;
use segment_shared::config::EngineConfig;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info, instrument};

/// 默认最大嵌套深度
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// 编译后的规则
pub struct CompiledRule<E> {
    pub id: String,
    pub name: String,
    pub version: String,
    pub predicate: CompiledPredicate<E>,
    /// 规则中使用的所有绑定名
    pub required_fields: BTreeSet<String>,
}

impl<E> CompiledRule<E> {
    /// 获取规则 ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 获取规则名称
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn predicate(&self) -> &CompiledPredicate<E> {
        &self.predicate
    }

    pub fn evaluate(&self, entity: &E) -> bool {
        self.predicate.evaluate(entity)
    }
}

impl<E> Clone for CompiledRule<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            version: self.version.clone(),
            predicate: self.predicate.clone(),
            required_fields: self.required_fields.clone(),
        }
    }
}

impl<E> fmt::Debug for CompiledRule<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRule")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("version", &self.version)
            .field("predicate", &self.predicate)
            .field("required_fields", &self.required_fields)
            .finish()
    }
}

/// 规则编译器
pub struct RuleCompiler<'a, E> {
    registry: &'a BindingRegistry<E>,
    max_depth: usize,
}

impl<'a, E> RuleCompiler<'a, E> {
    pub fn new(registry: &'a BindingRegistry<E>) -> Self {
        Self {
            registry,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_config(registry: &'a BindingRegistry<E>, config: &EngineConfig) -> Self {
        Self::new(registry).with_max_depth(config.max_definition_depth)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// 从 JSON 字符串编译规则
    pub fn compile_from_json(&self, json: &str) -> Result<CompiledRule<E>> {
        let definition: RuleDefinition = serde_json::from_str(json)?;
        self.compile(&definition)
    }

    /// 编译规则
    #[instrument(skip(self, definition), fields(rule_id = %definition.id))]
    pub fn compile(&self, definition: &RuleDefinition) -> Result<CompiledRule<E>> {
        if definition.id.trim().is_empty() {
            return Err(RuleError::InvalidDefinition("规则 ID 不能为空".to_string()));
        }

        if definition.name.trim().is_empty() {
            return Err(RuleError::InvalidDefinition("规则名称不能为空".to_string()));
        }

        let tree = self.build(&definition.root)?;
        let predicate = tree.compile();
        let required_fields = collect_fields(&definition.root);

        info!(
            rule_name = %definition.name,
            fields = required_fields.len(),
            "规则编译完成"
        );

        Ok(CompiledRule {
            id: definition.id.clone(),
            name: definition.name.clone(),
            version: definition.version.clone(),
            predicate,
            required_fields,
        })
    }

    /// 把节点定义解析为规则树
    pub fn build(&self, root: &RuleNodeDefinition) -> Result<RuleNode<E>> {
        self.build_node(root, "root", 1)
    }

    fn build_node(&self, node: &RuleNodeDefinition, path: &str, depth: usize) -> Result<RuleNode<E>> {
        if depth > self.max_depth {
            return Err(RuleError::InvalidDefinition(format!(
                "节点 '{}' 超过最大嵌套深度 {}",
                path, self.max_depth
            )));
        }

        match node {
            RuleNodeDefinition::Condition(condition) => self
                .build_condition(condition, path)
                .map(RuleNode::Rule)
                .map_err(|e| e.at(path)),
            RuleNodeDefinition::Group(group) => {
                if group.children.is_empty() {
                    debug!(path, operator = %group.operator, "空逻辑组按中性值编译");
                }

                let children = group
                    .children
                    .iter()
                    .enumerate()
                    .map(|(i, child)| {
                        let child_path = format!("{}.children[{}]", path, i);
                        self.build_node(child, &child_path, depth + 1)
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(RuleNode::Group(RuleGroup::new(group.operator, children)))
            }
        }
    }

    fn build_condition(&self, condition: &ConditionDefinition, path: &str) -> Result<Rule<E>> {
        if condition.field.trim().is_empty() {
            return Err(RuleError::InvalidDefinition(format!(
                "条件 '{}' 的字段不能为空",
                path
            )));
        }

        let binding = self.registry.resolve(&condition.field)?;
        let value = RuleValue::from_json(&condition.value).ok_or_else(|| {
            RuleError::InvalidRuleValue {
                binding: condition.field.clone(),
                operator: condition.operator,
                reason: "不支持对象类型的规则值".to_string(),
            }
        })?;

        Rule::new(binding, condition.operator, value)
    }
}

/// 递归收集字段
fn collect_fields(node: &RuleNodeDefinition) -> BTreeSet<String> {
    let mut fields = BTreeSet::new();
    let mut stack = vec![node];
    while let Some(node) = stack.pop() {
        match node {
            RuleNodeDefinition::Condition(condition) => {
                fields.insert(condition.field.clone());
            }
            RuleNodeDefinition::Group(group) => stack.extend(group.children.iter()),
        }
    }
    fields
}
