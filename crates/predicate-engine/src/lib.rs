//! 规则谓词编译引擎
//!
//! 把声明式的规则（字段绑定、比较操作符、比较值）编译为以实体为参数的布尔谓词：
//! - 强类型字段绑定，支持标量字段与 Any/All 量化子集合
//! - 构造时校验操作符与值域，编译不会失败
//! - AND/OR 规则组按短路语义组合
//! - 同一棵表达式树既可内存求值，也可交给查询转换器
//! - JSON 规则定义解析与评估追踪

pub mod binding;
pub mod compiler;
pub mod customer;
pub mod error;
pub mod executor;
pub mod expr;
pub mod models;
pub mod operators;
pub mod predicate;
pub mod rule;
pub mod value;

pub use binding::{Accessor, BindingRegistry, BindingSource, FieldBinding, Projection, Quantifier};
pub use compiler::{CompiledRule, RuleCompiler};
pub use error::{Result, RuleError, TranslationError};
pub use executor::{EvaluationResult, PredicateExecutor};
pub use expr::{Comparison, ConditionLabel, Expr, Operand, TextOp};
pub use models::{ConditionDefinition, GroupDefinition, RuleDefinition, RuleNodeDefinition};
pub use operators::{LogicalOperator, Operator};
pub use predicate::{CompiledPredicate, QueryTranslator};
pub use rule::{Rule, RuleGroup, RuleNode};
pub use value::{RuleValue, RuleValueKind};
