//! 编译后的谓词
//!
//! `CompiledPredicate` 是引擎唯一对外的产物：既可以直接在内存中求值，
//! 也可以把表达式树原样交给查询转换器。

use crate::error::{Result, TranslationError};
use crate::expr::Expr;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// 把表达式树转换为存储端查询的转换器
pub trait QueryTranslator<E> {
    type Query;

    fn translate(&self, expr: &Expr<E>) -> std::result::Result<Self::Query, TranslationError>;
}

/// 编译后的谓词，克隆开销很小，可以在线程间共享
pub struct CompiledPredicate<E> {
    expr: Arc<Expr<E>>,
}

impl<E> CompiledPredicate<E> {
    pub(crate) fn new(expr: Expr<E>) -> Self {
        Self {
            expr: Arc::new(expr),
        }
    }

    /// 对单个实体求值
    pub fn evaluate(&self, entity: &E) -> bool {
        self.expr.evaluate(entity)
    }

    /// 按原顺序返回满足谓词的实体
    pub fn filter<'a, I>(&self, entities: I) -> Vec<&'a E>
    where
        I: IntoIterator<Item = &'a E>,
        E: 'a,
    {
        entities
            .into_iter()
            .filter(|entity| self.evaluate(entity))
            .collect()
    }

    pub fn expr(&self) -> &Expr<E> {
        &self.expr
    }

    /// 谓词读取的绑定名
    pub fn referenced_bindings(&self) -> BTreeSet<String> {
        self.expr.referenced_bindings()
    }

    /// 交给查询转换器，转换错误原样返回
    pub fn translate<T>(&self, translator: &T) -> Result<T::Query>
    where
        T: QueryTranslator<E>,
    {
        translator.translate(&self.expr).map_err(|e| {
            warn!(target_store = %e.target, error = %e.message, "谓词转换失败");
            e.into()
        })
    }
}

impl<E> Clone for CompiledPredicate<E> {
    fn clone(&self) -> Self {
        Self {
            expr: Arc::clone(&self.expr),
        }
    }
}

impl<E> fmt::Debug for CompiledPredicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CompiledPredicate")
            .field(&format_args!("{}", self.expr))
            .finish()
    }
}

impl<E> fmt::Display for CompiledPredicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}
