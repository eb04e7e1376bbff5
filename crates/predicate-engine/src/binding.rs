//! 字段绑定
//!
//! 字段绑定把一个稳定的名字映射到实体上的标量字段，或者映射到子集合上的
//! 量化投影（Any / All）。访问器都是无状态的 `Fn + Send + Sync`，并携带名字，
//! 查询转换器可以只看名字重新表达表达式，而不必执行宿主代码。

use crate::error::{Result, RuleError};
use crate::value::{RuleValue, RuleValueKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

type ReadFn<E> = dyn Fn(&E) -> RuleValue + Send + Sync;
type ProjectFn<E> = dyn Fn(&E) -> Vec<RuleValue> + Send + Sync;

/// 标量字段访问器
pub struct Accessor<E> {
    name: Arc<str>,
    read: Arc<ReadFn<E>>,
}

impl<E> Accessor<E> {
    pub fn new<F>(name: impl Into<Arc<str>>, read: F) -> Self
    where
        F: Fn(&E) -> RuleValue + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            read: Arc::new(read),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn read(&self, entity: &E) -> RuleValue {
        (self.read)(entity)
    }
}

impl<E> Clone for Accessor<E> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            read: Arc::clone(&self.read),
        }
    }
}

impl<E> fmt::Debug for Accessor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Accessor").field(&self.name).finish()
    }
}

/// 子集合投影：集合访问器与元素投影的组合
pub struct Projection<E> {
    collection: Arc<str>,
    item: Arc<str>,
    read: Arc<ProjectFn<E>>,
}

impl<E> Projection<E> {
    /// 直接给出 `entity -> [value]` 的投影
    pub fn new<F>(collection: impl Into<Arc<str>>, item: impl Into<Arc<str>>, read: F) -> Self
    where
        F: Fn(&E) -> Vec<RuleValue> + Send + Sync + 'static,
    {
        Self {
            collection: collection.into(),
            item: item.into(),
            read: Arc::new(read),
        }
    }

    /// 由集合访问器和元素投影组合而成
    pub fn of<T, C, P>(
        collection: impl Into<Arc<str>>,
        items: C,
        item: impl Into<Arc<str>>,
        project: P,
    ) -> Self
    where
        E: 'static,
        T: 'static,
        C: Fn(&E) -> &[T] + Send + Sync + 'static,
        P: Fn(&T) -> RuleValue + Send + Sync + 'static,
    {
        Self::new(collection, item, move |entity: &E| {
            items(entity).iter().map(|item| project(item)).collect()
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn values(&self, entity: &E) -> Vec<RuleValue> {
        (self.read)(entity)
    }
}

impl<E> Clone for Projection<E> {
    fn clone(&self) -> Self {
        Self {
            collection: Arc::clone(&self.collection),
            item: Arc::clone(&self.item),
            read: Arc::clone(&self.read),
        }
    }
}

impl<E> fmt::Debug for Projection<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projection")
            .field("collection", &self.collection)
            .field("item", &self.item)
            .finish()
    }
}

/// 量词
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Quantifier {
    /// 存在一个元素满足
    Any,
    /// 所有元素都满足，空集合时为真
    All,
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "ANY"),
            Self::All => write!(f, "ALL"),
        }
    }
}

/// 绑定读取值的方式
pub enum BindingSource<E> {
    Scalar(Accessor<E>),
    Quantified {
        quantifier: Quantifier,
        projection: Projection<E>,
    },
}

impl<E> Clone for BindingSource<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Scalar(accessor) => Self::Scalar(accessor.clone()),
            Self::Quantified {
                quantifier,
                projection,
            } => Self::Quantified {
                quantifier: *quantifier,
                projection: projection.clone(),
            },
        }
    }
}

impl<E> fmt::Debug for BindingSource<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(accessor) => f.debug_tuple("Scalar").field(accessor).finish(),
            Self::Quantified {
                quantifier,
                projection,
            } => f
                .debug_struct("Quantified")
                .field("quantifier", quantifier)
                .field("projection", projection)
                .finish(),
        }
    }
}

/// 字段绑定
pub struct FieldBinding<E> {
    name: Arc<str>,
    kind: RuleValueKind,
    source: BindingSource<E>,
}

impl<E> FieldBinding<E> {
    /// 标量绑定
    pub fn scalar<F>(name: impl Into<Arc<str>>, kind: RuleValueKind, read: F) -> Self
    where
        F: Fn(&E) -> RuleValue + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            source: BindingSource::Scalar(Accessor::new(Arc::clone(&name), read)),
            name,
            kind,
        }
    }

    /// 量化绑定
    pub fn quantified(
        name: impl Into<Arc<str>>,
        kind: RuleValueKind,
        quantifier: Quantifier,
        projection: Projection<E>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            source: BindingSource::Quantified {
                quantifier,
                projection,
            },
        }
    }

    /// 集合中存在一个元素满足规则
    pub fn any<T, C, P>(
        name: impl Into<Arc<str>>,
        kind: RuleValueKind,
        collection: &str,
        items: C,
        item: &str,
        project: P,
    ) -> Self
    where
        E: 'static,
        T: 'static,
        C: Fn(&E) -> &[T] + Send + Sync + 'static,
        P: Fn(&T) -> RuleValue + Send + Sync + 'static,
    {
        Self::quantified(
            name,
            kind,
            Quantifier::Any,
            Projection::of(collection, items, item, project),
        )
    }

    /// 集合中所有元素都满足规则
    pub fn all<T, C, P>(
        name: impl Into<Arc<str>>,
        kind: RuleValueKind,
        collection: &str,
        items: C,
        item: &str,
        project: P,
    ) -> Self
    where
        E: 'static,
        T: 'static,
        C: Fn(&E) -> &[T] + Send + Sync + 'static,
        P: Fn(&T) -> RuleValue + Send + Sync + 'static,
    {
        Self::quantified(
            name,
            kind,
            Quantifier::All,
            Projection::of(collection, items, item, project),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RuleValueKind {
        self.kind
    }

    pub fn source(&self) -> &BindingSource<E> {
        &self.source
    }

    pub fn quantifier(&self) -> Option<Quantifier> {
        match &self.source {
            BindingSource::Scalar(_) => None,
            BindingSource::Quantified { quantifier, .. } => Some(*quantifier),
        }
    }
}

impl<E> Clone for FieldBinding<E> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            kind: self.kind,
            source: self.source.clone(),
        }
    }
}

impl<E> fmt::Debug for FieldBinding<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("source", &self.source)
            .finish()
    }
}

/// 绑定注册表
///
/// 规则定义只保存绑定名，编译时通过注册表解析为具体绑定。
pub struct BindingRegistry<E> {
    bindings: HashMap<String, FieldBinding<E>>,
}

impl<E> BindingRegistry<E> {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// 注册绑定，同名绑定会被替换
    pub fn register(&mut self, binding: FieldBinding<E>) {
        let name = binding.name().to_string();
        if self.bindings.insert(name.clone(), binding).is_some() {
            warn!(binding = %name, "字段绑定已存在，替换为新绑定");
        } else {
            debug!(binding = %name, "Field binding registered");
        }
    }

    pub fn with(mut self, binding: FieldBinding<E>) -> Self {
        self.register(binding);
        self
    }

    pub fn resolve(&self, name: &str) -> Result<FieldBinding<E>> {
        self.bindings
            .get(name)
            .cloned()
            .ok_or_else(|| RuleError::UnresolvedBinding(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<E> Default for BindingRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}
