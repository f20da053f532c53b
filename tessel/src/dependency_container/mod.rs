//! 类型键控的依赖容器
//!
//! 容器按类型保存绑定：要么是一个现成的实例，要么是一个工厂闭包。
//! 单例工厂最多成功执行一次，结果被缓存；瞬态工厂每次解析都会重新执行。
mod resolver;

pub use resolver::{ContainerDependencyResolver, DependencyResolver};

use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock, Weak};

/// 容器内部保存的实例，实际类型为 `Arc<T>`
pub type DependencyInstance = Arc<dyn Any + Send + Sync>;
type FactoryFn =
    Arc<dyn Fn(&Container) -> Result<DependencyInstance, ResolutionError> + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DependencyLifetime {
    Singleton,
    Transient,
}

/// 绑定的键，由 `TypeId` 决定相等性，类型名仅用于诊断
#[derive(Clone, Copy, Debug)]
pub struct BindingKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl BindingKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl PartialEq for BindingKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for BindingKey {}

impl Hash for BindingKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

/// 依赖解析失败的原因
#[derive(Debug)]
pub enum ResolutionError {
    /// 容器中没有该类型的绑定
    NotBound { type_name: &'static str },
    /// 绑定存在，但存储的实例不是请求的类型
    TypeMismatch { type_name: &'static str },
    /// 解析器持有的容器已经被释放
    ContainerDropped { type_name: &'static str },
    /// 工厂闭包执行失败
    Factory {
        type_name: &'static str,
        source: anyhow::Error,
    },
}

impl ResolutionError {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::NotBound { type_name }
            | Self::TypeMismatch { type_name }
            | Self::ContainerDropped { type_name }
            | Self::Factory { type_name, .. } => type_name,
        }
    }
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotBound { type_name } => write!(f, "no binding registered for `{type_name}`"),
            Self::TypeMismatch { type_name } => {
                write!(f, "binding for `{type_name}` holds an instance of another type")
            }
            Self::ContainerDropped { type_name } => {
                write!(f, "container was dropped before `{type_name}` could be resolved")
            }
            Self::Factory { type_name, source } => {
                write!(f, "factory for `{type_name}` failed: {source}")
            }
        }
    }
}

impl std::error::Error for ResolutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Factory { source, .. } => Some(&**source),
            _ => None,
        }
    }
}

#[derive(Clone)]
struct DependencyEntry {
    factory: FactoryFn,
    lifetime: DependencyLifetime,
    instance: Option<Arc<OnceLock<DependencyInstance>>>,
}

impl DependencyEntry {
    fn new(factory: FactoryFn, lifetime: DependencyLifetime) -> Self {
        let instance = if matches!(lifetime, DependencyLifetime::Singleton) {
            Some(Arc::new(OnceLock::new()))
        } else {
            None
        };
        Self {
            factory,
            lifetime,
            instance,
        }
    }

    fn resolve(&self, container: &Container) -> Result<DependencyInstance, ResolutionError> {
        match &self.instance {
            Some(cell) => {
                if let Some(instance) = cell.get() {
                    return Ok(instance.clone());
                }
                // 失败时不写入缓存，下次解析会重试
                let created = (self.factory)(container)?;
                Ok(cell.get_or_init(|| created).clone())
            }
            None => (self.factory)(container),
        }
    }
}

#[derive(Clone)]
enum Binding {
    Instance(DependencyInstance),
    Factory(DependencyEntry),
}

#[derive(Default)]
struct ContainerInner {
    bindings: RwLock<HashMap<BindingKey, Binding>>,
}

/// 共享的依赖容器，克隆后指向同一组绑定
///
/// `has_binding` 与 `bind_*` 之间的“先检查再绑定”不是原子操作，
/// 只应在单线程的启动阶段使用；并发注册需要调用方自行加锁。
#[derive(Clone, Default)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Container {
    /// 创建一个空容器
    pub fn new() -> Self {
        Self::default()
    }

    /// 判断某个类型是否已有绑定
    pub fn has_binding<T: ?Sized + 'static>(&self) -> bool {
        self.inner
            .bindings
            .read()
            .contains_key(&BindingKey::of::<T>())
    }

    /// 解析某个类型的实例
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolutionError> {
        let key = BindingKey::of::<T>();
        let instance = self.resolve_key(key)?;
        downcast_instance::<T>(instance, key)
    }

    /// 按键解析原始实例（内部存储的是 `Arc<T>`）
    pub fn resolve_key(&self, key: BindingKey) -> Result<DependencyInstance, ResolutionError> {
        // 先克隆出绑定再释放读锁，工厂内部可以继续解析其他依赖
        let binding = self.inner.bindings.read().get(&key).cloned();
        match binding {
            Some(Binding::Instance(instance)) => Ok(instance),
            Some(Binding::Factory(entry)) => {
                tracing::trace!(
                    binding = key.type_name(),
                    lifetime = ?entry.lifetime,
                    "resolving factory binding"
                );
                entry.resolve(self)
            }
            None => Err(ResolutionError::NotBound {
                type_name: key.type_name(),
            }),
        }
    }

    /// 绑定一个现成的实例，已有绑定会被替换
    pub fn bind_instance<T: ?Sized + Send + Sync + 'static>(&self, instance: Arc<T>) {
        let key = BindingKey::of::<T>();
        tracing::debug!(binding = key.type_name(), "binding instance");
        self.insert(key, Binding::Instance(Arc::new(instance)));
    }

    /// 绑定一个工厂闭包，按生命周期决定是否缓存结果
    pub fn bind_factory<T, F>(&self, lifetime: DependencyLifetime, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> anyhow::Result<Arc<T>> + Send + Sync + 'static,
    {
        let key = BindingKey::of::<T>();
        let factory: FactoryFn = Arc::new(move |container: &Container| {
            factory(container)
                .map(|instance| Arc::new(instance) as DependencyInstance)
                .map_err(|source| ResolutionError::Factory {
                    type_name: key.type_name(),
                    source,
                })
        });
        tracing::debug!(binding = key.type_name(), lifetime = ?lifetime, "binding factory");
        self.insert(key, Binding::Factory(DependencyEntry::new(factory, lifetime)));
    }

    /// 绑定一个惰性单例
    pub fn bind_singleton<T, F>(&self, factory: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Container) -> anyhow::Result<Arc<T>> + Send + Sync + 'static,
    {
        self.bind_factory(DependencyLifetime::Singleton, factory);
    }

    /// 移除某个类型的绑定，返回是否存在过
    pub fn unbind<T: ?Sized + 'static>(&self) -> bool {
        self.inner
            .bindings
            .write()
            .remove(&BindingKey::of::<T>())
            .is_some()
    }

    /// 当前绑定数量
    pub fn len(&self) -> usize {
        self.inner.bindings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 获取一个不持有所有权的句柄，避免实例与容器之间的循环引用
    pub fn downgrade(&self) -> WeakContainer {
        WeakContainer(Arc::downgrade(&self.inner))
    }

    /// 判断两个句柄是否指向同一个容器
    pub fn ptr_eq(&self, other: &Container) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn insert(&self, key: BindingKey, binding: Binding) {
        self.inner.bindings.write().insert(key, binding);
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bindings = self.inner.bindings.read();
        f.debug_struct("Container")
            .field(
                "bindings",
                &bindings.keys().map(BindingKey::type_name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// 容器的弱引用句柄
#[derive(Clone)]
pub struct WeakContainer(Weak<ContainerInner>);

impl WeakContainer {
    pub fn upgrade(&self) -> Option<Container> {
        self.0.upgrade().map(|inner| Container { inner })
    }
}

pub(crate) fn downcast_instance<T: ?Sized + Send + Sync + 'static>(
    instance: DependencyInstance,
    key: BindingKey,
) -> Result<Arc<T>, ResolutionError> {
    instance
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or(ResolutionError::TypeMismatch {
            type_name: key.type_name(),
        })
}
