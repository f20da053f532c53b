use super::{BindingKey, Container, DependencyInstance, ResolutionError, WeakContainer};
use std::sync::Arc;

/// 路由在分发时用来实例化请求处理器的解析能力
pub trait DependencyResolver: Send + Sync {
    fn resolve_key(&self, key: BindingKey) -> Result<DependencyInstance, ResolutionError>;
}

impl dyn DependencyResolver + '_ {
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolutionError> {
        let key = BindingKey::of::<T>();
        let instance = self.resolve_key(key)?;
        super::downcast_instance::<T>(instance, key)
    }
}

/// 基于容器的解析器
///
/// 只持有容器的弱引用：解析器本身通常就绑定在同一个容器里。
pub struct ContainerDependencyResolver {
    container: WeakContainer,
}

impl ContainerDependencyResolver {
    pub fn new(container: &Container) -> Self {
        Self {
            container: container.downgrade(),
        }
    }
}

impl DependencyResolver for ContainerDependencyResolver {
    fn resolve_key(&self, key: BindingKey) -> Result<DependencyInstance, ResolutionError> {
        let container = self
            .container
            .upgrade()
            .ok_or(ResolutionError::ContainerDropped {
                type_name: key.type_name(),
            })?;
        container.resolve_key(key)
    }
}
