//! 框架组件
//!
//! [`ComponentBuilder`] 向 [`ApplicationBuilder`] 注册两个具名组件工厂：
//!
//! - `commands`：在容器中确保存在唯一的 [`SharedCommandRegistry`]，再依次应用配置回调
//! - `routes`：确保存在依赖解析器、[`RouterKernel`] 与 [`LazyRouteFactory`]，
//!   并追加一个延迟执行的路由表生产者
//!
//! 两者都采用“先检查再绑定”的方式创建共享单例，只应在单线程的启动阶段执行。
use crate::app::{ApplicationBuilder, BootstrapError};
use crate::commands::{CommandRegistry, SharedCommandRegistry};
use crate::dependency_container::{Container, ContainerDependencyResolver, DependencyResolver};
use crate::router::{LazyRouteFactory, RouteBuilderRegistry, RouterKernel};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 命令组件的名称
pub const COMMANDS: &str = "commands";
/// 路由组件的名称
pub const ROUTES: &str = "routes";

/// 组件配置回调
pub type ConfigCallback<T> = Arc<dyn Fn(&mut T) -> anyhow::Result<()> + Send + Sync>;

#[derive(Clone)]
struct ErasedCallback {
    target: &'static str,
    callback: Arc<dyn Any + Send + Sync>,
}

/// 某个组件累积的配置回调，按注册顺序保存
#[derive(Clone)]
pub struct ComponentCallbacks {
    component: String,
    callbacks: Vec<ErasedCallback>,
}

impl ComponentCallbacks {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            callbacks: Vec::new(),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    /// 追加一个作用于 `T` 的回调
    pub fn push<T, F>(&mut self, callback: F)
    where
        T: 'static,
        F: Fn(&mut T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let callback: ConfigCallback<T> = Arc::new(callback);
        self.callbacks.push(ErasedCallback {
            target: std::any::type_name::<T>(),
            callback: Arc::new(callback),
        });
    }

    /// 以具体类型取回全部回调
    ///
    /// 只要有一个回调的目标类型不是 `T` 就返回错误
    pub fn typed<T: 'static>(&self) -> Result<Vec<ConfigCallback<T>>, BootstrapError> {
        self.callbacks
            .iter()
            .map(|erased| {
                erased
                    .callback
                    .downcast_ref::<ConfigCallback<T>>()
                    .cloned()
                    .ok_or_else(|| BootstrapError::CallbackTypeMismatch {
                        component: self.component.clone(),
                        expected: std::any::type_name::<T>(),
                        found: erased.target,
                    })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl fmt::Debug for ComponentCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentCallbacks")
            .field("component", &self.component)
            .field(
                "targets",
                &self.callbacks.iter().map(|c| c.target).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// 注册框架自带组件的构建器
#[derive(Debug, Default, Clone, Copy)]
pub struct ComponentBuilder;

impl ComponentBuilder {
    pub fn new() -> Self {
        Self
    }

    /// 注册控制台命令组件
    pub fn with_command_component(&self, builder: &mut ApplicationBuilder) -> &Self {
        builder.register_component_factory(COMMANDS, |_builder, container, callbacks| {
            register_commands(container, &callbacks)
        });
        self
    }

    /// 注册路由组件
    pub fn with_route_component(&self, builder: &mut ApplicationBuilder) -> &Self {
        builder.register_component_factory(ROUTES, |builder, container, callbacks| {
            register_routes(builder, container, &callbacks)
        });
        self
    }
}

/// 命令组件工厂
///
/// 复用容器中已有的 [`SharedCommandRegistry`]，没有则创建并绑定，
/// 然后按顺序把每个回调应用到它上面。回调的错误原样返回。
pub fn register_commands(
    container: &Container,
    callbacks: &ComponentCallbacks,
) -> anyhow::Result<()> {
    let callbacks = callbacks.typed::<CommandRegistry>()?;

    let commands = if container.has_binding::<SharedCommandRegistry>() {
        container.resolve::<SharedCommandRegistry>()?
    } else {
        let commands = Arc::new(SharedCommandRegistry::new(CommandRegistry::new()));
        container.bind_instance(commands.clone());
        commands
    };

    let mut registry = commands.write();
    for callback in &callbacks {
        callback(&mut *registry)?;
    }
    tracing::debug!(
        component = COMMANDS,
        callbacks = callbacks.len(),
        commands = registry.len(),
        "command component registered"
    );
    Ok(())
}

/// 路由组件工厂
///
/// 1. 确保容器中有 `dyn DependencyResolver`，供路由内核实例化处理器
/// 2. 向应用构建器登记路由入口，[`RouterKernel`] 在需要时才从容器解析
/// 3. 确保容器中有 [`LazyRouteFactory`]
/// 4. 追加一个生产者：执行时新建 [`RouteBuilderRegistry`]，依次应用回调后 `build_all`
///
/// 生产者不会在这里执行。
pub fn register_routes(
    builder: &mut ApplicationBuilder,
    container: &Container,
    callbacks: &ComponentCallbacks,
) -> anyhow::Result<()> {
    let callbacks = callbacks.typed::<RouteBuilderRegistry>()?;

    if !container.has_binding::<dyn DependencyResolver>() {
        let resolver: Arc<dyn DependencyResolver> =
            Arc::new(ContainerDependencyResolver::new(container));
        container.bind_instance(resolver);
    }

    if !container.has_binding::<RouterKernel>() {
        container.bind_singleton(|container: &Container| {
            Ok(Arc::new(RouterKernel::new(
                container.resolve::<LazyRouteFactory>()?,
                container.resolve::<dyn DependencyResolver>()?,
            )))
        });
    }
    builder.with_router(|container: &Container| {
        let kernel = container.resolve::<RouterKernel>()?;
        Ok(RouterKernel::clone(&kernel).into_service())
    });

    let route_factory = if container.has_binding::<LazyRouteFactory>() {
        container.resolve::<LazyRouteFactory>()?
    } else {
        let route_factory = Arc::new(LazyRouteFactory::new());
        container.bind_instance(route_factory.clone());
        route_factory
    };

    let callback_count = callbacks.len();
    route_factory.add_factory(move || {
        let mut routes = RouteBuilderRegistry::new();
        for callback in &callbacks {
            callback(&mut routes)?;
        }
        Ok(routes.build_all()?)
    });
    tracing::debug!(
        component = ROUTES,
        callbacks = callback_count,
        producers = route_factory.producer_count(),
        "route component registered"
    );
    Ok(())
}
