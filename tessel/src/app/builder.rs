use super::{Application, BootstrapError};
use crate::commands::CommandRegistry;
use crate::component::{COMMANDS, ComponentCallbacks, ROUTES};
use crate::config::ApplicationConfig;
use crate::dependency_container::Container;
use crate::router::{HttpSvc, RouteBuilderRegistry};
use std::collections::HashMap;
use std::sync::Arc;

/// 具名组件工厂，构建应用时以容器和该组件累积的回调调用一次
///
/// 工厂可以通过收到的构建器调用 `with_router`，但不能再登记组件工厂或组件回调，
/// 否则 `build` 返回 [`BootstrapError::LateRegistration`]。
pub type ComponentFactory = Box<
    dyn FnOnce(&mut ApplicationBuilder, &Container, ComponentCallbacks) -> anyhow::Result<()>
        + Send,
>;

/// 从容器中取得请求入口的闭包
pub type RouterResolver = Arc<dyn Fn(&Container) -> anyhow::Result<HttpSvc> + Send + Sync>;

type Bootstrapper = Box<dyn FnOnce(&Container) -> anyhow::Result<()> + Send>;

/// 可复用的配置单元，一次性向构建器登记回调、组件或启动器
pub trait Module {
    fn build(&self, builder: &mut ApplicationBuilder);
}

/// 应用构建器
///
/// 收集组件工厂与各组件的配置回调，`build` 时按注册顺序执行。
pub struct ApplicationBuilder {
    container: Container,
    config: Option<ApplicationConfig>,
    factories: Vec<(String, ComponentFactory)>,
    callbacks: HashMap<String, ComponentCallbacks>,
    bootstrappers: Vec<Bootstrapper>,
    router: Option<RouterResolver>,
}

impl ApplicationBuilder {
    /// 使用一个新的空容器
    pub fn new() -> Self {
        Self::with_container(Container::new())
    }

    /// 使用已有的容器
    pub fn with_container(container: Container) -> Self {
        Self {
            container,
            config: None,
            factories: Vec::new(),
            callbacks: HashMap::new(),
            bootstrappers: Vec::new(),
            router: None,
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn with_config(&mut self, config: ApplicationConfig) -> &mut Self {
        self.config = Some(config);
        self
    }

    /// 注册组件工厂
    ///
    /// 同名工厂会被替换，执行顺序保持首次注册时的位置
    pub fn register_component_factory<F>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) -> &mut Self
    where
        F: FnOnce(&mut ApplicationBuilder, &Container, ComponentCallbacks) -> anyhow::Result<()>
            + Send
            + 'static,
    {
        let name = name.into();
        let factory: ComponentFactory = Box::new(factory);
        match self.factories.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => {
                tracing::debug!(component = %name, "replacing component factory");
                slot.1 = factory;
            }
            None => self.factories.push((name, factory)),
        }
        self
    }

    /// 为某个组件追加配置回调
    pub fn with_component<T, F>(&mut self, name: impl Into<String>, callback: F) -> &mut Self
    where
        T: 'static,
        F: Fn(&mut T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let name = name.into();
        self.callbacks
            .entry(name.clone())
            .or_insert_with(|| ComponentCallbacks::new(name))
            .push(callback);
        self
    }

    /// 为命令组件追加配置回调
    pub fn with_commands<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut CommandRegistry) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.with_component(COMMANDS, callback)
    }

    /// 为路由组件追加配置回调
    pub fn with_routes<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&mut RouteBuilderRegistry) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.with_component(ROUTES, callback)
    }

    /// 追加一个启动器，在所有组件工厂之前执行
    pub fn with_bootstrapper<F>(&mut self, bootstrapper: F) -> &mut Self
    where
        F: FnOnce(&Container) -> anyhow::Result<()> + Send + 'static,
    {
        self.bootstrappers.push(Box::new(bootstrapper));
        self
    }

    /// 应用一个模块
    pub fn with_module(&mut self, module: impl Module) -> &mut Self {
        module.build(self);
        self
    }

    /// 登记请求入口，入口在第一次需要时才从容器解析
    pub fn with_router<F>(&mut self, resolver: F) -> &mut Self
    where
        F: Fn(&Container) -> anyhow::Result<HttpSvc> + Send + Sync + 'static,
    {
        if self.router.is_some() {
            tracing::debug!("replacing router resolver");
        }
        self.router = Some(Arc::new(resolver));
        self
    }

    /// 执行启动器与全部组件工厂，生成应用
    ///
    /// 任一启动器、工厂或回调失败时，错误原样返回
    pub fn build(mut self) -> anyhow::Result<Application> {
        let mut orphaned: Vec<&String> = self
            .callbacks
            .iter()
            .filter(|(name, callbacks)| {
                !callbacks.is_empty() && !self.factories.iter().any(|(n, _)| n == *name)
            })
            .map(|(name, _)| name)
            .collect();
        orphaned.sort();
        if let Some(component) = orphaned.first() {
            return Err(BootstrapError::MissingComponentFactory {
                component: component.to_string(),
            }
            .into());
        }

        let container = self.container.clone();
        for bootstrapper in std::mem::take(&mut self.bootstrappers) {
            bootstrapper(&container)?;
        }

        let factories = std::mem::take(&mut self.factories);
        let mut callbacks = std::mem::take(&mut self.callbacks);
        for (name, factory) in factories {
            let component_callbacks = callbacks
                .remove(&name)
                .unwrap_or_else(|| ComponentCallbacks::new(name.clone()));
            tracing::debug!(
                component = %name,
                callbacks = component_callbacks.len(),
                "building component"
            );
            factory(&mut self, &container, component_callbacks)?;
        }

        // 工厂执行期间新登记的工厂或回调已经没有机会执行
        let late = self
            .factories
            .iter()
            .map(|(name, _)| name)
            .chain(self.callbacks.keys())
            .min()
            .cloned();
        if let Some(component) = late {
            return Err(BootstrapError::LateRegistration { component }.into());
        }

        let config = self
            .config
            .take()
            .unwrap_or_else(ApplicationConfig::load_or_default);
        Ok(Application::new(config, container, self.router.take()))
    }
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "auto")]
impl ApplicationBuilder {
    /// 应用所有通过 `inventory::submit!` 登记的模块
    pub fn with_discovered_modules(&mut self) -> &mut Self {
        for flag in inventory::iter::<crate::auto::ModuleFlag> {
            tracing::debug!(module = flag.name, "applying discovered module");
            (flag.register)(self);
        }
        self
    }
}
