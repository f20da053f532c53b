use super::RouteError;
use crate::dependency_container::{DependencyResolver, ResolutionError};
use crate::handler::RequestHandler;
use hyper::Method;
use matchit::Router as MRouter;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tessel_core::encode_route;

type ResolveHandlerFn =
    fn(&dyn DependencyResolver) -> Result<Arc<dyn RequestHandler>, ResolutionError>;

/// 路由命中后要执行的动作
#[derive(Clone)]
pub enum RouteAction {
    /// 每次分发时从容器解析处理器
    Resolved {
        handler_type: &'static str,
        resolve: ResolveHandlerFn,
    },
    /// 预先构造好的处理器
    Instance(Arc<dyn RequestHandler>),
}

impl RouteAction {
    pub fn resolved<H: RequestHandler>() -> Self {
        fn resolve<H: RequestHandler>(
            resolver: &dyn DependencyResolver,
        ) -> Result<Arc<dyn RequestHandler>, ResolutionError> {
            let handler: Arc<dyn RequestHandler> = resolver.resolve::<H>()?;
            Ok(handler)
        }
        Self::Resolved {
            handler_type: std::any::type_name::<H>(),
            resolve: resolve::<H>,
        }
    }

    pub fn instance(handler: impl RequestHandler) -> Self {
        Self::Instance(Arc::new(handler))
    }

    /// 取得本次分发使用的处理器
    pub fn handler(
        &self,
        resolver: &dyn DependencyResolver,
    ) -> Result<Arc<dyn RequestHandler>, ResolutionError> {
        match self {
            Self::Resolved { resolve, .. } => resolve(resolver),
            Self::Instance(handler) => Ok(handler.clone()),
        }
    }
}

impl fmt::Debug for RouteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved { handler_type, .. } => {
                f.debug_tuple("Resolved").field(handler_type).finish()
            }
            Self::Instance(_) => f.write_str("Instance(..)"),
        }
    }
}

/// 已构建完成的路由
#[derive(Clone, Debug)]
pub struct Route {
    pub methods: Vec<Method>,
    pub path: String,
    pub name: Option<String>,
    pub attributes: HashMap<String, String>,
    pub action: RouteAction,
}

/// 不可变的路由表，保持注册顺序
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Route> {
        self.routes.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Route> {
        self.routes.get(index)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// 按名称查找路由
    pub fn named(&self, name: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|route| route.name.as_deref() == Some(name))
    }

    /// 追加另一张路由表的全部路由，不做校验
    pub fn extend(&mut self, other: RouteTable) {
        self.routes.extend(other.routes);
    }

    /// 校验整张表：名称不能重复，同一方法下的路径模板不能冲突
    pub fn validate(&self) -> Result<(), RouteError> {
        let mut names = HashSet::new();
        for route in &self.routes {
            if let Some(name) = &route.name
                && !names.insert(name.as_str())
            {
                return Err(RouteError::DuplicateName { name: name.clone() });
            }
        }
        self.method_routers().map(|_| ())
    }

    /// 每个方法一棵 matchit 树，值为路由在表中的下标
    pub(crate) fn method_routers(&self) -> Result<HashMap<Method, MRouter<usize>>, RouteError> {
        let mut by_method: HashMap<Method, MRouter<usize>> = HashMap::new();
        for (index, route) in self.routes.iter().enumerate() {
            for method in &route.methods {
                by_method
                    .entry(method.clone())
                    .or_default()
                    .insert(encode_route(&route.path), index)
                    .map_err(|e| RouteError::Conflict {
                        method: method.clone(),
                        path: route.path.clone(),
                        reason: e.to_string(),
                    })?;
            }
        }
        Ok(by_method)
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a Route;
    type IntoIter = std::slice::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.routes.iter()
    }
}
