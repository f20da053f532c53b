use super::RouteError;
use super::route::{Route, RouteAction, RouteTable};
use crate::handler::RequestHandler;
use hyper::Method;
use std::collections::HashMap;
use tessel_core::{IntoMethods, join_route};

/// 生成各 HTTP 方法的简化注册函数（如 get/post/...）
macro_rules! define_method {
    ($name:ident, $m:ident) => {
        /// 在给定路径上注册一条路由（此函数注册指定的 HTTP 方法）
        pub fn $name(&mut self, path: &str) -> &mut RouteBuilder {
            self.route(Method::$m, path)
        }
    };
}

/// 单条路由的构建器
#[derive(Debug)]
pub struct RouteBuilder {
    methods: Vec<Method>,
    path: String,
    name: Option<String>,
    attributes: HashMap<String, String>,
    action: Option<RouteAction>,
}

impl RouteBuilder {
    fn new(methods: Vec<Method>, path: String) -> Self {
        Self {
            methods,
            path,
            name: None,
            attributes: HashMap::new(),
            action: None,
        }
    }

    /// 路由命中后从容器解析 `H` 并交给它处理
    pub fn to<H: RequestHandler>(&mut self) -> &mut Self {
        self.action = Some(RouteAction::resolved::<H>());
        self
    }

    /// 路由命中后交给一个预先构造的处理器
    pub fn to_handler(&mut self, handler: impl RequestHandler) -> &mut Self {
        self.action = Some(RouteAction::instance(handler));
        self
    }

    pub fn named(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn attribute(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    fn build(self) -> Result<Route, RouteError> {
        if self.path.contains("//") {
            return Err(RouteError::InvalidPath {
                path: self.path,
                reason: "path contains an empty segment".to_string(),
            });
        }
        if self.methods.is_empty() {
            return Err(RouteError::NoMethods { path: self.path });
        }
        let Some(action) = self.action else {
            return Err(RouteError::MissingAction { path: self.path });
        };
        Ok(Route {
            methods: self.methods,
            path: self.path,
            name: self.name,
            attributes: self.attributes,
            action,
        })
    }
}

/// 路由构建注册表
///
/// 每次生成路由表时都会新建一个实例，配置回调向其中注册路由，
/// 最后通过 [`build_all`](Self::build_all) 固化为不可变的 [`RouteTable`]。
#[derive(Debug, Default)]
pub struct RouteBuilderRegistry {
    builders: Vec<RouteBuilder>,
    prefix: String,
}

impl RouteBuilderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一条路由
    ///
    /// - 支持一次注册多个方法，例如 `"GET, HEAD"` 或 `[Method::GET, Method::POST]`
    /// - 当前处于 [`group`](Self::group) 中时会自动加上分组前缀
    pub fn route(&mut self, methods: impl IntoMethods, path: &str) -> &mut RouteBuilder {
        let path = join_route(&self.prefix, path);
        self.builders
            .push(RouteBuilder::new(methods.into_methods(), path));
        let last = self.builders.len() - 1;
        &mut self.builders[last]
    }

    define_method!(get, GET);
    define_method!(post, POST);
    define_method!(put, PUT);
    define_method!(delete, DELETE);
    define_method!(patch, PATCH);
    define_method!(head, HEAD);
    define_method!(options, OPTIONS);

    /// 在给定前缀下注册一组路由，可以嵌套
    pub fn group<F>(&mut self, prefix: &str, routes: F) -> &mut Self
    where
        F: FnOnce(&mut RouteBuilderRegistry),
    {
        let nested = join_route(&self.prefix, prefix);
        let previous = std::mem::replace(&mut self.prefix, nested);
        routes(self);
        self.prefix = previous;
        self
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// 构建全部路由
    ///
    /// 缺少处理器、没有方法、路径含空段、名称重复或模板冲突都会返回错误
    pub fn build_all(self) -> Result<RouteTable, RouteError> {
        let routes = self
            .builders
            .into_iter()
            .map(RouteBuilder::build)
            .collect::<Result<Vec<_>, _>>()?;
        let table = RouteTable::new(routes);
        table.validate()?;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;

    fn ok_handler() -> impl RequestHandler {
        handler_fn(|_req| async { "ok" })
    }

    #[test]
    fn groups_prefix_nested_routes() {
        let mut registry = RouteBuilderRegistry::new();
        registry.group("/api", |api| {
            api.get("/users").to_handler(ok_handler());
            api.group("v2/", |v2| {
                v2.post("/users/{id}").to_handler(ok_handler());
            });
        });
        registry.get("/health").to_handler(ok_handler());

        let table = registry.build_all().unwrap();
        let paths: Vec<_> = table.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, ["/api/users", "/api/v2/users/{id}", "/health"]);
    }

    #[test]
    fn route_without_action_is_rejected() {
        let mut registry = RouteBuilderRegistry::new();
        registry.get("/orphan");
        match registry.build_all() {
            Err(RouteError::MissingAction { path }) => assert_eq!(path, "/orphan"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = RouteBuilderRegistry::new();
        registry.get("/a").named("home").to_handler(ok_handler());
        registry.get("/b").named("home").to_handler(ok_handler());
        assert!(matches!(
            registry.build_all(),
            Err(RouteError::DuplicateName { name }) if name == "home"
        ));
    }

    #[test]
    fn empty_segments_are_rejected() {
        let mut registry = RouteBuilderRegistry::new();
        registry.get("/files//raw").to_handler(ok_handler());
        assert!(matches!(
            registry.build_all(),
            Err(RouteError::InvalidPath { path, .. }) if path == "/files//raw"
        ));
    }

    #[test]
    fn unknown_methods_leave_route_without_methods() {
        let mut registry = RouteBuilderRegistry::new();
        registry.route("", "/x").to_handler(ok_handler());
        assert!(matches!(
            registry.build_all(),
            Err(RouteError::NoMethods { .. })
        ));
    }

    #[test]
    fn named_routes_keep_attributes() {
        let mut registry = RouteBuilderRegistry::new();
        registry
            .route("GET, HEAD", "/docs")
            .named("docs")
            .attribute("auth", "none")
            .to_handler(ok_handler());
        let table = registry.build_all().unwrap();
        let route = table.named("docs").unwrap();
        assert_eq!(route.methods, vec![Method::GET, Method::HEAD]);
        assert_eq!(route.attributes.get("auth").map(String::as_str), Some("none"));
    }
}
