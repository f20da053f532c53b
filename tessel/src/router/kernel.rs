use super::params::{MatchedRoute, RouteParams};
use super::route::{Route, RouteTable};
use super::{HttpSvc, LazyRouteFactory, RouteError};
use crate::dependency_container::DependencyResolver;
use crate::error::app_error::TRACE_ID;
use crate::{AppError, AppResult, IntoResponse};
use hyper::Method;
use matchit::Router as MRouter;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tessel_core::{Req, Resp};
use tower::Service;
use tower::util::BoxCloneService;

/// 编译后的路由匹配器：每个方法一棵 matchit 树，值为路由在表中的下标
struct RouteMatcher {
    table: Arc<RouteTable>,
    by_method: HashMap<Method, MRouter<usize>>,
}

enum Lookup<'a> {
    Found(&'a Route, RouteParams),
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

impl RouteMatcher {
    fn compile(table: Arc<RouteTable>) -> Result<Self, RouteError> {
        let by_method = table.method_routers()?;
        Ok(Self { table, by_method })
    }

    fn find(&self, method: &Method, path: &str) -> Lookup<'_> {
        if let Some(router) = self.by_method.get(method)
            && let Ok(matched) = router.at(path)
            && let Some(route) = self.table.get(*matched.value)
        {
            return Lookup::Found(route, RouteParams::from(&matched.params));
        }
        let mut allowed: Vec<Method> = self
            .by_method
            .iter()
            .filter(|(m, router)| *m != method && router.at(path).is_ok())
            .map(|(m, _)| m.clone())
            .collect();
        if allowed.is_empty() {
            return Lookup::NotFound;
        }
        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Lookup::MethodNotAllowed(allowed)
    }
}

/// 路由内核
///
/// 作为 Tower Service 处理请求：首次请求时通过 [`LazyRouteFactory`] 生成路由表并编译，
/// 之后对每个请求匹配路由、经 [`DependencyResolver`] 取得处理器并执行。
#[derive(Clone)]
pub struct RouterKernel {
    routes: Arc<LazyRouteFactory>,
    resolver: Arc<dyn DependencyResolver>,
    matcher: Arc<OnceLock<Arc<RouteMatcher>>>,
}

impl RouterKernel {
    pub fn new(routes: Arc<LazyRouteFactory>, resolver: Arc<dyn DependencyResolver>) -> Self {
        Self {
            routes,
            resolver,
            matcher: Arc::new(OnceLock::new()),
        }
    }

    fn matcher(&self) -> AppResult<Arc<RouteMatcher>> {
        if let Some(matcher) = self.matcher.get() {
            return Ok(matcher.clone());
        }
        let table = self.routes.create_routes()?;
        let compiled = Arc::new(RouteMatcher::compile(table)?);
        Ok(self.matcher.get_or_init(|| compiled).clone())
    }

    /// 匹配并执行一个请求，路由缺失或处理器解析失败时返回错误
    pub async fn dispatch(&self, mut req: Req) -> AppResult<Resp> {
        let matcher = self.matcher()?;
        let (route, params) = match matcher.find(req.method(), req.uri().path()) {
            Lookup::Found(route, params) => (route, params),
            Lookup::MethodNotAllowed(allowed) => {
                return Err(AppError::MethodNotAllowed { allowed });
            }
            Lookup::NotFound => {
                return Err(AppError::NotFound(format!(
                    "no route matches `{}`",
                    req.uri().path()
                )));
            }
        };
        let handler = route.action.handler(self.resolver.as_ref())?;
        req.extensions_mut().insert(params);
        req.extensions_mut().insert(MatchedRoute::from(route));
        handler.handle(req).await
    }

    /// 转换为可克隆的 Tower Service
    pub fn into_service(self) -> HttpSvc {
        BoxCloneService::new(self)
    }
}

impl fmt::Debug for RouterKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterKernel")
            .field("routes", &self.routes)
            .field("compiled", &self.matcher.get().is_some())
            .finish()
    }
}

impl Service<Req> for RouterKernel {
    type Response = Resp;
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Resp, AppError>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let kernel = self.clone();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        // 优先从请求头获取 trace_id，没有则生成新的
        let trace_id = extract_or_generate_trace_id(&req);
        let trace_id_clone = trace_id.clone();

        let start = std::time::Instant::now();

        let task_future = async move {
            tracing::debug!(
                method = %method,
                path = %path,
                trace_id = %trace_id,
                "Request started"
            );
            let response = match kernel.dispatch(req).await {
                Ok(response) => response,
                Err(err) => {
                    tracing::debug!(
                        method = %method,
                        path = %path,
                        trace_id = %trace_id,
                        err = %err,
                        "Request failed"
                    );
                    err.into_response()
                }
            };
            tracing::debug!(
                method = %method,
                path = %path,
                trace_id = %trace_id,
                status = %response.status(),
                elapsed_ms = start.elapsed().as_millis(),
                "Request completed"
            );
            Ok(response)
        };
        Box::pin(TRACE_ID.scope(trace_id_clone, task_future))
    }
}

/// 从请求中提取或生成 trace_id
///
/// 按优先级尝试:
/// 1. 从 `x-trace-id` 请求头获取
/// 2. 从 `x-request-id` 请求头获取
/// 3. 生成基于时间戳与计数器的 trace_id
fn extract_or_generate_trace_id(req: &Req) -> String {
    req.headers()
        .get("x-trace-id")
        .or_else(|| req.headers().get("x-request-id"))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(generate_trace_id)
}

/// 格式: `trace-{timestamp_micros}-{sequence}`
fn generate_trace_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    static SEQUENCE: AtomicU64 = AtomicU64::new(0);
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros())
        .unwrap_or_default();
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("trace-{timestamp:x}-{sequence:x}")
}
