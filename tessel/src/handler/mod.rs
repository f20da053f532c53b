//! 请求处理器
//!
//! 路由最终分发到实现了 [`RequestHandler`] 的对象上。处理器既可以预先构造好挂到路由上，
//! 也可以在每次分发时由 [`DependencyResolver`](crate::dependency_container::DependencyResolver)
//! 从容器中解析。
use crate::error::AppResult;
use crate::http::response::into_response::IntoResponse;
pub use futures::future::BoxFuture;
use std::future::Future;
use tessel_core::{Req, Resp};

/// 处理单个 HTTP 请求
///
/// 路由参数与匹配到的路由信息通过请求扩展传入，
/// 参见 [`RouteParams`](crate::router::RouteParams) 与 [`MatchedRoute`](crate::router::MatchedRoute)。
pub trait RequestHandler: Send + Sync + 'static {
    fn handle(&self, req: Req) -> BoxFuture<'static, AppResult<Resp>>;
}

/// 将异步闭包包装为 [`RequestHandler`]
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

/// 使用异步函数作为请求处理器
///
/// # Example
///
/// ```rust,ignore
/// use tessel::handler::handler_fn;
///
/// registry.get("/ping").to_handler(handler_fn(|_req| async { "pong" }));
/// ```
pub fn handler_fn<F, Fut, R>(f: F) -> HandlerFn<F>
where
    F: Fn(Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    HandlerFn { f }
}

impl<F, Fut, R> RequestHandler for HandlerFn<F>
where
    F: Fn(Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn handle(&self, req: Req) -> BoxFuture<'static, AppResult<Resp>> {
        let fut = (self.f)(req);
        Box::pin(async move { Ok(fut.await.into_response()) })
    }
}
