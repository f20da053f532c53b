//! 路由
//!
//! - [`RouteBuilderRegistry`]：配置回调向其中注册路由，最终构建为 [`RouteTable`]
//! - [`LazyRouteFactory`]：保存延迟执行的路由表生产者
//! - [`RouterKernel`]：首次收到请求时生成并编译路由表，然后匹配分发
pub mod builder;
pub mod error;
pub mod kernel;
pub mod lazy;
pub mod params;
pub mod route;

pub use builder::{RouteBuilder, RouteBuilderRegistry};
pub use error::RouteError;
pub use kernel::RouterKernel;
pub use lazy::LazyRouteFactory;
pub use params::{MatchedRoute, RouteParams};
pub use route::{Route, RouteAction, RouteTable};

use crate::AppError;
use tessel_core::{Req, Resp};
use tower::util::BoxCloneService;

/// Tower 兼容的 Service 类型别名
pub type HttpSvc<T = Req> = BoxCloneService<T, Resp, AppError>;
