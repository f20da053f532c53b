pub mod app;
#[cfg(feature = "auto")]
pub mod auto;
pub mod commands;
pub mod component;
pub mod config;
pub mod dependency_container;
pub mod error;
pub mod handler;
pub mod http;
pub mod router;
#[cfg(feature = "test")]
pub mod test;

pub use anyhow;
pub use http_body_util;
pub use hyper;
#[cfg(feature = "auto")]
pub use inventory;
pub use tessel_core;
// repub
pub use tokio;
pub use tower;
pub use tracing;

pub use app::{Application, ApplicationBuilder, BootstrapError, Module};
pub use commands::{Command, CommandHandler, CommandRegistry, SharedCommandRegistry};
pub use component::{ComponentBuilder, ComponentCallbacks, ConfigCallback};
pub use dependency_container::{Container, DependencyLifetime, DependencyResolver, ResolutionError};
pub use handler::{RequestHandler, handler_fn};
pub use http::response::into_response::{IntoResponse, Json};
pub use router::{LazyRouteFactory, RouteBuilderRegistry, RouteTable, RouterKernel};

// 导出错误处理类型
pub use error::{AppError, AppResult, ErrorResponse};
