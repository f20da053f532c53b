use hyper::Method;
use std::fmt;

/// 路由表构建或编译期间的错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// 路由没有绑定处理器
    MissingAction { path: String },
    /// 路由没有任何可用的 HTTP 方法
    NoMethods { path: String },
    /// 路径模板不合法
    InvalidPath { path: String, reason: String },
    /// 路由名称重复
    DuplicateName { name: String },
    /// 同一方法下两条路由的模板冲突
    Conflict {
        method: Method,
        path: String,
        reason: String,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAction { path } => write!(f, "route `{path}` has no handler"),
            Self::NoMethods { path } => write!(f, "route `{path}` has no HTTP methods"),
            Self::InvalidPath { path, reason } => write!(f, "invalid route `{path}`: {reason}"),
            Self::DuplicateName { name } => write!(f, "route name `{name}` is used more than once"),
            Self::Conflict {
                method,
                path,
                reason,
            } => write!(f, "route `{method} {path}` conflicts: {reason}"),
        }
    }
}

impl std::error::Error for RouteError {}
