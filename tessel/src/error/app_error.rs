use super::error_response::ErrorResponse;
use crate::dependency_container::ResolutionError;
use crate::http::response::into_response::IntoResponse;
use crate::router::RouteError;
use hyper::header::{ALLOW, CONTENT_TYPE, HeaderValue};
use hyper::{Method, Response, StatusCode};
use std::convert::Infallible;
use std::fmt;
use tessel_core::Resp;
use tessel_core::fast_builder::box_full_body;

tokio::task_local! {
    /// 当前请求的 trace_id，由 RouterKernel 在分发时设置
    pub(crate) static TRACE_ID: String;
}

/// 获取当前请求的 trace_id
///
/// 不在请求上下文中调用时返回 `None`
pub fn get_trace_id() -> Option<String> {
    TRACE_ID.try_with(|id| id.clone()).ok()
}

/// 框架统一错误类型
///
/// 所有错误都会被转换为 HTTP 响应，响应体结构见 [`ErrorResponse`]
#[derive(Debug)]
pub enum AppError {
    /// 400 Bad Request，处理器拒绝请求参数时使用
    BadRequest(String),

    /// 404 Not Found
    NotFound(String),

    /// 405 Method Not Allowed，携带该路径允许的方法
    MethodNotAllowed { allowed: Vec<Method> },

    /// 500 Internal Server Error
    InternalServerError(String),

    /// 处理器或其依赖无法从容器中解析
    Resolution(ResolutionError),

    /// 路由表构建或编译失败
    Route(RouteError),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::InternalServerError(_) | Self::Resolution(_) | Self::Route(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 获取错误代码
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            Self::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            Self::Resolution(_) => "DEPENDENCY_RESOLUTION_ERROR",
            Self::Route(_) => "ROUTE_TABLE_ERROR",
        }
    }

    /// 获取错误消息
    pub fn message(&self) -> String {
        match self {
            Self::BadRequest(msg) | Self::NotFound(msg) | Self::InternalServerError(msg) => {
                msg.clone()
            }
            Self::MethodNotAllowed { .. } => "Method not allowed for this route".to_string(),
            Self::Resolution(e) => e.to_string(),
            Self::Route(e) => e.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Resolution(e) => Some(e),
            Self::Route(e) => Some(e),
            _ => None,
        }
    }
}

// ============ From 实现：自动转换常见错误类型 ============

impl From<ResolutionError> for AppError {
    fn from(err: ResolutionError) -> Self {
        Self::Resolution(err)
    }
}

impl From<RouteError> for AppError {
    fn from(err: RouteError) -> Self {
        Self::Route(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<AppError>() {
            Ok(app_error) => return app_error,
            Err(err) => err,
        };
        let err = match err.downcast::<RouteError>() {
            Ok(route_error) => return Self::Route(route_error),
            Err(err) => err,
        };
        match err.downcast::<ResolutionError>() {
            Ok(resolution_error) => Self::Resolution(resolution_error),
            Err(err) => Self::InternalServerError(format!("{err:#}")),
        }
    }
}

impl From<Infallible> for AppError {
    fn from(err: Infallible) -> Self {
        match err {}
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Resp {
        let error_response = ErrorResponse::from_error(&self, get_trace_id());

        if self.status_code().is_server_error() {
            tracing::error!(
                error_code = %error_response.error,
                message = %error_response.message,
                trace_id = ?error_response.trace_id,
                "Internal server error"
            );
        }

        let body = serde_json::to_string(&error_response).unwrap_or_else(|_| {
            r#"{"error":"SERIALIZATION_ERROR","message":"Failed to serialize error response"}"#
                .to_string()
        });

        let mut response = Response::new(box_full_body(body));
        *response.status_mut() = self.status_code();
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !error_response.allowed.is_empty()
            && let Ok(allow) = HeaderValue::from_str(&error_response.allowed.join(", "))
        {
            response.headers_mut().insert(ALLOW, allow);
        }
        response
    }
}
