use bytes::Bytes;
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::{HeaderMap, Response, StatusCode};
use serde::Serialize;
use tessel_core::Resp;
use tessel_core::fast_builder::{box_empty_body, box_full_body};

/// 将一个类型转换为 HTTP 响应的通用能力
///
/// 处理器返回值只要实现了该 trait，就可以被框架转换为响应。
/// 框架已为 String、&str、Json<T>、Result、()、(StatusCode, T) 等常见类型提供实现。
pub trait IntoResponse {
    fn into_response(self) -> Resp;
}

fn with_content_type(body: Bytes, content_type: &'static str) -> Resp {
    let mut response = Response::new(box_full_body(body));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

impl IntoResponse for String {
    fn into_response(self) -> Resp {
        with_content_type(Bytes::from(self), "text/plain; charset=utf-8")
    }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Resp {
        with_content_type(Bytes::from_static(self.as_bytes()), "text/plain; charset=utf-8")
    }
}

/// JSON 响应包装器
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Resp {
        match serde_json::to_vec(&self.0) {
            Ok(body) => with_content_type(Bytes::from(body), "application/json"),
            Err(e) => crate::AppError::InternalServerError(format!(
                "failed to serialize response body: {e}"
            ))
            .into_response(),
        }
    }
}

impl IntoResponse for Resp {
    fn into_response(self) -> Resp {
        self
    }
}

impl<T, E> IntoResponse for Result<T, E>
where
    T: IntoResponse,
    E: IntoResponse,
{
    fn into_response(self) -> Resp {
        match self {
            Ok(t) => t.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

impl IntoResponse for () {
    fn into_response(self) -> Resp {
        Response::new(box_empty_body())
    }
}

impl IntoResponse for StatusCode {
    fn into_response(self) -> Resp {
        let mut response = Response::new(box_empty_body());
        *response.status_mut() = self;
        response
    }
}

impl<T> IntoResponse for (StatusCode, T)
where
    T: IntoResponse,
{
    fn into_response(self) -> Resp {
        let mut response = self.1.into_response();
        *response.status_mut() = self.0;
        response
    }
}

impl<T> IntoResponse for (HeaderMap, T)
where
    T: IntoResponse,
{
    fn into_response(self) -> Resp {
        let mut response = self.1.into_response();
        response.headers_mut().extend(self.0);
        response
    }
}
