use crate::error::ErrorResponse;
use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::header::ALLOW;
use hyper::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;
use tessel_core::Resp;

/// 已完整读取 body 的响应
#[derive(Debug)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    pub(crate) async fn collect(resp: Resp) -> Self {
        let (parts, body) = resp.into_parts();
        let body = body
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// 读取单个响应头，不存在或不是合法字符串时返回 `None`
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    #[track_caller]
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "Failed to deserialize response\nerror={e:?}\nbody={}",
                self.text()
            )
        })
    }

    /// 按框架的错误响应结构解析 body
    #[track_caller]
    pub fn error(&self) -> ErrorResponse {
        assert!(
            !self.status.is_success(),
            "Expected an error response, got {}: {}",
            self.status,
            self.text()
        );
        self.json()
    }

    #[track_caller]
    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "Unexpected status, body={}",
            self.text()
        );
    }

    #[track_caller]
    pub fn assert_ok(&self) {
        self.assert_status(StatusCode::OK)
    }

    #[track_caller]
    pub fn assert_text(&self, expected: &str) {
        self.assert_ok();
        assert_eq!(self.text(), expected, "Response text does not match");
    }

    #[track_caller]
    pub fn assert_json<T: DeserializeOwned + PartialEq + std::fmt::Debug>(&self, expected: T) {
        assert_eq!(self.json::<T>(), expected, "Response JSON does not match");
    }

    /// 断言状态码与错误代码，并返回解析出的错误响应供进一步检查
    #[track_caller]
    pub fn assert_error(&self, status: StatusCode, code: &str) -> ErrorResponse {
        self.assert_status(status);
        assert_eq!(
            self.header("content-type"),
            Some("application/json"),
            "error responses are rendered as JSON"
        );
        let error = self.error();
        assert_eq!(error.status, status.as_u16());
        assert_eq!(error.error, code, "Unexpected error code: {}", error.message);
        error
    }

    /// 断言 405 响应，`Allow` 头与 body 中的 `allowed` 都等于给定方法
    #[track_caller]
    pub fn assert_allow(&self, methods: &[Method]) {
        let error = self.assert_error(StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED");
        let expected: Vec<&str> = methods.iter().map(Method::as_str).collect();
        assert_eq!(
            self.header(ALLOW.as_str()),
            Some(expected.join(", ").as_str())
        );
        assert_eq!(error.allowed, expected);
    }

    /// 断言错误响应带回了指定的 trace_id
    #[track_caller]
    pub fn assert_trace_id(&self, expected: &str) {
        assert_eq!(self.error().trace_id.as_deref(), Some(expected));
    }
}
