use super::AppError;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// 错误响应体
///
/// [`AppError`] 渲染为 HTTP 响应时输出的 JSON 结构，客户端与测试都按它解析。
/// 只有对应的错误才会带上 `allowed` 与 `binding` 字段。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,

    /// 错误代码，如 `NOT_FOUND`、`DEPENDENCY_RESOLUTION_ERROR`
    pub error: String,

    pub message: String,

    /// 405 时该路径允许的方法，与 `Allow` 头一致
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,

    /// 解析失败的绑定类型名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,

    /// Unix 时间戳（秒）
    pub timestamp: u64,
}

impl ErrorResponse {
    pub fn from_error(err: &AppError, trace_id: Option<String>) -> Self {
        let allowed = match err {
            AppError::MethodNotAllowed { allowed } => {
                allowed.iter().map(|m| m.as_str().to_string()).collect()
            }
            _ => Vec::new(),
        };
        let binding = match err {
            AppError::Resolution(e) => Some(e.type_name().to_string()),
            _ => None,
        };
        Self {
            status: err.status_code().as_u16(),
            error: err.error_code().to_string(),
            message: err.message(),
            allowed,
            binding,
            trace_id,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
        }
    }
}
