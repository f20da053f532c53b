//! 统一错误处理模块
//!
//! 提供框架级别的错误类型、错误响应格式以及 trace_id 的传递
pub mod app_error;
pub mod error_response;
pub mod result;

pub use app_error::{AppError, get_trace_id};
pub use error_response::ErrorResponse;
pub use result::AppResult;
