use super::AppError;

/// 框架标准 Result 类型
///
/// 请求处理器返回该类型，错误会被转换为统一的 JSON 错误响应
///
/// # 示例
///
/// ```no_run
/// use tessel::error::{AppError, AppResult};
///
/// fn find_user(id: u64) -> AppResult<String> {
///     if id == 0 {
///         return Err(AppError::NotFound(format!("user {id} does not exist")));
///     }
///     Ok(format!("user-{id}"))
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;
