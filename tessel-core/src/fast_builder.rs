use crate::shared::RespBody;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};

/// 创建一个空的响应 body
pub fn box_empty_body() -> RespBody {
    Full::new(Bytes::new()).map_err(|e| match e {}).boxed()
}

/// 用给定字节创建响应 body
pub fn box_full_body(bytes: impl Into<Bytes>) -> RespBody {
    Full::new(bytes.into()).map_err(|e| match e {}).boxed()
}
