use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::{Request, Response};
use std::fmt;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 框架内部统一的 body 错误类型
pub struct TesselError(pub BoxError);

impl fmt::Debug for TesselError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for TesselError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for TesselError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<BoxError> for TesselError {
    fn from(err: BoxError) -> Self {
        TesselError(err)
    }
}

impl From<std::convert::Infallible> for TesselError {
    fn from(err: std::convert::Infallible) -> Self {
        match err {}
    }
}

impl From<hyper::Error> for TesselError {
    fn from(err: hyper::Error) -> Self {
        TesselError(Box::new(err))
    }
}


pub type RespBody = BoxBody<Bytes, TesselError>;
pub type ReqBody = BoxBody<Bytes, TesselError>;
pub type Resp = Response<RespBody>;
pub type Req = Request<ReqBody>;
