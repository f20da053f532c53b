pub mod convert;
pub mod response;

pub use tessel_core::{Req, ReqBody, Resp, RespBody};
