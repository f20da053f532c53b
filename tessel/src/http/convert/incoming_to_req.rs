use crate::router::HttpSvc;
use http_body_util::BodyExt;
use hyper::Request;
use hyper::body::Incoming;
use std::convert::Infallible;
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tessel_core::{Req, Resp, TesselError};
use tower::{Service, ServiceExt};

use crate::IntoResponse;

/// 将 hyper 的 `Request<Incoming>` 转换为框架内部的 `Req`
///
/// 内部 Service 返回的错误在这里被渲染为错误响应，hyper 只会看到 `Infallible`
#[derive(Clone)]
pub struct IncomingToInternal {
    pub inner: HttpSvc,
}

impl Service<Request<Incoming>> for IncomingToInternal {
    type Response = Resp;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Resp, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req_incoming: Request<Incoming>) -> Self::Future {
        let inner = self.inner.clone();
        Box::pin(async move {
            let req: Req = req_incoming.map(|inc| inc.map_err(TesselError::from).boxed());
            Ok(inner
                .oneshot(req)
                .await
                .unwrap_or_else(IntoResponse::into_response))
        })
    }
}
