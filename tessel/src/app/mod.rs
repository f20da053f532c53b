use crate::commands::SharedCommandRegistry;
use crate::config::ApplicationConfig;
use crate::dependency_container::{Container, ResolutionError};
use crate::http::convert::incoming_to_req::IncomingToInternal;
use crate::router::HttpSvc;
use hyper::Error as HyperError;
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto::Builder as AutoBuilder,
    service::TowerToHyperService,
};
use std::sync::{Arc, OnceLock};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

pub mod builder;
pub mod error;

pub use builder::{ApplicationBuilder, ComponentFactory, Module, RouterResolver};
pub use error::BootstrapError;

/// 构建完成的应用，持有配置、容器与请求入口
pub struct Application {
    config: ApplicationConfig,
    container: Container,
    router: Option<RouterResolver>,
    svc: OnceLock<HttpSvc>,
}

impl Application {
    pub(crate) fn new(
        config: ApplicationConfig,
        container: Container,
        router: Option<RouterResolver>,
    ) -> Self {
        Self {
            config,
            container,
            router,
            svc: OnceLock::new(),
        }
    }

    /// 创建应用构建器
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// 取得请求入口，第一次调用时从容器解析并缓存
    pub fn router(&self) -> Result<HttpSvc, BootstrapError> {
        if let Some(svc) = self.svc.get() {
            return Ok(svc.clone());
        }
        let resolver = self
            .router
            .as_ref()
            .ok_or(BootstrapError::RouterNotConfigured)?;
        let svc = resolver(&self.container).map_err(BootstrapError::Router)?;
        Ok(self.svc.get_or_init(|| svc).clone())
    }

    /// 共享的命令注册表
    pub fn commands(&self) -> Result<Arc<SharedCommandRegistry>, ResolutionError> {
        self.container.resolve::<SharedCommandRegistry>()
    }

    /// 运行应用，基于配置中的地址与端口监听并处理请求
    ///
    /// 收到 Ctrl+C 或 SIGTERM 后停止接收新连接，并在超时时间内等待存量连接结束。
    pub async fn run(self) -> anyhow::Result<()> {
        let service_handle = self.router()?;
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr).await?;
        let executor = TokioExecutor::new();
        // 创建任务跟踪器以管理连接生命周期
        let tracker = TaskTracker::new();
        let shutdown_token = CancellationToken::new();

        tracing::info!("listening on {}", addr);

        loop {
            tokio::select! {
                _ = shutdown_signal() => {
                    tracing::info!("shutdown signal received, terminating...");
                    shutdown_token.cancel();
                    break;
                }
                r = listener.accept() => {
                    let (stream, _) = match r {
                        Ok(pair) => pair,
                        Err(err) => {
                            tracing::error!("failed to accept connection: {}", err);
                            continue;
                        }
                    };
                    let io = TokioIo::new(stream);

                    let service_with_conversion = IncomingToInternal {
                        inner: service_handle.clone(),
                    };
                    let hyper_service = TowerToHyperService::new(service_with_conversion);

                    let executor = executor.clone();
                    let shutdown_token = shutdown_token.clone();
                    tracker.spawn(async move {
                        let builder = AutoBuilder::new(executor);
                        let conn = builder.serve_connection_with_upgrades(io, hyper_service);
                        tokio::pin!(conn);
                        let res = tokio::select! {
                            r = conn.as_mut() => r,
                            _ = shutdown_token.cancelled() => {
                                conn.as_mut().graceful_shutdown();
                                conn.await
                            }
                        };
                        if let Err(err) = res {
                            if let Some(hyper_err) = err.downcast_ref::<HyperError>()
                                && hyper_err.is_incomplete_message() {
                                return;
                            }
                            tracing::warn!(error = ?err, "failed to serve connection");
                        }
                    });
                }
            }
        }
        // shutdown
        tracker.close();
        tracing::info!(
            "waiting for existing {} connections to close...",
            tracker.len()
        );
        let timeout = self.config.shutdown_timeout();
        match tokio::time::timeout(timeout, tracker.wait()).await {
            Ok(_) => {
                tracing::info!("all connections closed, shutdown complete.");
            }
            Err(_) => {
                tracing::warn!(
                    "timeout ({:?}) reached, forcing shutdown with {} active connections.",
                    timeout,
                    tracker.len()
                );
            }
        }
        Ok(())
    }
}

#[cfg(feature = "test")]
impl Application {
    /// 创建进程内测试客户端
    pub fn test_client(&self) -> Result<crate::test::TestClient, BootstrapError> {
        crate::test::TestClient::new(self)
    }
}

/// 监听终止信号
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
