use anyhow::Error;
use config::Config;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// 组装配置来源
///
/// 优先级从低到高：内置默认值、`./tessel.*`、`./tessel.{env}.*`、`TESSEL__` 前缀的环境变量。
/// `env` 取自 `TESSEL_ENV`，未设置时 debug 构建为 `dev`，release 构建为 `prod`。
pub fn load_config_sources() -> Result<Config, Error> {
    let env = env::var("TESSEL_ENV").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "dev".to_string()
        } else {
            "prod".to_string()
        }
    });
    Ok(Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8080)?
        .set_default("shutdown_timeout_secs", 30)?
        .add_source(config::File::with_name("./tessel").required(false))
        .add_source(config::File::with_name(&format!("./tessel.{}", env)).required(false))
        .add_source(
            config::Environment::with_prefix("TESSEL")
                .separator("__")
                .try_parsing(true),
        )
        .build()?)
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// 应用配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ApplicationConfig {
    #[serde(default)]
    pub server: ServerSettings,
    /// 优雅关闭时等待存量连接的秒数
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_shutdown_timeout_secs() -> u64 {
    30
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl ApplicationConfig {
    /// 从配置文件与环境变量加载
    pub fn load() -> Result<Self, Error> {
        Ok(load_config_sources()?.try_deserialize()?)
    }

    /// 加载失败时回退到默认配置
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Using default application settings.");
            Self::default()
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
