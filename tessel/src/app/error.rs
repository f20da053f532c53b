use std::fmt;

/// 应用构建阶段的错误
#[derive(Debug)]
pub enum BootstrapError {
    /// 为某个组件注册了回调，却没有对应的组件工厂
    MissingComponentFactory { component: String },
    /// 回调的目标类型与组件工厂期望的不一致
    CallbackTypeMismatch {
        component: String,
        expected: &'static str,
        found: &'static str,
    },
    /// 组件工厂执行期间又登记了组件工厂或组件回调
    LateRegistration { component: String },
    /// 没有任何组件登记路由入口
    RouterNotConfigured,
    /// 路由入口解析失败
    Router(anyhow::Error),
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingComponentFactory { component } => write!(
                f,
                "callbacks were registered for component `{component}` but no factory handles it"
            ),
            Self::CallbackTypeMismatch {
                component,
                expected,
                found,
            } => write!(
                f,
                "component `{component}` expects callbacks for `{expected}`, found one for `{found}`"
            ),
            Self::LateRegistration { component } => write!(
                f,
                "component `{component}` was registered while component factories were running"
            ),
            Self::RouterNotConfigured => f.write_str("no router has been registered"),
            Self::Router(e) => write!(f, "failed to resolve router: {e}"),
        }
    }
}

impl std::error::Error for BootstrapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Router(e) => Some(&**e),
            _ => None,
        }
    }
}
