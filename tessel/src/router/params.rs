use super::route::Route;
use tessel_core::decode_segment;
use std::collections::HashMap;

/// 路径参数，由 RouterKernel 写入请求扩展，值已做百分号解码
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteParams {
    params: HashMap<String, String>,
}

impl RouteParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl From<&matchit::Params<'_, '_>> for RouteParams {
    fn from(params: &matchit::Params<'_, '_>) -> Self {
        Self {
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), decode_segment(v)))
                .collect(),
        }
    }
}

/// 当前请求命中的路由信息
#[derive(Clone, Debug)]
pub struct MatchedRoute {
    pub path: String,
    pub name: Option<String>,
    pub attributes: HashMap<String, String>,
}

impl From<&Route> for MatchedRoute {
    fn from(route: &Route) -> Self {
        Self {
            path: route.path.clone(),
            name: route.name.clone(),
            attributes: route.attributes.clone(),
        }
    }
}
