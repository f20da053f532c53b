use std::str::FromStr;

use hyper::Method;

/// 可以转换为一组 HTTP 方法的类型
///
/// `&str` 支持逗号分隔的写法，例如 `"GET, POST"`；无法识别的方法名会被跳过。
pub trait IntoMethods {
    fn into_methods(self) -> Vec<Method>;
}

impl IntoMethods for &str {
    fn into_methods(self) -> Vec<Method> {
        self.split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .filter_map(|m| Method::from_str(&m.to_ascii_uppercase()).ok())
            .collect()
    }
}

impl IntoMethods for Vec<Method> {
    fn into_methods(self) -> Vec<Method> {
        self
    }
}

impl IntoMethods for Method {
    fn into_methods(self) -> Vec<Method> {
        vec![self]
    }
}

impl IntoMethods for &[Method] {
    fn into_methods(self) -> Vec<Method> {
        self.to_vec()
    }
}

impl<const N: usize> IntoMethods for [Method; N] {
    fn into_methods(self) -> Vec<Method> {
        self.to_vec()
    }
}
