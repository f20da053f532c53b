use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

const SAFE_CHARS: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b':')
    .remove(b'*')
    .remove(b'{')
    .remove(b'}');

/// 对路由模板做百分号编码，保留路径分隔符与 `{param}` 占位符
pub fn encode_route(path: &str) -> String {
    utf8_percent_encode(path, SAFE_CHARS).to_string()
}

/// 解码单个路径参数，非法 UTF-8 以替换字符代替
pub fn decode_segment(segment: &str) -> String {
    percent_encoding::percent_decode_str(segment)
        .decode_utf8_lossy()
        .into_owned()
}

/// 拼接路由前缀与路径，保证两者之间恰好有一个 `/`
pub fn join_route(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if path.is_empty() || path == "/" {
        return if prefix.is_empty() {
            "/".to_string()
        } else {
            prefix.to_string()
        };
    }
    if path.starts_with('/') {
        format!("{prefix}{path}")
    } else {
        format!("{prefix}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_survive_encoding() {
        assert_eq!(encode_route("/users/{id}"), "/users/{id}");
        assert_eq!(encode_route("/files/{*rest}"), "/files/{*rest}");
        assert_eq!(encode_route("/a b"), "/a%20b");
    }

    #[test]
    fn segments_are_percent_decoded() {
        assert_eq!(decode_segment("hello%20world"), "hello world");
        assert_eq!(decode_segment("caf%C3%A9"), "café");
        assert_eq!(decode_segment("plain"), "plain");
    }

    #[test]
    fn join_route_normalizes_slashes() {
        assert_eq!(join_route("/api/", "/users"), "/api/users");
        assert_eq!(join_route("/api", "users"), "/api/users");
        assert_eq!(join_route("/api", "/"), "/api");
        assert_eq!(join_route("", ""), "/");
    }
}
