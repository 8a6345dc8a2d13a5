// [apps/broker/src/identity.rs]
//! Identity resolution for `/execute` and friends. Per spec.md §9 design
//! note (c): this extracts a user id from the bearer token body without
//! any signature verification — flagged, not a bug, since adding
//! verification would be inventing a feature the spec explicitly leaves
//! for production deployments to layer on.

use axum::http::HeaderMap;

pub const ANONYMOUS_USER: &str = "anonymous";

#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
}

pub fn resolve(headers: &HeaderMap) -> Identity {
    if let Some(auth) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            if let Some(user_id) = extract_user_id(token) {
                return Identity { user_id };
            }
        }
    }

    if let Some(user) = headers.get("X-Zakuro-User").and_then(|v| v.to_str().ok()) {
        return Identity {
            user_id: user.to_string(),
        };
    }

    Identity {
        user_id: ANONYMOUS_USER.to_string(),
    }
}

/// `zk_<user_id>_<random>` — the user id is the substring between the
/// `zk_` prefix and the final underscore.
fn extract_user_id(token: &str) -> Option<String> {
    let rest = token.strip_prefix("zk_")?;
    let last_underscore = rest.rfind('_')?;
    if last_underscore == 0 {
        return None;
    }
    Some(rest[..last_underscore].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_user_id_from_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer zk_u1_abc123"),
        );
        assert_eq!(resolve(&headers).user_id, "u1");
    }

    #[test]
    fn falls_back_to_user_header() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Zakuro-User", HeaderValue::from_static("u2"));
        assert_eq!(resolve(&headers).user_id, "u2");
    }

    #[test]
    fn falls_back_to_anonymous() {
        let headers = HeaderMap::new();
        assert_eq!(resolve(&headers).user_id, ANONYMOUS_USER);
    }

    #[test]
    fn user_id_with_underscores_keeps_everything_before_final_segment() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer zk_team_alpha_xyz"),
        );
        assert_eq!(resolve(&headers).user_id, "team_alpha");
    }
}
