use application::context::RequestContext;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::auth::{AuthError, AuthUser, bearer_token};

/// Caller metadata with an optional bearer token. A token that is present but invalid is still
/// rejected.
pub struct Caller(pub RequestContext);

/// Caller metadata for routes that require a bearer token.
pub struct AuthenticatedCaller(pub RequestContext);

fn header(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn client_ip(parts: &Parts) -> Option<String> {
    header(parts, "x-forwarded-for")
        .and_then(|forwarded| {
            forwarded
                .split(',')
                .next()
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
                .map(str::to_string)
        })
        .or_else(|| header(parts, "x-real-ip"))
}

pub fn build_context(parts: &Parts, auth: Option<AuthUser>) -> RequestContext {
    let (user_id, role) = match auth {
        Some(user) => (Some(user.user_id), user.role),
        None => (None, None),
    };

    RequestContext {
        app_id: header(parts, "x-app-id"),
        developer_id: header(parts, "x-developer-id"),
        user_id,
        role,
        client_ip: client_ip(parts),
        accept_language: header(parts, "accept-language"),
        x_language: header(parts, "x-language"),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let has_token = bearer_token(parts)?.is_some();
        let auth = if has_token {
            Some(AuthUser::from_request_parts(parts, state).await?)
        } else {
            None
        };

        Ok(Caller(build_context(parts, auth)))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedCaller
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;

        Ok(AuthenticatedCaller(build_context(parts, Some(auth))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use uuid::Uuid;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/plans");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn headers_fill_the_context() {
        let parts = parts(&[
            ("X-App-Id", "app-1"),
            ("X-Developer-Id", "dev-1"),
            ("X-Forwarded-For", "203.0.113.7, 10.0.0.1"),
            ("Accept-Language", "zh-CN,zh;q=0.9"),
        ]);
        let user_id = Uuid::new_v4();

        let ctx = build_context(
            &parts,
            Some(AuthUser {
                user_id,
                role: Some("authenticated".to_string()),
            }),
        );

        assert_eq!(ctx.app_id.as_deref(), Some("app-1"));
        assert_eq!(ctx.developer_id.as_deref(), Some("dev-1"));
        assert_eq!(ctx.client_ip.as_deref(), Some("203.0.113.7"));
        assert_eq!(ctx.user_id, Some(user_id));
        assert_eq!(ctx.x_language, None);
    }

    #[test]
    fn real_ip_is_used_without_forwarded_for() {
        let parts = parts(&[("X-Real-IP", "198.51.100.4")]);

        assert_eq!(client_ip(&parts).as_deref(), Some("198.51.100.4"));
    }

    #[tokio::test]
    async fn anonymous_caller_has_no_user() {
        let mut parts = parts(&[("X-App-Id", "app-1")]);

        let Caller(ctx) = Caller::from_request_parts(&mut parts, &()).await.unwrap();

        assert_eq!(ctx.user_id, None);
        assert_eq!(ctx.app_id.as_deref(), Some("app-1"));
    }
}
