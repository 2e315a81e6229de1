use uuid::Uuid;

use crate::errors::{SubscriptionError, UseCaseResult};

const OPERATOR_ROLES: [&str; 2] = ["admin", "service_role"];

/// Caller identity and request metadata, built at the transport edge and passed into every
/// usecase call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub app_id: Option<String>,
    pub developer_id: Option<String>,
    pub user_id: Option<Uuid>,
    pub role: Option<String>,
    pub client_ip: Option<String>,
    pub accept_language: Option<String>,
    pub x_language: Option<String>,
}

impl RequestContext {
    /// Context for scheduled work acting on behalf of a subscriber.
    pub fn system(user_id: Uuid, app_id: impl Into<String>) -> Self {
        Self {
            app_id: Some(app_id.into()),
            user_id: Some(user_id),
            role: Some("service_role".to_string()),
            ..Self::default()
        }
    }

    pub fn operator() -> Self {
        Self {
            role: Some("service_role".to_string()),
            ..Self::default()
        }
    }

    pub fn require_app_id(&self) -> UseCaseResult<&str> {
        non_empty(self.app_id.as_deref())
            .ok_or_else(|| SubscriptionError::invalid_argument("app id is required"))
    }

    pub fn require_developer_id(&self) -> UseCaseResult<&str> {
        non_empty(self.developer_id.as_deref())
            .ok_or_else(|| SubscriptionError::invalid_argument("developer id is required"))
    }

    pub fn require_user_id(&self) -> UseCaseResult<Uuid> {
        self.user_id
            .ok_or_else(|| SubscriptionError::PermissionDenied("authentication required".into()))
    }

    pub fn require_operator(&self) -> UseCaseResult<()> {
        match self.role.as_deref() {
            Some(role) if OPERATOR_ROLES.contains(&role) => Ok(()),
            _ => Err(SubscriptionError::PermissionDenied(
                "operator role required".into(),
            )),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_app_id_is_rejected() {
        let ctx = RequestContext {
            app_id: Some("  ".to_string()),
            ..RequestContext::default()
        };

        assert!(matches!(
            ctx.require_app_id(),
            Err(SubscriptionError::InvalidArgument(_))
        ));
    }

    #[test]
    fn operator_roles() {
        assert!(RequestContext::operator().require_operator().is_ok());

        let user = RequestContext {
            role: Some("authenticated".to_string()),
            ..RequestContext::default()
        };
        assert!(user.require_operator().is_err());
    }
}
