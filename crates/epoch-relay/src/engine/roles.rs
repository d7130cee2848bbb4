use crate::{RelayError, RelayResult, Role};
use std::collections::HashSet;

/// The caller's resolved capabilities, handed to every engine operation. The engine only asks
/// whether a role is present; who holds which role is decided by the access-control layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallContext {
    roles: HashSet<Role>,
}

impl CallContext {
    pub fn new<I: IntoIterator<Item = Role>>(roles: I) -> Self {
        CallContext {
            roles: roles.into_iter().collect(),
        }
    }

    /// A caller without any role. Enough for relaying messages.
    pub fn anyone() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role);
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn require(&self, role: Role) -> RelayResult<()> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(RelayError::MissingRole(role))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_checks() {
        let ctx = CallContext::new(vec![Role::Operator]).with_role(Role::Validator);
        assert!(ctx.require(Role::Operator).is_ok());
        assert!(ctx.require(Role::Validator).is_ok());
        assert_eq!(
            ctx.require(Role::Admin),
            Err(RelayError::MissingRole(Role::Admin))
        );
        assert!(!CallContext::anyone().has_role(Role::Gatekeeper));
    }
}
