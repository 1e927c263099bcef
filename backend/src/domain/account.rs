//! Stored user accounts.

use chrono::{DateTime, Utc};

use super::{FactoryId, Principal, PrincipalValidationError, Role, Username};

/// A persisted account, as held by the user repository.
///
/// The role/factory pairing invariant is the same one [`Principal`]
/// enforces; construct accounts through [`Account::try_new`] so a stored
/// account can always be turned into a principal without failing.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: uuid::Uuid,
    pub username: Username,
    pub email: String,
    /// bcrypt hash; never the plaintext password.
    pub password_hash: String,
    pub role: Role,
    pub factory_id: Option<FactoryId>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Construct an account, enforcing the role/factory pairing.
    pub fn try_new(
        username: Username,
        email: String,
        password_hash: String,
        role: Role,
        factory_id: Option<FactoryId>,
    ) -> Result<Self, PrincipalValidationError> {
        // Reuse the principal constructor as the single source of truth
        // for the pairing invariant.
        Principal::try_new(username.clone(), role, factory_id.clone())?;
        Ok(Self {
            id: uuid::Uuid::new_v4(),
            username,
            email,
            password_hash,
            role,
            factory_id,
            created_at: Utc::now(),
        })
    }

    /// The trusted caller identity for this account.
    pub fn principal(&self) -> Principal {
        Principal::try_new(self.username.clone(), self.role, self.factory_id.clone())
            .unwrap_or_else(|err| panic!("stored account must satisfy the pairing invariant: {err}"))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn account_converts_to_principal() {
        let account = Account::try_new(
            Username::new("alice").expect("valid username"),
            "alice@example.com".into(),
            "$2b$12$hash".into(),
            Role::FactoryEmployee,
            Some(FactoryId::new("wakene_food").expect("valid factory")),
        )
        .expect("valid account");

        let principal = account.principal();
        assert_eq!(principal.username().as_str(), "alice");
        assert_eq!(principal.role(), Role::FactoryEmployee);
    }

    #[test]
    fn account_rejects_employee_without_factory() {
        let result = Account::try_new(
            Username::new("bob").expect("valid username"),
            "bob@example.com".into(),
            "$2b$12$hash".into(),
            Role::FactoryEmployee,
            None,
        );
        assert_eq!(result, Err(PrincipalValidationError::EmployeeWithoutFactory));
    }
}
