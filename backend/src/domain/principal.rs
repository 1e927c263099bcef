//! Caller identity: roles, usernames, factory membership.
//!
//! A [`Principal`] is the authenticated caller's role/identity/factory
//! triple. It is produced by the inbound auth layer and trusted by the
//! domain services; the invariants below are enforced at construction so
//! downstream code never re-checks them.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Caller role determining query scope and creation rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Staff member attached to exactly one factory.
    FactoryEmployee,
    /// Headquarters staff with cross-factory visibility.
    Headquarters,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FactoryEmployee => f.write_str("factory_employee"),
            Self::Headquarters => f.write_str("headquarters"),
        }
    }
}

impl FromStr for Role {
    type Err = PrincipalValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "factory_employee" => Ok(Self::FactoryEmployee),
            "headquarters" => Ok(Self::Headquarters),
            _ => Err(PrincipalValidationError::UnknownRole),
        }
    }
}

/// Validation errors for principals and their component values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrincipalValidationError {
    EmptyUsername,
    UsernameInvalidCharacters,
    UsernameTooLong { max: usize },
    EmptyFactoryId,
    FactoryIdInvalidCharacters,
    FactoryIdTooLong { max: usize },
    UnknownRole,
    EmployeeWithoutFactory,
    HeadquartersWithFactory,
}

impl fmt::Display for PrincipalValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, numbers, dots, hyphens, or underscores",
            ),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::EmptyFactoryId => write!(f, "factory id must not be empty"),
            Self::FactoryIdInvalidCharacters => write!(
                f,
                "factory id may only contain lowercase letters, numbers, or underscores",
            ),
            Self::FactoryIdTooLong { max } => {
                write!(f, "factory id must be at most {max} characters")
            }
            Self::UnknownRole => {
                write!(f, "role must be factory_employee or headquarters")
            }
            Self::EmployeeWithoutFactory => {
                write!(f, "factory employees must belong to a factory")
            }
            Self::HeadquartersWithFactory => {
                write!(f, "headquarters principals must not carry a factory id")
            }
        }
    }
}

impl std::error::Error for PrincipalValidationError {}

const USERNAME_MAX: usize = 64;

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._-]+$")
            .unwrap_or_else(|err| panic!("username pattern must compile: {err}"))
    })
}

/// Stable account identity used for creator attribution on records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    ///
    /// # Examples
    /// ```
    /// use backend::domain::Username;
    ///
    /// let name = Username::new("alice").expect("valid username");
    /// assert_eq!(name.as_str(), "alice");
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, PrincipalValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(PrincipalValidationError::EmptyUsername);
        }
        if raw.len() > USERNAME_MAX {
            return Err(PrincipalValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if !username_pattern().is_match(&raw) {
            return Err(PrincipalValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(raw))
    }

    /// Borrow the underlying name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for Username {
    type Error = PrincipalValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

const FACTORY_ID_MAX: usize = 64;

fn factory_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9_]+$")
            .unwrap_or_else(|err| panic!("factory id pattern must compile: {err}"))
    })
}

/// Slug identifying a factory in the catalog (e.g. `wakene_food`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct FactoryId(String);

impl FactoryId {
    /// Validate and construct a [`FactoryId`].
    pub fn new(raw: impl Into<String>) -> Result<Self, PrincipalValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(PrincipalValidationError::EmptyFactoryId);
        }
        if raw.len() > FACTORY_ID_MAX {
            return Err(PrincipalValidationError::FactoryIdTooLong {
                max: FACTORY_ID_MAX,
            });
        }
        if !factory_id_pattern().is_match(&raw) {
            return Err(PrincipalValidationError::FactoryIdInvalidCharacters);
        }
        Ok(Self(raw))
    }

    /// Borrow the underlying slug.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FactoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for FactoryId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for FactoryId {
    type Error = PrincipalValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FactoryId> for String {
    fn from(value: FactoryId) -> Self {
        value.0
    }
}

/// The authenticated caller consumed by domain services.
///
/// ## Invariants
/// - A `FactoryEmployee` always carries a factory id.
/// - A `Headquarters` principal never does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    username: Username,
    role: Role,
    factory_id: Option<FactoryId>,
}

impl Principal {
    /// Construct a principal, enforcing the role/factory pairing invariant.
    pub fn try_new(
        username: Username,
        role: Role,
        factory_id: Option<FactoryId>,
    ) -> Result<Self, PrincipalValidationError> {
        match (role, &factory_id) {
            (Role::FactoryEmployee, None) => {
                return Err(PrincipalValidationError::EmployeeWithoutFactory);
            }
            (Role::Headquarters, Some(_)) => {
                return Err(PrincipalValidationError::HeadquartersWithFactory);
            }
            _ => {}
        }
        Ok(Self {
            username,
            role,
            factory_id,
        })
    }

    /// Creator attribution identity.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Caller role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The employee's factory; `None` for headquarters.
    pub fn factory_id(&self) -> Option<&FactoryId> {
        self.factory_id.as_ref()
    }

    /// Whether this caller has cross-factory visibility.
    pub fn is_headquarters(&self) -> bool {
        self.role == Role::Headquarters
    }
}
