use crate::domain;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// DTO for the public view of a user. This is an explicit allow-listed
/// projection; password fields have no representation here at all
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct TodoUser {
    #[schema(example = 4)]
    pub id: i32,
    #[schema(example = "todo.fan@example.com")]
    pub email: String,
}

impl From<domain::user::TodoUser> for TodoUser {
    fn from(value: domain::user::TodoUser) -> Self {
        TodoUser {
            id: value.id,
            email: value.email,
        }
    }
}

/// DTO for registering a new user via the API. Display intentionally only
/// prints the email so the password can't end up in a log line
#[derive(Deserialize, Display, Validate, ToSchema)]
#[display("{email}")]
#[cfg_attr(test, derive(Serialize))]
pub struct NewUser {
    #[validate(email)]
    #[schema(example = "todo.fan@example.com")]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

impl From<NewUser> for domain::user::CreateUser {
    fn from(value: NewUser) -> Self {
        domain::user::CreateUser {
            email: value.email,
            password: value.password,
        }
    }
}

/// DTO for a login attempt. Deliberately unvalidated beyond shape: credentials
/// either match a stored user or they don't
#[derive(Deserialize, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct LoginRequest {
    #[schema(example = "todo.fan@example.com")]
    pub email: String,
    pub password: String,
}
