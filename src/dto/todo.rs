use crate::domain;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// DTO for a todo item returned by the API
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct TodoItem {
    #[schema(example = 4)]
    pub id: i32,
    #[schema(example = "buy milk")]
    pub description: String,
    pub completed: bool,
}

impl From<domain::todo::TodoItem> for TodoItem {
    fn from(value: domain::todo::TodoItem) -> Self {
        TodoItem {
            id: value.id,
            description: value.description,
            completed: value.completed,
        }
    }
}

/// Query parameters accepted by the todo list endpoint
#[derive(Deserialize)]
#[cfg_attr(test, derive(Serialize))]
pub struct TodoListQuery {
    pub completed: Option<String>,
    pub q: Option<String>,
}

impl From<&TodoListQuery> for domain::todo::TodoFilter {
    fn from(value: &TodoListQuery) -> Self {
        domain::todo::TodoFilter::from_query(value.completed.as_deref(), value.q.as_deref())
    }
}

/// DTO for creating a new todo item via the API
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct NewTodo {
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "buy milk")]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl From<NewTodo> for domain::todo::NewTodo {
    fn from(value: NewTodo) -> Self {
        domain::todo::NewTodo {
            description: value.description,
            completed: value.completed,
        }
    }
}

/// DTO for partially updating a todo item via the API. Absent fields are left
/// untouched on the stored record
#[derive(Deserialize, Validate, ToSchema)]
#[cfg_attr(test, derive(Serialize))]
pub struct UpdateTodo {
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "buy oat milk")]
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl From<UpdateTodo> for domain::todo::UpdateTodo {
    fn from(value: UpdateTodo) -> Self {
        domain::todo::UpdateTodo {
            description: value.description,
            completed: value.completed,
        }
    }
}

/// Rejects descriptions that are empty or whitespace-only
fn validate_not_blank(description: &str) -> Result<(), ValidationError> {
    if description.trim().is_empty() {
        return Err(ValidationError::new("not_blank"));
    }

    Ok(())
}
