use utoipa::OpenApi;

pub mod todo;
pub mod user;

/// Collects the OpenAPI schemas of DTOs shared across [api][crate::api] submodules
#[derive(OpenApi)]
#[openapi(components(
    schemas(
        todo::TodoItem,
        todo::NewTodo,
        todo::UpdateTodo,
        user::TodoUser,
        user::NewUser,
        user::LoginRequest,
    ),
    responses(crate::routing_utils::BasicErrorResponse),
))]
pub struct OpenApiSchemas;
