use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::{delete, get, post, put};
use log::{error, info};
use std::sync::Arc;
use utoipa::OpenApi;
use validator::Validate;

use crate::domain::todo::driving_ports::{TodoError, TodoPort};
use crate::domain::todo::TodoFilter;
use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{
    GenericErrorResponse, Json, NotFoundErrorResponse, ValidationErrorResponse,
};
use crate::{AppState, SharedData, domain, dto, persistence};

#[derive(OpenApi)]
#[openapi(paths(list_todos, get_todo_by_id, create_todo, update_todo, delete_todo))]
pub struct TodosApi;

/// ID that no stored todo can have. Non-numeric route parameters degrade to
/// this value so they fall out of lookups as "not found" instead of a 400
const NONEXISTENT_TODO_ID: i32 = -1;

/// Leniently parses a route parameter into a todo ID
fn parse_todo_id(raw_id: &str) -> i32 {
    raw_id.trim().parse().unwrap_or(NONEXISTENT_TODO_ID)
}

/// Adds routes under "/todos" to the application router
pub fn todo_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/todos",
            get(
                |State(app_state): AppState, Query(list_params): Query<dto::todo::TodoListQuery>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};

                    list_todos(&list_params, &mut ext_cxn, &todo_service).await
                },
            ),
        )
        .route(
            "/todos/:todo_id",
            get(|State(app_state): AppState, Path(todo_id): Path<String>| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let todo_service = domain::todo::TodoService {};

                get_todo_by_id(parse_todo_id(&todo_id), &mut ext_cxn, &todo_service).await
            }),
        )
        .route(
            "/todos",
            post(
                |State(app_state): AppState, Json(new_todo): Json<dto::todo::NewTodo>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};

                    create_todo(new_todo, &mut ext_cxn, &todo_service).await
                },
            ),
        )
        .route(
            "/todos/:todo_id",
            put(
                |State(app_state): AppState,
                 Path(todo_id): Path<String>,
                 Json(update): Json<dto::todo::UpdateTodo>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let todo_service = domain::todo::TodoService {};

                    update_todo(parse_todo_id(&todo_id), update, &mut ext_cxn, &todo_service).await
                },
            ),
        )
        .route(
            "/todos/:todo_id",
            delete(|State(app_state): AppState, Path(todo_id): Path<String>| async move {
                let mut ext_cxn = app_state.ext_cxn.clone();
                let todo_service = domain::todo::TodoService {};

                delete_todo(parse_todo_id(&todo_id), &mut ext_cxn, &todo_service).await
            }),
        )
}

/// Lists todo items, optionally narrowed by the `completed` and `q` query parameters
#[utoipa::path(
    get,
    path = "/todos",
    tag = "todos",
    params(
        ("completed" = Option<String>, Query, description = "Only return items whose completed flag matches; values other than \"true\" or \"false\" are ignored"),
        ("q" = Option<String>, Query, description = "Only return items whose description contains this text, case-insensitively"),
    ),
    responses(
        (status = 200, description = "The matching todo items", body = [dto::todo::TodoItem]),
        (status = 500, description = "The data store was unreachable"),
    ),
)]
async fn list_todos(
    list_params: &dto::todo::TodoListQuery,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Result<Json<Vec<dto::todo::TodoItem>>, ErrorResponse> {
    info!("Listing todos");
    let filter = TodoFilter::from(list_params);
    let todo_read = persistence::db_todo_driven_ports::DbTodoReader {};

    let list_result = todo_service.list(&filter, &mut *ext_cxn, &todo_read).await;
    match list_result {
        Ok(todos) => Ok(Json(todos.into_iter().map(dto::todo::TodoItem::from).collect())),
        Err(list_err) => {
            error!("Todo list failure: {list_err}");
            Err(GenericErrorResponse(list_err).into())
        }
    }
}

/// Fetches a single todo item by its ID
#[utoipa::path(
    get,
    path = "/todos/{todo_id}",
    tag = "todos",
    params(
        ("todo_id" = String, Path, description = "ID of the todo item to fetch"),
    ),
    responses(
        (status = 200, description = "The requested todo item", body = dto::todo::TodoItem),
        (status = 404, description = "No todo item has that ID"),
        (status = 500, description = "The data store was unreachable"),
    ),
)]
async fn get_todo_by_id(
    todo_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Result<Json<dto::todo::TodoItem>, ErrorResponse> {
    info!("Fetching todo {todo_id}");
    let todo_read = persistence::db_todo_driven_ports::DbTodoReader {};

    let fetch_result = todo_service
        .get_by_id(todo_id, &mut *ext_cxn, &todo_read)
        .await;
    match fetch_result {
        Ok(Some(todo)) => Ok(Json(todo.into())),
        Ok(None) => Err(StatusCode::NOT_FOUND.into()),
        Err(fetch_err) => {
            error!("Todo fetch failure: {fetch_err}");
            Err(GenericErrorResponse(fetch_err).into())
        }
    }
}

/// Creates a new todo item
#[utoipa::path(
    post,
    path = "/todos",
    tag = "todos",
    request_body = dto::todo::NewTodo,
    responses(
        (status = 200, description = "The created todo item", body = dto::todo::TodoItem),
        (status = 400, description = "The submitted todo was invalid"),
        (status = 500, description = "The data store was unreachable"),
    ),
)]
async fn create_todo(
    new_todo: dto::todo::NewTodo,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Result<Json<dto::todo::TodoItem>, ErrorResponse> {
    info!("Creating a todo");
    new_todo.validate().map_err(ValidationErrorResponse::from)?;

    let domain_todo = domain::todo::NewTodo::from(new_todo);
    let todo_write = persistence::db_todo_driven_ports::DbTodoWriter {};

    let create_result = todo_service
        .create(&domain_todo, &mut *ext_cxn, &todo_write)
        .await;
    match create_result {
        Ok(created_todo) => Ok(Json(created_todo.into())),
        Err(create_err) => {
            error!("Todo create failure: {create_err}");
            Err(GenericErrorResponse(create_err).into())
        }
    }
}

/// Applies a partial update to an existing todo item
#[utoipa::path(
    put,
    path = "/todos/{todo_id}",
    tag = "todos",
    params(
        ("todo_id" = String, Path, description = "ID of the todo item to update"),
    ),
    request_body = dto::todo::UpdateTodo,
    responses(
        (status = 200, description = "The updated todo item", body = dto::todo::TodoItem),
        (status = 400, description = "The submitted update was invalid"),
        (status = 404, description = "No todo item has that ID"),
        (status = 500, description = "The data store was unreachable"),
    ),
)]
async fn update_todo(
    todo_id: i32,
    update: dto::todo::UpdateTodo,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Result<Json<dto::todo::TodoItem>, ErrorResponse> {
    info!("Updating todo {todo_id}");
    let todo_read = persistence::db_todo_driven_ports::DbTodoReader {};
    let todo_write = persistence::db_todo_driven_ports::DbTodoWriter {};

    // A missing record 404s before the payload is even inspected
    let existing_todo = todo_service
        .get_by_id(todo_id, &mut *ext_cxn, &todo_read)
        .await;
    match existing_todo {
        Ok(Some(_)) => {}
        Ok(None) => return Err(StatusCode::NOT_FOUND.into()),
        Err(fetch_err) => {
            error!("Todo update failure: {fetch_err}");
            return Err(GenericErrorResponse(fetch_err).into());
        }
    }

    update.validate().map_err(ValidationErrorResponse::from)?;
    let domain_update = domain::todo::UpdateTodo::from(update);

    let update_result = todo_service
        .update(todo_id, &domain_update, &mut *ext_cxn, &todo_read, &todo_write)
        .await;
    match update_result {
        Ok(updated_todo) => Ok(Json(updated_todo.into())),
        Err(TodoError::NotFound) => Err(StatusCode::NOT_FOUND.into()),
        Err(TodoError::PortError(update_err)) => {
            error!("Todo update failure: {update_err}");
            Err(GenericErrorResponse(update_err).into())
        }
    }
}

/// Deletes a todo item by its ID
#[utoipa::path(
    delete,
    path = "/todos/{todo_id}",
    tag = "todos",
    params(
        ("todo_id" = String, Path, description = "ID of the todo item to delete"),
    ),
    responses(
        (status = 204, description = "The todo item was removed"),
        (status = 404, description = "No todo item has that ID"),
        (status = 500, description = "The data store was unreachable"),
    ),
)]
async fn delete_todo(
    todo_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    todo_service: &impl TodoPort,
) -> Result<StatusCode, ErrorResponse> {
    info!("Deleting todo {todo_id}");
    let todo_write = persistence::db_todo_driven_ports::DbTodoWriter {};

    let delete_result = todo_service
        .delete(todo_id, &mut *ext_cxn, &todo_write)
        .await;
    match delete_result {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(TodoError::NotFound) => Err(NotFoundErrorResponse.into()),
        Err(TodoError::PortError(delete_err)) => {
            error!("Todo delete failure: {delete_err}");
            Err(GenericErrorResponse(delete_err).into())
        }
    }
}
