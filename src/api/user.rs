use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::ErrorResponse;
use axum::routing::post;
use log::{error, info};
use std::sync::Arc;
use utoipa::OpenApi;
use validator::Validate;

use crate::domain::user::driving_ports::{AuthenticateError, CreateUserError, UserPort};
use crate::external_connections::{ExternalConnectivity, Transactable};
use crate::routing_utils::{
    AuthErrorResponse, ConflictErrorResponse, GenericErrorResponse, Json, ValidationErrorResponse,
};
use crate::{AppState, SharedData, domain, dto, persistence};

#[derive(OpenApi)]
#[openapi(paths(create_user, login))]
pub struct UsersApi;

/// Adds routes under "/users" to the application router
pub fn user_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/users",
            post(
                |State(app_state): AppState, Json(new_user): Json<dto::user::NewUser>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let user_service = domain::user::UserService {};

                    create_user(new_user, &mut ext_cxn, &user_service).await
                },
            ),
        )
        .route(
            "/users/login",
            post(
                |State(app_state): AppState,
                 Json(login_attempt): Json<dto::user::LoginRequest>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let user_service = domain::user::UserService {};

                    login(login_attempt, &mut ext_cxn, &user_service).await
                },
            ),
        )
}

/// Registers a new user account
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = dto::user::NewUser,
    responses(
        (status = 201, description = "The created user", body = dto::user::TodoUser),
        (status = 400, description = "The submitted user was invalid, or the email is already taken"),
        (status = 500, description = "The data store was unreachable"),
    ),
)]
async fn create_user(
    new_user: dto::user::NewUser,
    ext_cxn: &mut (impl ExternalConnectivity + Transactable),
    user_service: &impl UserPort,
) -> Result<(StatusCode, Json<dto::user::TodoUser>), ErrorResponse> {
    // NewUser's Display only prints the email, so the password stays out of the log
    info!("Attempt to create user: {new_user}");
    new_user.validate().map_err(ValidationErrorResponse::from)?;

    let domain_user = domain::user::CreateUser::from(new_user);
    let user_detect = persistence::db_user_driven_ports::DbDetectUser {};
    let user_write = persistence::db_user_driven_ports::DbWriteUsers {};

    let creation_result = user_service
        .create_user(&domain_user, &mut *ext_cxn, &user_detect, &user_write)
        .await;
    match creation_result {
        Ok(created_user) => Ok((StatusCode::CREATED, Json(created_user.into()))),
        Err(CreateUserError::EmailInUse) => Err(ConflictErrorResponse(
            "A user with that email already exists.".to_owned(),
        )
        .into()),
        Err(CreateUserError::PortError(create_err)) => {
            error!("User create failure: {create_err}");
            Err(GenericErrorResponse(create_err).into())
        }
    }
}

/// Verifies a user's credentials and returns their public profile
#[utoipa::path(
    post,
    path = "/users/login",
    tag = "users",
    request_body = dto::user::LoginRequest,
    responses(
        (status = 200, description = "The authenticated user", body = dto::user::TodoUser),
        (status = 401, description = "The credentials did not match a known user"),
        (status = 500, description = "The data store was unreachable"),
    ),
)]
async fn login(
    login_attempt: dto::user::LoginRequest,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl UserPort,
) -> Result<Json<dto::user::TodoUser>, ErrorResponse> {
    info!("Login attempt for {}", login_attempt.email);
    let user_read = persistence::db_user_driven_ports::DbReadUsers {};

    let auth_result = user_service
        .authenticate(
            &login_attempt.email,
            &login_attempt.password,
            &mut *ext_cxn,
            &user_read,
        )
        .await;
    match auth_result {
        Ok(authenticated_user) => Ok(Json(authenticated_user.into())),
        Err(AuthenticateError::BadCredentials) => Err(AuthErrorResponse.into()),
        Err(AuthenticateError::PortError(auth_err)) => {
            error!("Login failure: {auth_err}");
            Err(GenericErrorResponse(auth_err).into())
        }
    }
}
