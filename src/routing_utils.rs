use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_macros::FromRequest;

use serde::Serialize;
use utoipa::openapi::{RefOr, Schema};
use utoipa::{ToResponse, ToSchema, openapi};

use validator::ValidationErrors;

/// Contains diagnostic information about an API failure
#[derive(Serialize, Debug, ToResponse)]
#[response(examples(
    ("Internal Failure" = (
        summary = "Something unexpected went wrong inside the server (500)",
        value = json!({
            "error_code": "internal_error",
            "error_description": "Could not access data to complete your request.",
            "extra_info": null
        })
    )),

    ("Invalid Input" = (
        summary = "Invalid request body was passed (400)",
        value = json!({
            "error_code": "invalid_input",
            "error_description": "Submitted data was invalid.",
            "extra_info": {
                "description": [
                    {
                        "code": "not_blank",
                        "message": null,
                        "params": {
                            "value": "   "
                        }
                    }
                ]
            }
        })
    )),

    ("Malformed JSON" = (
        summary = "Invalid JSON passed to server (400)",
        value = json!({
            "error_code": "invalid_json",
            "error_description": "The passed request body contained malformed or unreadable JSON.",
            "extra_info": "Failed to parse the request body as JSON: EOF while parsing an object at line 4 column 0"
        })
    ))
))]
pub struct BasicErrorResponse {
    pub error_code: String,
    pub error_description: String,
    pub extra_info: Option<ExtraInfo>,
}

#[derive(Serialize, Debug, ToSchema)]
#[serde(untagged)]
pub enum ExtraInfo {
    ValidationIssues(ValidationErrorSchema),
    Message(String),
}

/// Stand-in OpenAPI schema for [ValidationErrors] which just provides an empty object
#[derive(Serialize, Debug)]
#[serde(transparent)]
pub struct ValidationErrorSchema(pub ValidationErrors);

impl<'schem> ToSchema<'schem> for ValidationErrorSchema {
    fn schema() -> (&'schem str, RefOr<Schema>) {
        (
            "ValidationErrorSchema",
            openapi::ObjectBuilder::new().into(),
        )
    }
}

/// Response type for store failures the client can't do anything about. Logs
/// the underlying error at the call site, responds with an opaque 500
pub struct GenericErrorResponse(pub anyhow::Error);

impl IntoResponse for GenericErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(BasicErrorResponse {
                error_code: "internal_error".into(),
                error_description: "Could not access data to complete your request.".into(),
                extra_info: None,
            }),
        )
            .into_response()
    }
}

/// Response type for requests naming an entity that doesn't exist, on routes
/// which report the miss in the body. The body is a single `error` message
pub struct NotFoundErrorResponse;

#[derive(Serialize, Debug)]
pub struct NotFoundBody {
    pub error: String,
}

impl IntoResponse for NotFoundErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::NOT_FOUND,
            Json(NotFoundBody {
                error: "The requested entity could not be found.".into(),
            }),
        )
            .into_response()
    }
}

/// Response type for store-level constraint violations, such as registering an
/// email that's already taken
pub struct ConflictErrorResponse(pub String);

impl IntoResponse for ConflictErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(BasicErrorResponse {
                error_code: "conflict".into(),
                error_description: self.0,
                extra_info: None,
            }),
        )
            .into_response()
    }
}

/// Response type for failed logins. Deliberately carries no hint about which
/// part of the credentials was wrong
pub struct AuthErrorResponse;

impl IntoResponse for AuthErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(BasicErrorResponse {
                error_code: "bad_credentials".into(),
                error_description: "The provided credentials did not match a known user.".into(),
                extra_info: None,
            }),
        )
            .into_response()
    }
}

/// Response type that wraps validation errors and turns them into [BasicErrorResponse]s
pub struct ValidationErrorResponse(ValidationErrors);

impl IntoResponse for ValidationErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(BasicErrorResponse {
                error_code: "invalid_input".into(),
                error_description: "Submitted data was invalid.".to_owned(),
                extra_info: Some(ExtraInfo::ValidationIssues(ValidationErrorSchema(self.0))),
            }),
        )
            .into_response()
    }
}

impl From<ValidationErrors> for ValidationErrorResponse {
    fn from(value: ValidationErrors) -> Self {
        Self(value)
    }
}

/// Wrapper for [axum::Json] which customizes the error response to use our
/// data structure for API errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(JsonErrorResponse))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Response type representing JSON parse errors
pub struct JsonErrorResponse {
    parse_problem: String,
}

impl From<JsonRejection> for JsonErrorResponse {
    fn from(value: JsonRejection) -> Self {
        JsonErrorResponse {
            parse_problem: value.body_text(),
        }
    }
}

impl IntoResponse for JsonErrorResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            axum::Json(BasicErrorResponse {
                error_code: "invalid_json".into(),
                error_description:
                    "The passed request body contained malformed or unreadable JSON.".into(),
                extra_info: Some(ExtraInfo::Message(self.parse_problem)),
            }),
        )
            .into_response()
    }
}
