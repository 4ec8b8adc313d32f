use axum::body;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Used in tests to both extract the raw bytes from the HTTP response body and then deserialize them into the
/// requested type. Will panic and fail the test if either step fails somehow.
pub async fn deserialize_body<T: DeserializeOwned>(response_body: body::Body) -> T {
    let bytes = body::to_bytes(response_body, usize::MAX)
        .await
        .expect("Could not read data from response body!");

    serde_json::from_slice(&bytes).unwrap_or_else(|err| {
        panic!(
            "Could not parse body content into data structure! Error: {}, Received body: {:?}",
            err, bytes
        )
    })
}

/// Asserts in tests that a response body is completely empty, for routes which
/// respond with a bare status code
pub async fn expect_empty_body(response_body: body::Body) {
    let bytes = body::to_bytes(response_body, usize::MAX)
        .await
        .expect("Could not read data from response body!");

    assert!(
        bytes.is_empty(),
        "Expected an empty response body, got: {bytes:?}"
    );
}

/// The part of [BasicErrorResponse][crate::routing_utils::BasicErrorResponse]
/// tests care about when checking which error came back
#[derive(Deserialize)]
pub struct ErrorBody {
    pub error_code: String,
}
