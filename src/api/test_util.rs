use axum::body;
use serde::de::DeserializeOwned;

/// Reads a whole response body and parses it as JSON into `T`. Panics with the raw bytes
/// when the body isn't the expected shape, so handler tests fail with something readable.
pub async fn deserialize_body<T: DeserializeOwned>(response_body: body::Body) -> T {
    let bytes = body::to_bytes(response_body, usize::MAX)
        .await
        .expect("response body should be readable");

    serde_json::from_slice(&bytes)
        .unwrap_or_else(|err| panic!("response body didn't parse ({err}): {bytes:?}"))
}
