use axum::Router;
use axum::body::{self, Body};
use axum::http::{Method, Request, StatusCode, header};
use lazy_static::lazy_static;
use rand::{Rng, thread_rng};
use serde_json::Value;
use std::future::Future;
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tower::ServiceExt;
use user_todo_rest::{SharedData, build_app, db, persistence};

lazy_static! {
    static ref TOKIO_RT: Runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Tokio runtime failed to initialize");
}

/// A throwaway sqlite file which is removed once the test is over
struct TestDatabase {
    file_path: PathBuf,
}

impl TestDatabase {
    fn create() -> Self {
        let mut rng = thread_rng();
        let db_id: u64 = rng.r#gen();
        let file_path = std::env::temp_dir().join(format!("test_db_{db_id}.db"));

        Self { file_path }
    }

    fn url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.file_path.display())
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        if let Err(remove_err) = std::fs::remove_file(&self.file_path) {
            println!(
                "Failed to remove test database {}, please remove it manually. Error: {}",
                self.file_path.display(),
                remove_err
            );
        }
    }
}

/// Provisions a fresh database with the service's tables, then hands the test a fully
/// wired router backed by it
pub fn prepare_db_and_test<F, R>(test_fn: F)
where
    R: Future<Output = ()>,
    F: FnOnce(Router) -> R,
{
    let test_db = TestDatabase::create();

    TOKIO_RT.block_on(async move {
        let db_url = test_db.url();
        let pool = db::connect_sqlx(&db_url)
            .await
            .expect("Test failure - could not connect to the test database");
        db::ensure_schema(&pool, db::Backend::Sqlite)
            .await
            .expect("Test failure - could not create tables");

        let app = build_app(SharedData {
            ext_cxn: persistence::ExternalConnectivity::new(pool.clone(), db::Backend::Sqlite),
        });
        test_fn(app).await;
        pool.close().await;
    });
}

/// Sends one request through the router. Bodies are sent as JSON; responses come back parsed.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.map(|raw| Body::from(raw.to_owned())).unwrap_or_else(Body::empty))
        .expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read data from response body!");
    let parsed = serde_json::from_slice(&bytes).unwrap_or_else(|err| {
        panic!("Response body was not JSON! Error: {err}, Received body: {bytes:?}")
    });

    (status, parsed)
}

/// Creates a user through the API, failing the test if that doesn't work
pub async fn create_user(app: &Router, username: &str) {
    let (status, body) = send(app, Method::POST, &format!("/user/{username}"), Some("[]")).await;
    assert_eq!(StatusCode::CREATED, status, "creating {username} failed: {body}");
}
