use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use chainkit::vectorstores::chroma::{self, ChromaOption, ChromaStore, OPENAI_API_KEY_ENV_VAR};
use chainkit::{ChainError, MapEnv};

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn store(url: String) -> ChromaStore {
    let env = MapEnv::new().with_var(OPENAI_API_KEY_ENV_VAR, "sk-test");
    ChromaStore::with_env([chroma::with_chroma_url(url)], &env)
        .unwrap()
        .with_http_client(reqwest::Client::builder().no_proxy().build().unwrap())
}

#[tokio::test]
async fn heartbeat_and_collections() {
    let router = Router::new()
        .route(
            "/api/v1/heartbeat",
            get(|| async { Json(json!({ "nanosecond heartbeat": 1_700_000_000_u64 })) }),
        )
        .route(
            "/api/v1/collections",
            get(|| async { Json(json!([{ "name": "langchain", "id": "c-1" }])) }),
        );
    let base = serve(router).await;
    let store = store(format!("{base}/"));

    let heartbeat = store.heartbeat().await.unwrap();
    assert!(heartbeat.contains_key("nanosecond heartbeat"));

    let collections = store.list_collections().await.unwrap();
    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0]["name"], "langchain");
}

#[tokio::test]
async fn server_error_is_reported_with_status() {
    let router = Router::new().route(
        "/api/v1/collections",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base = serve(router).await;

    let err = store(base).list_collections().await.unwrap_err();

    match err {
        ChainError::Status { status, body, .. } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn store_is_never_built_from_unresolved_options() {
    let err = ChromaStore::with_env(Vec::<ChromaOption>::new(), &MapEnv::new()).unwrap_err();
    assert!(err.is_invalid_options(), "got {err}");

    let err = ChromaStore::with_env([chroma::with_chroma_url("http://localhost:8000")], &MapEnv::new())
        .unwrap_err();
    assert!(err.is_invalid_options(), "got {err}");
}
