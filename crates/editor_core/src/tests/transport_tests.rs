use super::*;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use shared::error::ErrorCode;

use crate::support::{unreachable_base_url, FakeSite};

fn session() -> Credentials {
    Credentials {
        bearer_token: Some("token-abc".to_string()),
        csrf_token: Some("csrf-123".to_string()),
        operator: Some("editor@cozy.test".to_string()),
    }
}

#[test]
fn base_url_gains_trailing_slash_so_paths_join_under_it() {
    let client = ApiClient::new(
        "http://localhost:8000/api",
        Credentials::default(),
        DEFAULT_TIMEOUT,
    )
    .expect("client");
    assert_eq!(client.base_url().as_str(), "http://localhost:8000/api/");
    assert_eq!(
        client.endpoint("/website/hero/").expect("endpoint").as_str(),
        "http://localhost:8000/api/website/hero/"
    );
}

#[test]
fn rejects_unparseable_base_url() {
    let err = normalize_base_url("not a url").expect_err("must fail");
    assert!(matches!(err, ClientError::InvalidUrl { .. }));
}

#[tokio::test]
async fn bearer_on_every_request_csrf_only_on_unsafe_methods() {
    let site = FakeSite::spawn().await;
    let client = site.client_with(session());

    let _: Value = client.get("website/hero/").await.expect("get");
    let _: Value = client
        .put("website/hero/", &json!({"title": "Cozy living"}))
        .await
        .expect("put");

    let requests = site.requests().await;
    assert_eq!(requests.len(), 2);
    let (get, put) = (&requests[0], &requests[1]);
    assert_eq!(get.header("authorization"), Some("Bearer token-abc"));
    assert_eq!(get.header("x-csrftoken"), None);
    assert_eq!(put.method, Method::PUT);
    assert_eq!(put.header("authorization"), Some("Bearer token-abc"));
    assert_eq!(put.header("x-csrftoken"), Some("csrf-123"));
}

#[tokio::test]
async fn anonymous_session_sends_no_credentials() {
    let site = FakeSite::spawn().await;
    let client = site.client();
    let _: Value = client.get("website/faq/").await.expect("get");

    let requests = site.requests().await;
    assert_eq!(requests[0].header("authorization"), None);
}

#[tokio::test]
async fn non_success_status_carries_server_detail() {
    let site = FakeSite::spawn().await;
    site.fail(
        Method::POST,
        "website/stories/",
        StatusCode::BAD_REQUEST,
        json!({"title": ["This field may not be blank."]}),
    )
    .await;

    let err = site
        .client()
        .post::<_, Value>("website/stories/", &json!({"title": ""}))
        .await
        .expect_err("must fail");

    match &err {
        ClientError::Rejected(api) => {
            assert_eq!(api.code, ErrorCode::Validation);
            assert_eq!(api.status, 400);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err
        .server_detail()
        .expect("detail")
        .contains("This field may not be blank."));
}

#[tokio::test]
async fn delete_accepts_an_empty_no_content_reply() {
    let site = FakeSite::spawn().await;
    site.seed("partners", vec![json!({"id": 3, "name": "Nordic Wood"})])
        .await;

    site.client()
        .delete("website/partners/3/")
        .await
        .expect("delete");
    assert_eq!(site.count(Method::DELETE, "website/partners/3/").await, 1);
}

#[tokio::test]
async fn upload_posts_the_file_as_the_image_field() {
    let site = FakeSite::spawn().await;
    let upload = ImageUpload::new(
        "oak.jpg",
        Some("image/jpeg".to_string()),
        vec![0xff, 0xd8, 0xff],
    );

    let url = site
        .client_with(session())
        .upload_image(&upload)
        .await
        .expect("upload");

    assert_eq!(url, "http://cdn.test/media/website/upload-1.jpg");
    let requests = site.requests().await;
    assert_eq!(requests[0].path, UPLOAD_PATH);
    assert!(requests[0]
        .header("content-type")
        .expect("content type")
        .starts_with("multipart/form-data"));
    assert_eq!(requests[0].header("x-csrftoken"), Some("csrf-123"));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let base_url = unreachable_base_url().await;
    let client =
        ApiClient::new(&base_url, Credentials::default(), DEFAULT_TIMEOUT).expect("client");

    let err = client
        .get::<Value>("website/hero/")
        .await
        .expect_err("must fail");
    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(err.server_detail(), None);
}
