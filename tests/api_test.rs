use anyhow::Result;
use attractions_catalog::server::create_server;
use attractions_catalog::storage::{InMemoryStorage, Storage};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn app() -> Router {
    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
    create_server(storage)
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Result<Value> {
    let bytes = hyper::body::to_bytes(response.into_body()).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let response = app().oneshot(get_request("/health")).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    assert_eq!(body["status"], "healthy");
    Ok(())
}

#[tokio::test]
async fn locality_create_and_fetch_round_trip() -> Result<()> {
    let app = app();

    let payload = json!({
        "name": "Pavlovsk",
        "region": "Leningrad Oblast",
        "latitude": 59.68,
        "longitude": 30.45,
        "shortDescription": "Palace town"
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/localities", &payload))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let created = body_json(response).await?;
    let id = created["id"].as_str().expect("id in response").to_string();
    assert_eq!(created["shortDescription"], "Palace town");

    let response = app
        .oneshot(get_request(&format!("/localities/{id}")))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let fetched = body_json(response).await?;
    assert_eq!(fetched["id"], Value::String(id));
    assert_eq!(fetched["name"], "Pavlovsk");
    Ok(())
}

#[tokio::test]
async fn unknown_locality_returns_404() -> Result<()> {
    let response = app()
        .oneshot(get_request(&format!("/localities/{}", Uuid::new_v4())))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn attraction_with_bad_type_returns_400() -> Result<()> {
    let app = app();

    let locality = body_json(
        app.clone()
            .oneshot(json_request(
                "POST",
                "/localities",
                &json!({"name": "Pushkin", "region": "Leningrad Oblast"}),
            ))
            .await?,
    )
    .await?;
    let locality_id = locality["id"].as_str().unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/attractions",
            &json!({"name": "Catherine Palace", "type": "CASTLE", "localityId": locality_id}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn attraction_with_unknown_locality_returns_404() -> Result<()> {
    let response = app()
        .oneshot(json_request(
            "POST",
            "/attractions",
            &json!({"name": "Hermitage", "type": "MUSEUM", "localityId": Uuid::new_v4()}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn attractions_list_honors_type_filter() -> Result<()> {
    let app = app();

    let locality = body_json(
        app.clone()
            .oneshot(json_request(
                "POST",
                "/localities",
                &json!({"name": "Gatchina", "region": "Leningrad Oblast"}),
            ))
            .await?,
    )
    .await?;
    let locality_id = locality["id"].as_str().unwrap().to_string();

    for (name, kind) in [("Gatchina Palace", "PALACE"), ("Palace Museum", "MUSEUM")] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/attractions",
                &json!({"name": name, "type": kind, "localityId": locality_id}),
            ))
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(get_request("/attractions?type=museum"))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_json(response).await?;
    assert_eq!(page["totalElements"], 1);
    assert_eq!(page["content"][0]["type"], "MUSEUM");

    // Unparseable filter fails the call rather than returning an empty page
    let response = app.oneshot(get_request("/attractions?type=pyramid")).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn delete_is_terminal_and_missing_ids_404() -> Result<()> {
    let app = app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/assistances/{}", Uuid::new_v4()))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let created = body_json(
        app.clone()
            .oneshot(json_request(
                "POST",
                "/assistances",
                &json!({"type": "GUIDE", "shortDescription": "X", "executor": "Y"}),
            ))
            .await?,
    )
    .await?;
    let id = created["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/assistances/{id}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(get_request(&format!("/assistances/{id}")))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}
