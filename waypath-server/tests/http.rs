use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use waypath_server::cache::GraphCache;
use waypath_server::{build_router, AppState};

async fn processing_time_ms(response: axum::response::Response) -> u64 {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    body["metrics"]["processing_time_ms"].as_u64().unwrap()
}

async fn state_against(upstream_uri: String) -> AppState {
    AppState {
        cache: GraphCache::new(),
        client: reqwest::Client::new(),
        fetch_config: waypath_fetch::FetchConfig {
            upstream_url: upstream_uri,
            timeout: Duration::from_secs(5),
        },
    }
}

fn ways_body() -> serde_json::Value {
    serde_json::json!({
        "elements": [
            {
                "type": "way",
                "id": 1,
                "tags": { "highway": "residential" },
                "geometry": [
                    { "lat": 51.5, "lon": -0.12 },
                    { "lat": 51.501, "lon": -0.119 },
                ]
            }
        ]
    })
}

#[tokio::test]
async fn post_route_with_reachable_pair_returns_200() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ways_body()))
        .mount(&server)
        .await;

    let app = build_router(state_against(server.uri()).await);
    let body = serde_json::json!({
        "source": { "lat": 51.5, "lng": -0.12 },
        "destination": { "lat": 51.501, "lng": -0.119 }
    });
    let response = app
        .oneshot(
            Request::post("/route")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn second_request_in_same_quantized_bbox_reuses_cached_graph() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ways_body()))
        .expect(1)
        .mount(&server)
        .await;

    let app = build_router(state_against(server.uri()).await);

    let first_body = serde_json::json!({
        "source": { "lat": 51.5, "lng": -0.12 },
        "destination": { "lat": 51.501, "lng": -0.119 }
    });
    let first_response = app
        .clone()
        .oneshot(
            Request::post("/route")
                .header("content-type", "application/json")
                .body(Body::from(first_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first_response.status(), StatusCode::OK);
    let first_ms = processing_time_ms(first_response).await;

    // Endpoints close enough that the bbox quantizes to the same cache key
    // as the first request, but distinct enough to rule out a literal-request cache.
    let second_body = serde_json::json!({
        "source": { "lat": 51.5005, "lng": -0.1199 },
        "destination": { "lat": 51.5015, "lng": -0.1189 }
    });
    let second_response = app
        .clone()
        .oneshot(
            Request::post("/route")
                .header("content-type", "application/json")
                .body(Body::from(second_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(second_response.status(), StatusCode::OK);
    let second_ms = processing_time_ms(second_response).await;

    assert!(
        second_ms < first_ms,
        "cache hit should skip the fetch+build stages: first={first_ms}ms second={second_ms}ms"
    );

    // `server`'s drop at the end of this test verifies the mounted mock's
    // `expect(1)`: a second upstream call would mean the cache was not consulted.
}

#[tokio::test]
async fn post_route_with_out_of_range_coordinates_returns_400() {
    let app = build_router(state_against("http://unused.invalid".to_string()).await);
    let body = serde_json::json!({
        "source": { "lat": 500.0, "lng": 0.0 },
        "destination": { "lat": 0.0, "lng": 0.0 }
    });
    let response = app
        .oneshot(
            Request::post("/route")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_route_with_too_close_endpoints_returns_400() {
    let app = build_router(state_against("http://unused.invalid".to_string()).await);
    let body = serde_json::json!({
        "source": { "lat": 51.5, "lng": -0.12 },
        "destination": { "lat": 51.5, "lng": -0.12 }
    });
    let response = app
        .oneshot(
            Request::post("/route")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_health_returns_200_without_upstream() {
    let app = build_router(state_against("http://unused.invalid".to_string()).await);
    let response = app.oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn malformed_json_body_returns_400_not_500() {
    let app = build_router(state_against("http://unused.invalid".to_string()).await);
    let response = app
        .oneshot(
            Request::post("/route")
                .header("content-type", "application/json")
                .body(Body::from("{not valid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
