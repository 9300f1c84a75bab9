//! Integration tests for `GatewayClient`.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no real
//! network traffic is made. Covers request shape, response decoding, the
//! provider-trait error mapping, and retry classification.

use facility_core::{
    GeoPoint, RouteRequest, RoutingProvider, SearchProvider, SearchRequest, TravelMode,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use facility_providers::{GatewayClient, ProviderError};

const ORIGIN: GeoPoint = GeoPoint {
    lat: 37.7749,
    lng: -122.4194,
};

const DESTINATION: GeoPoint = GeoPoint {
    lat: 37.779,
    lng: -122.413,
};

/// 5-second timeout, API key set, no retries.
fn test_client(server: &MockServer) -> GatewayClient {
    GatewayClient::with_base_url(&server.uri(), 5, Some("test-key"), 0, 0)
        .expect("failed to build test GatewayClient")
}

/// Retries enabled with a zero back-off so tests stay fast.
fn test_client_with_retries(server: &MockServer, max_retries: u32) -> GatewayClient {
    GatewayClient::with_base_url(&server.uri(), 5, None, max_retries, 0)
        .expect("failed to build test GatewayClient")
}

fn search_request() -> SearchRequest {
    SearchRequest {
        origin: ORIGIN,
        category: "hospital".to_owned(),
        radius_meters: 5000,
        max_results: 20,
    }
}

fn route_request() -> RouteRequest {
    RouteRequest {
        origin: ORIGIN,
        destination: DESTINATION,
        mode: TravelMode::Driving,
    }
}

fn route_json() -> serde_json::Value {
    json!({
        "distance_meters": 2350.0,
        "duration_millis": 420000.0,
        "path": [
            {"lat": 37.7749, "lng": -122.4194},
            {"lat": 37.779, "lng": -122.413}
        ],
        "legs": [{
            "steps": [
                {"instruction": "Head <b>north</b>", "distance_meters": 350.0, "duration_millis": 42000.0},
                {"distance_meters": 2000.0, "duration_millis": 378000.0}
            ]
        }]
    })
}

// ---------------------------------------------------------------------------
// Nearby search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn nearby_posts_request_body_and_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/places/nearby"))
        .and(header("x-api-key", "test-key"))
        .and(body_json(json!({
            "origin": {"lat": 37.7749, "lng": -122.4194},
            "category": "hospital",
            "radius_meters": 5000,
            "max_results": 20
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [
                {
                    "id": "a",
                    "name": "Alta Medical Center",
                    "location": {"lat": 37.7794, "lng": -122.4194},
                    "primary_type": "hospital",
                    "types": ["hospital", "health"],
                    "business_status": "OPERATIONAL",
                    "rating_count": 50
                },
                {"name": "No Id Clinic"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.nearby(&search_request()).await;

    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let candidates = result.unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].id.as_deref(), Some("a"));
    assert_eq!(candidates[0].rating_count, Some(50));
    assert!(candidates[1].id.is_none());
    assert!(candidates[1].location.is_none());
}

#[tokio::test]
async fn nearby_treats_missing_candidates_field_as_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/places/nearby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let candidates = test_client(&server)
        .nearby(&search_request())
        .await
        .expect("empty body should decode");
    assert!(candidates.is_empty());
}

#[tokio::test]
async fn nearby_returns_deserialize_error_for_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/places/nearby"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = test_client(&server).nearby(&search_request()).await;
    assert!(
        matches!(result, Err(ProviderError::Deserialize { .. })),
        "expected Deserialize, got: {result:?}"
    );
}

#[tokio::test]
async fn search_provider_maps_errors_to_core_taxonomy() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/places/nearby"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .search_nearby(&search_request())
        .await
        .unwrap_err();
    assert!(err.message.contains("403"), "message: {}", err.message);
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn route_posts_request_and_returns_first_route() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/routes"))
        .and(body_json(json!({
            "origin": {"lat": 37.7749, "lng": -122.4194},
            "destination": {"lat": 37.779, "lng": -122.413},
            "mode": "driving"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "routes": [route_json(), {"path": []}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let route = test_client(&server)
        .route(&route_request())
        .await
        .expect("route should decode");

    assert_eq!(route.distance_meters, Some(2350.0));
    assert_eq!(route.path.as_ref().map(Vec::len), Some(2));
    assert_eq!(route.legs.len(), 1);
    assert_eq!(route.legs[0].steps.len(), 2);

    let plan = facility_core::extract_plan(&route).expect("plan");
    assert_eq!(plan.distance, "2.4 km");
    assert_eq!(plan.steps[0].instruction, "Head north");
    assert_eq!(plan.steps[1].instruction, "Continue");
}

#[tokio::test]
async fn empty_route_list_is_no_route() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/routes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"routes": []})))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.route(&route_request()).await;
    assert!(matches!(result, Err(ProviderError::NoRoute)));

    let err = client.compute_route(&route_request()).await.unwrap_err();
    assert!(err.message.contains("no routes"), "message: {}", err.message);
}

// ---------------------------------------------------------------------------
// Retry behaviour
// ---------------------------------------------------------------------------

#[tokio::test]
async fn retries_server_errors_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/routes"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/routes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"routes": [route_json()]})))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_client_with_retries(&server, 3)
        .route(&route_request())
        .await;
    assert!(result.is_ok(), "expected Ok after retries, got: {result:?}");
}

#[tokio::test]
async fn rate_limit_is_retried_and_surfaces_when_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/places/nearby"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(3)
        .mount(&server)
        .await;

    let result = test_client_with_retries(&server, 2)
        .nearby(&search_request())
        .await;
    assert!(
        matches!(
            result,
            Err(ProviderError::RateLimited {
                retry_after_secs: Some(0),
                ..
            })
        ),
        "expected RateLimited, got: {result:?}"
    );
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/places/nearby"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_client_with_retries(&server, 3)
        .nearby(&search_request())
        .await;
    assert!(
        matches!(result, Err(ProviderError::UnexpectedStatus { status: 400, .. })),
        "expected UnexpectedStatus(400), got: {result:?}"
    );
}
