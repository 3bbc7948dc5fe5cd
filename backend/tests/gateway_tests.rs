//! Tests for the weather and mandi gateways
//!
//! Each test starts a small in-process HTTP server that stands in for the
//! upstream API, then points the client at it.

use axum::{
    body::{to_bytes, Body},
    extract::Query,
    http::{Request, StatusCode},
    routing::get,
    Json, Router,
};
use crop_advisor::config::{
    Config, DatasetConfig, MandiConfig, ModelConfig, ServerConfig, WeatherConfig,
};
use crop_advisor::external::{MandiClient, WeatherClient};
use crop_advisor::services::{MarketService, WeatherService};
use crop_advisor::{create_app, AppError, AppState};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use shared::{PriceMatchMode, PriceSuggestion};
use std::collections::HashMap;
use tower::ServiceExt;

/// Serve `app` on an ephemeral local port and return its base URL
async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn forecast_body(steps: usize) -> Value {
    let list: Vec<Value> = (0..steps)
        .map(|i| {
            json!({
                "dt": 1_700_000_000 + i as i64 * 10_800,
                "main": {"temp": 20.0 + i as f64, "humidity": 70},
                "weather": [{"main": "Clear", "description": format!("step {}", i)}]
            })
        })
        .collect();
    json!({"cod": "200", "city": {"name": "Pune"}, "list": list})
}

fn mandi_body() -> Value {
    json!({
        "records": [
            {"state": "Punjab", "market": "Khanna", "commodity": "Wheat", "modal_price": "2125"},
            {"state": "Kerala", "market": "Kollam", "commodity": "Banana", "modal_price": "NR"},
            {"state": "Bihar", "market": "Patna", "commodity": "Maize", "modal_price": "1800"},
            {"state": "Gujarat", "market": "Rajkot", "commodity": "Groundnut", "modal_price": "5400"}
        ]
    })
}

// ============================================================================
// Weather Gateway
// ============================================================================

mod weather_gateway {
    use super::*;

    #[tokio::test]
    async fn test_forecast_sends_city_key_and_units() {
        let app = Router::new().route(
            "/forecast",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                let ok = q.get("q").map(String::as_str) == Some("Pune")
                    && q.get("appid").map(String::as_str) == Some("secret")
                    && q.get("units").map(String::as_str) == Some("metric");
                if ok {
                    (StatusCode::OK, Json(forecast_body(8)))
                } else {
                    (StatusCode::BAD_REQUEST, Json(json!({"cod": "400"})))
                }
            }),
        );
        let base = serve(app).await;

        let client = WeatherClient::with_base_url("secret".into(), base);
        let forecast = client.get_forecast("Pune").await.unwrap();
        assert_eq!(forecast.city, "Pune");
        assert_eq!(forecast.entries.len(), 8);
    }

    #[tokio::test]
    async fn test_service_keeps_first_five_steps() {
        let app = Router::new().route("/forecast", get(|| async { Json(forecast_body(40)) }));
        let base = serve(app).await;

        let service = WeatherService::from_config(&WeatherConfig {
            api_endpoint: base,
            api_key: "secret".to_string(),
        });
        let forecast = service.forecast("Pune").await.unwrap();
        assert_eq!(forecast.entries.len(), 5);
        assert_eq!(forecast.entries[0].description, "step 0");
        assert!((forecast.entries[4].temperature_celsius - 24.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_unknown_city_is_unavailable() {
        let app = Router::new().route(
            "/forecast",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"cod": "404", "message": "city not found"})),
                )
            }),
        );
        let base = serve(app).await;

        let client = WeatherClient::with_base_url("secret".into(), base);
        let err = client.get_forecast("Atlantis").await.unwrap_err();
        assert!(matches!(err, AppError::WeatherServiceUnavailable));
    }

    #[tokio::test]
    async fn test_malformed_body_is_unavailable() {
        let app = Router::new().route("/forecast", get(|| async { "<html>oops</html>" }));
        let base = serve(app).await;

        let client = WeatherClient::with_base_url("secret".into(), base);
        let err = client.get_forecast("Pune").await.unwrap_err();
        assert!(matches!(err, AppError::WeatherServiceUnavailable));
    }
}

// ============================================================================
// Mandi Gateway
// ============================================================================

mod mandi_gateway {
    use super::*;

    #[tokio::test]
    async fn test_fetch_sends_key_format_and_limit() {
        let app = Router::new().route(
            "/resource",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                let ok = q.get("api-key").map(String::as_str) == Some("secret")
                    && q.get("format").map(String::as_str) == Some("json")
                    && q.get("limit").map(String::as_str) == Some("50");
                if ok {
                    (StatusCode::OK, Json(mandi_body()))
                } else {
                    (StatusCode::FORBIDDEN, Json(json!({"error": "bad key"})))
                }
            }),
        );
        let base = serve(app).await;

        let client = MandiClient::new("secret".into(), format!("{}/resource", base), 50);
        let prices = client.fetch_prices().await.unwrap();
        let names: Vec<&str> = prices.iter().map(|p| p.commodity.as_str()).collect();
        assert_eq!(names, vec!["Wheat", "Maize", "Groundnut"]);
    }

    #[tokio::test]
    async fn test_suggestions_at_or_above_keep_api_order() {
        let app = Router::new().route("/resource", get(|| async { Json(mandi_body()) }));
        let base = serve(app).await;

        let service = MarketService::with_client(MandiClient::new(
            "secret".into(),
            format!("{}/resource", base),
            100,
        ));
        let suggestion = service
            .suggest_by_price(Decimal::from(2000), PriceMatchMode::AtOrAbove)
            .await
            .unwrap();
        let names: Vec<&str> = suggestion
            .prices()
            .iter()
            .map(|p| p.commodity.as_str())
            .collect();
        assert_eq!(names, vec!["Wheat", "Groundnut"]);
    }

    #[tokio::test]
    async fn test_nothing_above_price_is_no_match() {
        let app = Router::new().route("/resource", get(|| async { Json(mandi_body()) }));
        let base = serve(app).await;

        let service = MarketService::with_client(MandiClient::new(
            "secret".into(),
            format!("{}/resource", base),
            100,
        ));
        let suggestion = service
            .suggest_by_price(Decimal::from(10_000), PriceMatchMode::AtOrAbove)
            .await
            .unwrap();
        assert!(matches!(suggestion, PriceSuggestion::NoMatch { .. }));
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let app = Router::new().route(
            "/resource",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "down") }),
        );
        let base = serve(app).await;

        let client = MandiClient::new("secret".into(), format!("{}/resource", base), 10);
        let err = client.fetch_prices().await.unwrap_err();
        assert!(matches!(err, AppError::MarketServiceUnavailable));
    }

    #[tokio::test]
    async fn test_zero_price_never_reaches_the_api() {
        let hits = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/resource",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    Json(mandi_body())
                }
            }),
        );
        let base = serve(app).await;

        let service = MarketService::with_client(MandiClient::new(
            "secret".into(),
            format!("{}/resource", base),
            10,
        ));
        let err = service
            .suggest_by_price(Decimal::ZERO, PriceMatchMode::AtOrAbove)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidPrice));
        assert_eq!(err.to_string(), "Please enter a valid price.");
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}

// ============================================================================
// Price Panel Over HTTP
// ============================================================================

mod price_panel {
    use super::*;

    /// Application config whose mandi endpoint is the stub at `base`
    fn config_with_mandi(base: &str) -> Config {
        Config {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            datasets: DatasetConfig {
                crop_path: "missing/crops.csv".to_string(),
                region_path: "missing/regions.csv".to_string(),
                price_path: "missing/prices.csv".to_string(),
            },
            model: ModelConfig::default(),
            weather: WeatherConfig {
                api_endpoint: "http://127.0.0.1:9".to_string(),
                api_key: String::new(),
            },
            mandi: MandiConfig {
                api_endpoint: format!("{}/resource", base),
                api_key: "secret".to_string(),
                limit: 100,
            },
        }
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_tolerance_query_orders_by_distance() {
        let stub = Router::new().route("/resource", get(|| async { Json(mandi_body()) }));
        let base = serve(stub).await;
        let app = create_app(AppState::new(config_with_mandi(&base)));

        let (status, body) =
            get_json(app, "/api/v1/market/suggestions?price=1900&tolerance=300").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "matched");
        let names: Vec<&str> = body["prices"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["commodity"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Maize", "Wheat"]);
    }

    #[tokio::test]
    async fn test_negative_tolerance_is_bad_request() {
        let stub = Router::new().route("/resource", get(|| async { Json(mandi_body()) }));
        let base = serve(stub).await;
        let app = create_app(AppState::new(config_with_mandi(&base)));

        let (status, body) =
            get_json(app, "/api/v1/market/suggestions?price=1900&tolerance=-1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "tolerance");
    }
}
