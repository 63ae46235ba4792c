use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use super::generate;
use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Create the full router with application state
///
/// `/metrics` is mounted only when a Prometheus recorder was installed.
pub fn create_router(state: AppState, metrics: Option<PrometheusMetrics>) -> Router {
    let mut router = Router::new()
        .route("/", get(health::welcome))
        .route("/generate", post(generate::generate_presentation))
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    if let Some(m) = metrics {
        router = router.merge(create_metrics_router(m));
    }

    router
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use std::net::{IpAddr, SocketAddr};

    use axum::body::{to_bytes, Body};
    use axum::extract::ConnectInfo;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::api::middleware::ClientIdPolicy;
    use crate::domain::llm::ScriptedLanguageModel;
    use crate::domain::LanguageModel;
    use crate::infrastructure::{
        ContentGenerator, DeckRenderer, GenerationCache, PipelineOrchestrator, PptxWriter,
        SlidingWindowRateLimiter,
    };

    fn plan_json() -> String {
        json!({ "slides": [
            { "layout": "title_slide", "content": { "title": "**Saturn**", "subtitle": "Rings" } },
            { "layout": "bullet_points", "content": { "title": "Facts", "points": ["Ice", "__Rock__"] } },
            { "layout": "bullet_points", "content": { "title": "Sources", "points": ["NASA"] } }
        ] })
        .to_string()
    }

    fn app(model: &Arc<ScriptedLanguageModel>, limit: u32) -> Router {
        app_with_policy(model, limit, ClientIdPolicy::default())
    }

    fn app_with_policy(
        model: &Arc<ScriptedLanguageModel>,
        limit: u32,
        policy: ClientIdPolicy,
    ) -> Router {
        let generator = ContentGenerator::new(
            Arc::clone(model) as Arc<dyn LanguageModel>,
            GenerationCache::new(),
        );
        let pipeline = PipelineOrchestrator::new(
            Arc::new(SlidingWindowRateLimiter::new(limit, Duration::from_secs(60))),
            generator,
            DeckRenderer::default(),
            PptxWriter::new(),
        );
        create_router(AppState::new(pipeline).with_client_id_policy(policy), None)
    }

    /// Request as seen by a server started with connect info for `peer`
    fn generate_request(body: Value, peer: &str) -> Request<Body> {
        let ip: IpAddr = peer.parse().unwrap();
        Request::builder()
            .method("POST")
            .uri("/generate")
            .header(header::CONTENT_TYPE, "application/json")
            .extension(ConnectInfo(SocketAddr::new(ip, 40000)))
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn forwarded_request(body: Value, peer: &str, forwarded_for: &str) -> Request<Body> {
        let mut request = generate_request(body, peer);
        request
            .headers_mut()
            .insert("x-forwarded-for", forwarded_for.parse().unwrap());
        request
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_generate_returns_pptx_attachment() {
        let model = Arc::new(ScriptedLanguageModel::responding(plan_json()));
        let response = app(&model, 5)
            .oneshot(generate_request(
                json!({ "topic": "Saturn's Rings", "num_slides": 3, "aspect_ratio": "4:3" }),
                "10.0.0.1",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Saturns_Rings_presentation.pptx\""
        );
        assert!(response.headers().contains_key("x-request-id"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
        assert!(archive.file_names().any(|name| name == "ppt/slides/slide3.xml"));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_invalid_fields_return_422_with_field_list() {
        let model = Arc::new(ScriptedLanguageModel::responding(plan_json()));
        let response = app(&model, 5)
            .oneshot(generate_request(json!({ "topic": "ab", "num_slides": 0 }), "10.0.0.1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["type"], "validation_error");

        let fields: Vec<&str> = body["error"]["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["num_slides", "topic"]);
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_aspect_ratio_is_422() {
        let model = Arc::new(ScriptedLanguageModel::responding(plan_json()));
        let app = app(&model, 5);

        let cases = [
            (json!({ "topic": "Saturn", "aspect_ratio": "21:9" }), "aspect_ratio", "invalid"),
            (json!({ "num_slides": 3 }), "topic", "required"),
            (json!({ "topic": "Saturn", "num_slides": -1 }), "num_slides", "invalid"),
        ];

        for (request, field, code) in cases {
            let response = app
                .clone()
                .oneshot(generate_request(request, "10.0.0.1"))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
            let body = json_body(response).await;
            assert_eq!(body["error"]["type"], "validation_error");
            assert_eq!(body["error"]["code"], "json_parse_error");
            assert_eq!(body["error"]["fields"][0]["field"], field);
            assert_eq!(body["error"]["fields"][0]["code"], code);
            assert_eq!(body["error"]["fields"].as_array().unwrap().len(), 1);
        }
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_rate_limit_returns_429_per_client() {
        let model = Arc::new(ScriptedLanguageModel::responding(plan_json()));
        let app = app(&model, 1);
        let body = json!({ "topic": "Saturn's Rings", "num_slides": 3 });

        let first = app
            .clone()
            .oneshot(generate_request(body.clone(), "10.0.0.1"))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app
            .clone()
            .oneshot(generate_request(body.clone(), "10.0.0.1"))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(second.headers().contains_key(header::RETRY_AFTER));
        assert_eq!(json_body(second).await["error"]["type"], "rate_limit_error");

        // another client has its own window
        let other = app
            .oneshot(generate_request(body, "10.0.0.2"))
            .await
            .unwrap();
        assert_eq!(other.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_forwarded_for_cannot_dodge_rate_limit() {
        let model = Arc::new(ScriptedLanguageModel::responding(plan_json()));
        let app = app(&model, 1);
        let body = json!({ "topic": "Saturn's Rings", "num_slides": 3 });

        let mut statuses = Vec::new();
        for forwarded in ["1.1.1.0", "1.1.1.1", "1.1.1.2"] {
            let response = app
                .clone()
                .oneshot(forwarded_request(body.clone(), "198.51.100.9", forwarded))
                .await
                .unwrap();
            statuses.push(response.status());
        }

        assert_eq!(
            statuses,
            vec![
                StatusCode::OK,
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::TOO_MANY_REQUESTS
            ]
        );
    }

    #[tokio::test]
    async fn test_trusted_forwarded_for_keys_the_limit() {
        let model = Arc::new(ScriptedLanguageModel::responding(plan_json()));
        let policy = ClientIdPolicy {
            trust_forwarded_for: true,
        };
        let app = app_with_policy(&model, 1, policy);
        let body = json!({ "topic": "Saturn's Rings", "num_slides": 3 });

        let mut statuses = Vec::new();
        for forwarded in ["203.0.113.1", "203.0.113.2", "203.0.113.1"] {
            let response = app
                .clone()
                .oneshot(forwarded_request(body.clone(), "10.0.0.1", forwarded))
                .await
                .unwrap();
            statuses.push(response.status());
        }

        // behind a trusted proxy each forwarded client has its own window
        assert_eq!(
            statuses,
            vec![
                StatusCode::OK,
                StatusCode::OK,
                StatusCode::TOO_MANY_REQUESTS
            ]
        );
    }

    #[tokio::test]
    async fn test_upstream_failure_returns_500() {
        let model = Arc::new(
            ScriptedLanguageModel::new()
                .then_fail("503 Service Unavailable")
                .then_fail("503 Service Unavailable"),
        );
        let response = app(&model, 5)
            .oneshot(generate_request(json!({ "topic": "Saturn", "num_slides": 3 }), "10.0.0.1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"]["type"], "server_error");
        assert_eq!(body["error"]["code"], "upstream_error");
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn test_malformed_model_output_returns_500() {
        let model = Arc::new(ScriptedLanguageModel::responding("Sure! Here are your slides."));
        let response = app(&model, 5)
            .oneshot(generate_request(json!({ "topic": "Saturn", "num_slides": 3 }), "10.0.0.1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"]["code"], "generation_error");
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_ready_reports_cached_plans() {
        let model = Arc::new(ScriptedLanguageModel::responding(plan_json()));
        let app = app(&model, 5);

        app.clone()
            .oneshot(generate_request(json!({ "topic": "Saturn", "num_slides": 3 }), "10.0.0.1"))
            .await
            .unwrap();

        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["checks"][0]["name"], "generation_cache");
        assert_eq!(body["checks"][0]["cached_plans"], 1);
    }

    #[tokio::test]
    async fn test_welcome_and_liveness() {
        let model = Arc::new(ScriptedLanguageModel::new());
        let app = app(&model, 5);

        let welcome = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(welcome.status(), StatusCode::OK);
        assert!(
            json_body(welcome).await["message"]
                .as_str()
                .unwrap()
                .starts_with("Welcome to the Slide Generator API")
        );

        let live = app
            .oneshot(Request::builder().uri("/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(live.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_route_absent_when_disabled() {
        let model = Arc::new(ScriptedLanguageModel::new());
        let response = app(&model, 5)
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
