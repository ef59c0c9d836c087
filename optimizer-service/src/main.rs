use axum::{
    Router,
    routing::{get, post},
};
use optimizer_service::{
    api::{handler::schedule, state::OptimizerAppState},
    domain::{engine::ShiftEngine, settings::EngineSettings},
};
use std::{env, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        schedule::generate_shifts,
        schedule::precheck_shifts,
    ),
    tags(
        (name = "Shifts", description = "Shift schedule optimization"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    let _guard = shared::telemetry::init_telemetry("optimizer-service");

    let port = env::var("SERVER_PORT").unwrap_or_else(|_| "8082".to_string());
    let settings_path =
        env::var("OPTIMIZER_CONFIG_PATH").unwrap_or_else(|_| "optimizer.toml".to_string());
    let settings = EngineSettings::load_or_default(&settings_path);

    let engine = Arc::new(ShiftEngine::new(settings));
    let state = Arc::new(OptimizerAppState { engine });

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(10)
        .key_extractor(SmartIpKeyExtractor)
        .use_headers()
        .finish()
        .expect("Failed to build governor config");

    let app = Router::new()
        .route(
            "/headpat",
            get(|| async {
                axum::Json(shared::responses::HeadpatResponse {
                    message: "nyaa~! optimizer standing by, senpai! (=^-w-^=)",
                })
            }),
        )
        .route("/api/v1/shifts/generate", post(schedule::generate_shifts))
        .route("/api/v1/shifts/precheck", post(schedule::precheck_shifts))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Rate limiting (per-IP, 2 req/s with burst of 10)
        .layer(GovernorLayer::new(governor_conf))
        // tracing log (turn request into info level)
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(tower_http::LatencyUnit::Millis),
                ),
        )
        .with_state(state);

    tracing::info!("optimizer-service listening on 0.0.0.0:{port}");

    let listener = TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("Failed to bind");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shared::shutdown::shutdown_signal())
    .await
    .expect("Oppsie! Server crashed!");

    tracing::info!("optimizer-service shut down");
}
