use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use domain::services::geofencing::GeofenceRegistry;
use domain::services::routing::{RouteEstimator, RoutingProvider, TrafficProvider};
use persistence::repositories::{
    AnalyticsRepository, AuditLogRepository, DeliveryRepository, GeoPointRepository,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{compliance, geofences, health, routing, tracking};
use crate::services::compliance::ComplianceScoringService;
use crate::services::events::TracingEventPublisher;
use crate::services::geospatial::GeospatialService;
use crate::services::providers::{
    OsrmRoutingProvider, StubAddressResolver, StubDriverDirectory, StubRoutingProvider,
    StubTrafficProvider,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub geospatial: Arc<GeospatialService>,
    pub compliance: Arc<ComplianceScoringService>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    let routing_provider: Arc<dyn RoutingProvider> =
        if config.routing.provider == "osrm" && !config.routing.url.is_empty() {
            info!(url = %config.routing.url, "Using OSRM routing provider");
            Arc::new(OsrmRoutingProvider::new(
                &config.routing,
                Box::new(StubAddressResolver),
            ))
        } else {
            info!("Using stub routing provider");
            Arc::new(StubRoutingProvider)
        };
    let traffic_provider: Arc<dyn TrafficProvider> = Arc::new(StubTrafficProvider);

    let registry = Arc::new(GeofenceRegistry::with_ttl(Some(chrono::Duration::hours(
        config.tracking.geofence_ttl_hours,
    ))));

    let geospatial = Arc::new(GeospatialService::new(
        GeoPointRepository::new(pool.clone()),
        DeliveryRepository::new(pool.clone()),
        registry,
        RouteEstimator::new(routing_provider, traffic_provider),
        Arc::new(StubDriverDirectory),
        Arc::new(TracingEventPublisher),
        config.tracking.online_threshold_secs,
    ));

    let compliance_service = Arc::new(ComplianceScoringService::new(
        AuditLogRepository::new(pool.clone()),
        DeliveryRepository::new(pool.clone()),
        AnalyticsRepository::new(pool.clone()),
    ));

    let state = AppState {
        pool,
        config: config.clone(),
        geospatial,
        compliance: compliance_service,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Versioned API routes. Authentication is handled upstream by the
    // platform's identity gateway.
    let api_routes = Router::new()
        // Tracking routes (v1)
        .route("/api/v1/tracking/locations", post(tracking::track_location))
        .route(
            "/api/v1/tracking/drivers/active",
            get(tracking::active_drivers),
        )
        .route(
            "/api/v1/tracking/drivers/radius",
            get(tracking::drivers_in_radius),
        )
        .route(
            "/api/v1/tracking/drivers/:driver_id/history",
            get(tracking::driver_history),
        )
        .route(
            "/api/v1/tracking/deliveries/:delivery_id/route",
            get(tracking::delivery_route),
        )
        .route(
            "/api/v1/tracking/clusters",
            get(tracking::clustered_drivers),
        )
        .route("/api/v1/tracking/heatmap", get(tracking::delivery_heatmap))
        // Geofencing routes (v1)
        .route("/api/v1/geofences/alerts", post(geofences::setup_alert))
        .route("/api/v1/geofences/alerts", get(geofences::get_alerts))
        .route("/api/v1/geofences/alerts", delete(geofences::clear_alert))
        // Route estimation (v1)
        .route("/api/v1/routes/query", post(routing::query_route))
        // Compliance routes (v1)
        .route(
            "/api/v1/compliance/drivers/:driver_id/score",
            get(compliance::driver_score),
        )
        .route(
            "/api/v1/compliance/partners/:partner_id/score",
            get(compliance::partner_score),
        )
        .route("/api/v1/compliance/system/score", get(compliance::system_score))
        .route("/api/v1/compliance/trends", get(compliance::trends))
        .route("/api/v1/compliance/report", get(compliance::report));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors)
        .with_state(state)
}
