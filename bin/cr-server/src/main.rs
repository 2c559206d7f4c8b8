//! CivicReport API Server
//!
//! Backend-for-frontend between the web/mobile client and the hosted
//! services: a Postgres-over-REST row store, an identity provider, and an
//! image host.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PORT` | `8000` | HTTP API port |
//! | `CORS_ORIGINS` | `http://localhost:3000` | Comma-separated allowed origins |
//! | `SUPABASE_URL` | - | Hosted project base URL (required) |
//! | `SUPABASE_KEY` | - | Anon API key (required) |
//! | `SUPABASE_SERVICE_ROLE_KEY` | - | Service key for row access (falls back to anon key) |
//! | `CLOUDINARY_CLOUD_NAME` | - | Image host cloud name |
//! | `CLOUDINARY_API_KEY` | - | Image host API key |
//! | `CLOUDINARY_API_SECRET` | - | Image host API secret |
//! | `RUST_LOG` | `info` | Log level |

use anyhow::Result;
use axum::{http::HeaderValue, response::Json, routing::get, Router};
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use cr_config::ConfigLoader;
use cr_platform::api::{
    admin_router, auth_router, comments_router, departments_router, faq_router, issues_router,
    notifications_router, users_router, AdminState, AuthApiState, CommentsState, DepartmentsState,
    FaqState, IssuesState, NotificationsState, UsersState,
};
use cr_platform::{
    AppState, AuthLayer, AuthService, CloudinaryMedia, IdentityResolver, IssueService,
    SupabaseAuth, SupabaseRest,
};

#[tokio::main]
async fn main() -> Result<()> {
    cr_common::logging::init_logging("cr-server");

    info!("Starting CivicReport API Server");

    let config = ConfigLoader::new().load()?;
    config.validate()?;

    let http = reqwest::Client::new();

    // Row access prefers the service role key; auth always uses the anon key.
    let store_key = config
        .remote
        .service_role_key
        .clone()
        .unwrap_or_else(|| config.remote.api_key.clone());
    let store = Arc::new(SupabaseRest::new(
        http.clone(),
        config.remote.rest_base(),
        store_key,
    ));
    let auth_provider = Arc::new(SupabaseAuth::new(
        http.clone(),
        config.remote.auth_base(),
        config.remote.api_key.clone(),
    ));
    let media = Arc::new(CloudinaryMedia::new(
        http,
        &config.media.cloud_name,
        config.media.api_key.clone(),
        config.media.api_secret.clone(),
    ));

    let identity = Arc::new(IdentityResolver::new(auth_provider.clone()));
    let auth_service = Arc::new(AuthService::new(auth_provider));
    let issue_service = Arc::new(IssueService::new(store.clone(), media));
    info!("Services initialized");

    let app_state = AppState {
        identity: identity.clone(),
    };

    let issues_state = IssuesState {
        issues: issue_service,
    };
    let comments_state = CommentsState {
        store: store.clone(),
    };
    let departments_state = DepartmentsState {
        store: store.clone(),
    };
    let notifications_state = NotificationsState {
        store: store.clone(),
    };
    let users_state = UsersState {
        store: store.clone(),
    };
    let admin_state = AdminState {
        store: store.clone(),
    };
    let faq_state = FaqState { store };
    let auth_state = AuthApiState { auth: auth_service };

    let (router, mut openapi) = OpenApiRouter::new()
        .nest(
            "/issues",
            issues_router(issues_state).merge(comments_router(comments_state)),
        )
        .nest("/auth", auth_router(auth_state))
        .nest("/users", users_router(users_state))
        .nest("/departments", departments_router(departments_state))
        .nest("/notifications", notifications_router(notifications_state))
        .nest("/admin", admin_router(admin_state))
        .nest("/faq", faq_router(faq_state))
        .split_for_parts();

    openapi.info.title = "CivicReport API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description =
        Some("REST APIs for civic issue reporting and administration".to_string());

    let app = Router::new()
        .merge(router)
        .route("/health", get(health_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/openapi.json", openapi))
        .layer(AuthLayer::new(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.http.cors_origins));

    let addr = format!("{}:{}", config.http.host, config.http.port);
    info!("API server listening on http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("CivicReport API Server shutdown complete");
    Ok(())
}

/// Build the CORS layer from configured origins; `*` opens it up entirely.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
