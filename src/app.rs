use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::{PasswordHasher, TokenService};
use crate::config::AppConfig;
use crate::database::{CatalogStore, CredentialStore};
use crate::error::ApiError;
use crate::handlers::{categories, customers, products, system, users};
use crate::middleware::require_bearer;

/// Shared, read-only collaborators handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub credentials: Arc<dyn CredentialStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub tokens: Arc<TokenService>,
    pub hasher: Arc<PasswordHasher>,
}

impl AppState {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        catalog: Arc<dyn CatalogStore>,
        tokens: TokenService,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            credentials,
            catalog,
            tokens: Arc::new(tokens),
            hasher: Arc::new(hasher),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .field("hasher", &self.hasher)
            .finish_non_exhaustive()
    }
}

/// Full application: routes plus logging, panic recovery, timeout and CORS.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = routes(state).layer(CatchPanicLayer::custom(panic_response));
    let mut router = with_timeout(
        router,
        Duration::from_secs(config.api.request_timeout_secs),
    );

    if let Some(cors) = cors_layer(config) {
        router = router.layer(cors);
    }

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

/// Route table without global middleware.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(system::root_get))
        .route("/health", get(system::health_get))
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(users::register_post))
        .route("/login", post(users::login_post))
        .route("/products", get(products::products_get))
        .route("/products/:id", get(products::product_get))
        .route("/categories", get(categories::categories_get))
        .route("/customers", get(customers::customers_get))
}

/// Write operations; the bearer gate runs before any of these handlers.
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/products", post(products::products_post))
        .route(
            "/products/:id",
            axum::routing::put(products::product_put).delete(products::product_delete),
        )
        .route("/categories", post(categories::categories_post))
        .route("/categories/:id", delete(categories::category_delete))
        .route("/customers", post(customers::customers_post))
        .route_layer(middleware::from_fn_with_state(state, require_bearer))
}

/// Bound request time; an elapsed request answers 408 in the usual error envelope.
fn with_timeout(router: Router, timeout: Duration) -> Router {
    router
        .layer(TimeoutLayer::new(timeout))
        .layer(middleware::from_fn(timeout_envelope))
}

async fn timeout_envelope(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    // TimeoutLayer answers with a bare 408; handlers never produce one.
    if response.status() == StatusCode::REQUEST_TIMEOUT
        && !response.headers().contains_key(header::CONTENT_TYPE)
    {
        tracing::warn!("Request timed out");
        return ApiError::request_timeout("Request timed out").into_response();
    }
    response
}

fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    if !config.security.enable_cors {
        return None;
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {}", detail);

    ApiError::internal_server_error("Internal server error").into_response()
}
