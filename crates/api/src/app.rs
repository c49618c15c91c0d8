use axum::{middleware, routing::get, routing::post, routing::put, Router};
use axum_prometheus::metrics_exporter_prometheus::PrometheusHandle;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use payvault_core::rate_limiter::login_rate_limit_middleware;
use payvault_core::request_meta::request_meta_middleware;
use payvault_core::security::SecurityConfig;
use payvault_core::AppState;

use crate::config::swagger_config::ApiDoc;
use crate::handlers::{
    assign_role::assign_role, cancel_reserve::cancel_reserve, change_avatar::change_avatar,
    change_email::change_email, change_password::change_password,
    change_username::change_username, commit_reserve::commit_reserve, devices::devices,
    get_balance::get_balance, health::health_check, list_transactions::list_transactions,
    login::login, logout::logout, refresh_token::refresh_token, register::register,
    reserve::reserve, telegram_login::telegram_login, validate_token::validate_token,
};

pub fn create_router(
    state: Arc<AppState>,
    metric_layer: PrometheusMetricLayer<'static>,
    metric_handle: PrometheusHandle,
) -> Router {
    let router = Router::new()
        .merge(create_public_routes(&state, metric_handle))
        .merge(create_secured_routes(&state))
        // pipeline composes inside-out: meta first, metrics around everything
        .layer(metric_layer)
        .layer(middleware::from_fn(request_meta_middleware));

    router.with_state(state)
}

fn create_public_routes(
    state: &Arc<AppState>,
    metric_handle: PrometheusHandle,
) -> Router<Arc<AppState>> {
    // the allow-list: token-free methods
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(create_login_route(state))
        .route("/api/auth/register", post(register))
        .route("/api/auth/refresh", post(refresh_token))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/telegram", post(telegram_login))
        .route("/api/health", get(health_check))
        .route("/metrics", get(|| async move { metric_handle.render() }))
}

/// Login is the only rate-limited method: a redis-backed attempt budget with
/// temporary IP blocking, plus a token bucket (one replenish per 20 s, burst
/// 3, i.e. 3/minute).
fn create_login_route(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let mut router = Router::new()
        .route("/api/auth/login", post(login))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            login_rate_limit_middleware,
        ));

    // the governor needs a peer address; axum-test serves without one
    if std::env::var("APP_ENV").unwrap_or_default() != "test" {
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .per_second(state.config.rate_limit.login_replenish.as_secs())
                .burst_size(state.config.rate_limit.login_burst)
                .finish()
                .expect("governor configuration is static and valid"),
        );
        router = router.layer(GovernorLayer {
            config: governor_conf,
        });
    }

    router
}

fn create_secured_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/devices/{user_id}", get(devices))
        .route("/api/user/validate", get(validate_token))
        .route("/api/user/role", post(assign_role))
        .route("/api/user/avatar", put(change_avatar))
        .route("/api/user/username", put(change_username))
        .route("/api/user/email", put(change_email))
        .route("/api/user/password", put(change_password))
        .route("/api/wallet/balance", get(get_balance))
        .route("/api/wallet/reserve", post(reserve))
        .route("/api/wallet/commit", post(commit_reserve))
        .route("/api/wallet/cancel", post(cancel_reserve))
        .route("/api/wallet/transactions", get(list_transactions))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            SecurityConfig::auth_middleware,
        ))
}
