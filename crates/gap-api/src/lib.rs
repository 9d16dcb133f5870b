use std::env;
use std::net::{IpAddr, SocketAddr};
use std::num::{NonZeroU32, NonZeroUsize};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::DefaultBodyLimit,
    extract::State,
    extract::connect_info::ConnectInfo,
    http::Method,
    http::Request,
    http::header::{CONTENT_TYPE, HeaderName, HeaderValue},
    middleware,
    middleware::Next,
    response::Response,
    routing::{get, post},
};
use clap::Parser;
use dotenvy::dotenv;
use gap_common::config::EngineConfig;
use gap_common::corpus::Corpus;
use gap_common::matching::OpportunityEngine;
use governor::{
    Quota, RateLimiter, clock::DefaultClock, middleware::NoOpMiddleware,
    state::keyed::DashMapStateStore,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

pub mod auth;
pub mod cache;
pub mod error;
pub mod handlers;

use auth::{AuthConfig, AuthMode};
use cache::ScoreCache;
use error::ApiError;
use gap_common::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use handlers::{gap, health, score, stats};

const SHUTDOWN_DRAIN_GRACE: Duration = Duration::from_millis(200);
const METRICS_DEFAULT_PORT: u16 = 9105;

#[derive(Debug, Clone, Parser)]
#[command(name = "gap-api", about = "HTTP API for gap detection and opportunity scoring")]
struct Cli {
    /// Server port
    #[arg(long, env = "PORT", default_value_t = 3001)]
    port: u16,

    /// API key for X-API-Key authentication
    #[arg(long, env = "GAP_API_KEY")]
    api_key: Option<String>,

    /// Authentication mode: none | api_key
    #[arg(long, env = "AUTH_MODE", default_value = "api_key", value_enum)]
    auth_mode: AuthMode,

    /// Comma separated list of allowed CORS origins
    #[arg(long, env = "GAP_CORS_ORIGINS", default_value = "http://localhost:3000")]
    cors_origins: String,

    /// JSON array of reference entities; the corpus is empty when unset
    #[arg(long, env = "GAP_CORPUS_PATH")]
    corpus_path: Option<PathBuf>,

    /// Maximum number of cached score responses
    #[arg(long, env = "GAP_CACHE_CAPACITY", default_value_t = 512)]
    cache_capacity: usize,

    /// Seconds a cached score stays valid (0 disables the cache)
    #[arg(long, env = "GAP_CACHE_TTL_SECS", default_value_t = 300)]
    cache_ttl_secs: u64,

    /// Start the Prometheus exporter on GAP_METRICS_PORT
    #[arg(long, env = "GAP_METRICS", default_value = "false")]
    metrics: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub auth: AuthConfig,
    pub corpus_path: Option<PathBuf>,
    pub cache_capacity: NonZeroUsize,
    pub cache_ttl: Duration,
    pub metrics: bool,
}

type IpRateLimiter = RateLimiter<IpAddr, DashMapStateStore<IpAddr>, DefaultClock, NoOpMiddleware>;

#[derive(Clone)]
pub struct RateLimits {
    global: Arc<IpRateLimiter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub per_sec: u64,
    pub burst: u32,
}

impl RateLimitConfig {
    fn parse_env<T: std::str::FromStr + PartialOrd + Default>(var: &str) -> Option<T> {
        env::var(var)
            .ok()
            .and_then(|value| value.trim().parse::<T>().ok())
            .filter(|value| *value > T::default())
    }

    fn from_env() -> Self {
        Self {
            per_sec: Self::parse_env("GAP_RATE_LIMIT_PER_SEC").unwrap_or(20),
            burst: Self::parse_env("GAP_RATE_LIMIT_BURST").unwrap_or(40),
        }
    }
}

impl AppConfig {
    fn from_cli(cli: Cli) -> Result<Self, ApiError> {
        let cors_origins = cli
            .cors_origins
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect::<Vec<_>>();

        if cors_origins.iter().any(|origin| origin == "*") {
            return Err(ApiError::BadRequest(
                "GAP_CORS_ORIGINS must list explicit origins".into(),
            ));
        }

        let auth = AuthConfig {
            mode: cli.auth_mode,
            api_key: cli.api_key.filter(|key| !key.trim().is_empty()),
        };

        if auth.mode == AuthMode::ApiKey && auth.api_key.is_none() {
            return Err(ApiError::BadRequest(
                "GAP_API_KEY is required when AUTH_MODE=api_key".into(),
            ));
        }

        let cache_capacity = NonZeroUsize::new(cli.cache_capacity).ok_or_else(|| {
            ApiError::BadRequest("GAP_CACHE_CAPACITY must be positive".into())
        })?;

        Ok(Self {
            port: cli.port,
            cors_origins,
            auth,
            corpus_path: cli.corpus_path,
            cache_capacity,
            cache_ttl: Duration::from_secs(cli.cache_ttl_secs),
            metrics: cli.metrics,
        })
    }

    pub fn for_tests(auth: AuthConfig) -> Self {
        Self {
            port: 3001,
            cors_origins: vec!["http://localhost:3000".into()],
            auth,
            corpus_path: None,
            cache_capacity: NonZeroUsize::MIN.saturating_add(63),
            cache_ttl: Duration::from_secs(300),
            metrics: false,
        }
    }
}

pub struct AppState {
    pub engine: OpportunityEngine,
    pub corpus: Arc<Corpus>,
    pub config: AppConfig,
    pub cache: ScoreCache,
    pub(crate) rate_limits: RateLimits,
    pub readiness: Arc<AtomicBool>,
}

pub type SharedState = Arc<AppState>;

impl axum::extract::FromRef<SharedState> for AuthConfig {
    fn from_ref(input: &SharedState) -> AuthConfig {
        input.config.auth.clone()
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static("x-api-key")])
}

fn build_ip_limiter(per_second: u64, burst_size: u32) -> Arc<IpRateLimiter> {
    let nanos_per_token = 1_000_000_000u64 / per_second.max(1);
    let burst = NonZeroU32::new(burst_size).unwrap_or(NonZeroU32::MIN);
    let quota = Quota::with_period(Duration::from_nanos(nanos_per_token.max(1)))
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst);

    Arc::new(RateLimiter::keyed(quota))
}

pub fn default_rate_limits() -> RateLimits {
    let cfg = RateLimitConfig::from_env();
    RateLimits {
        global: build_ip_limiter(cfg.per_sec, cfg.burst),
    }
}

fn request_ip<B>(req: &Request<B>) -> Option<IpAddr> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip())
}

fn enforce_rate_limit(limiter: &IpRateLimiter, ip: Option<IpAddr>) -> Result<(), ApiError> {
    if let Some(client_ip) = ip {
        if limiter.check_key(&client_ip).is_err() {
            return Err(ApiError::TooManyRequests("rate limit exceeded".into()));
        }
    }

    Ok(())
}

async fn global_rate_limit(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    enforce_rate_limit(&state.rate_limits.global, request_ip(&req))?;
    Ok(next.run(req).await)
}

async fn attach_request_id_context(req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    Ok(error::with_request_id(request_id, next.run(req)).await)
}

pub fn create_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_header = request_id_header.clone();

    let trace = TraceLayer::new_for_http().make_span_with(move |request: &Request<Body>| {
        let request_id = request
            .headers()
            .get(&trace_header)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("");

        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
            status = tracing::field::Empty,
        )
    });

    let api_routes = Router::new()
        .route("/gap-detect", post(gap::detect_gap))
        .route("/score", post(score::score))
        .route("/score/batch", post(score::score_batch))
        .route("/stats", get(stats::stats));

    Router::new()
        .route("/health", get(health::readyz))
        .route("/livez", get(health::livez))
        .route("/readyz", get(health::readyz))
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            global_rate_limit,
        ))
        .layer(middleware::from_fn(attach_request_id_context))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(trace)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(
            request_id_header,
            MakeRequestUuid,
        ))
        .layer(cors)
        .with_state(state)
}

fn build_state(engine: OpportunityEngine, corpus: Corpus, config: AppConfig) -> SharedState {
    Arc::new(AppState {
        engine,
        corpus: Arc::new(corpus),
        cache: ScoreCache::new(config.cache_capacity, config.cache_ttl),
        config,
        rate_limits: default_rate_limits(),
        readiness: Arc::new(AtomicBool::new(true)),
    })
}

/// State with default engine settings, an empty corpus and API key auth.
pub fn test_state(api_key: &str) -> SharedState {
    test_state_with_corpus(api_key, Corpus::empty())
}

pub fn test_state_with_corpus(api_key: &str, corpus: Corpus) -> SharedState {
    let auth = AuthConfig {
        mode: AuthMode::ApiKey,
        api_key: Some(api_key.to_string()),
    };

    build_state(
        OpportunityEngine::default(),
        corpus,
        AppConfig::for_tests(auth),
    )
}

fn load_corpus(path: Option<&PathBuf>) -> Result<Corpus, ApiError> {
    match path {
        Some(path) => Ok(Corpus::from_json_file(path)?),
        None => {
            warn!("GAP_CORPUS_PATH not set; serving with an empty reference corpus");
            Ok(Corpus::empty())
        }
    }
}

pub async fn run() -> Result<(), ApiError> {
    dotenv().ok();
    init_tracing_subscriber(env!("CARGO_PKG_NAME"));
    install_tracing_panic_hook(env!("CARGO_PKG_NAME"));

    let cli = Cli::parse();
    let config = AppConfig::from_cli(cli)?;

    if config.metrics {
        gap_metrics::init_metrics("GAP_METRICS_PORT", METRICS_DEFAULT_PORT);
    }

    let engine_config = EngineConfig::from_env()?;
    let corpus = load_corpus(config.corpus_path.as_ref())?;
    let state = build_state(OpportunityEngine::new(engine_config), corpus, config.clone());

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    let app = create_router(state.clone());

    info!(
        %addr,
        auth_mode = ?config.auth.mode,
        corpus_entities = state.corpus.len(),
        corpus_version = state.corpus.version(),
        "gap-api listening"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    let service = app.into_make_service_with_connect_info::<SocketAddr>();

    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    Ok(())
}

async fn shutdown_signal(state: SharedState) {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
            let _ = sigterm.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    state.readiness.store(false, Ordering::SeqCst);

    // readyz reports unavailable for this window before the listener closes
    tokio::time::sleep(SHUTDOWN_DRAIN_GRACE).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::sync::Mutex;
    use tower::ServiceExt;

    static ENV_GUARD: Mutex<()> = Mutex::new(());

    fn with_envs(vars: &[(&str, Option<&str>)], f: impl FnOnce()) {
        let _guard = ENV_GUARD.lock().unwrap();

        let previous: Vec<(&str, Option<String>)> = vars
            .iter()
            .map(|(var, value)| {
                let old = env::var(var).ok();
                match value {
                    Some(v) => unsafe { env::set_var(var, v) },
                    None => unsafe { env::remove_var(var) },
                }
                (*var, old)
            })
            .collect();

        f();

        for (var, previous_value) in previous {
            match previous_value {
                Some(v) => unsafe { env::set_var(var, v) },
                None => unsafe { env::remove_var(var) },
            }
        }
    }

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["gap-api"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[tokio::test]
    async fn sets_request_id_when_missing() {
        let app = create_router(test_state("test-key"));

        let response = app
            .oneshot(Request::builder().uri("/livez").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[test]
    fn rate_limit_config_respects_env_overrides() {
        with_envs(
            &[
                ("GAP_RATE_LIMIT_PER_SEC", Some("10")),
                ("GAP_RATE_LIMIT_BURST", Some("25")),
            ],
            || {
                assert_eq!(
                    RateLimitConfig::from_env(),
                    RateLimitConfig {
                        per_sec: 10,
                        burst: 25,
                    }
                );
            },
        );
    }

    #[test]
    fn rate_limit_config_ignores_zero_and_garbage() {
        with_envs(
            &[
                ("GAP_RATE_LIMIT_PER_SEC", Some("0")),
                ("GAP_RATE_LIMIT_BURST", Some("lots")),
            ],
            || {
                assert_eq!(
                    RateLimitConfig::from_env(),
                    RateLimitConfig {
                        per_sec: 20,
                        burst: 40,
                    }
                );
            },
        );
    }

    #[test]
    fn limiter_rejects_after_burst() {
        let limiter = build_ip_limiter(1, 2);
        let ip: IpAddr = [127, 0, 0, 1].into();
        assert!(enforce_rate_limit(&limiter, Some(ip)).is_ok());
        assert!(enforce_rate_limit(&limiter, Some(ip)).is_ok());
        assert!(matches!(
            enforce_rate_limit(&limiter, Some(ip)),
            Err(ApiError::TooManyRequests(_))
        ));
        assert!(enforce_rate_limit(&limiter, None).is_ok());
    }

    #[test]
    fn api_key_mode_requires_key() {
        with_envs(&[("GAP_API_KEY", None), ("AUTH_MODE", None)], || {
            let result = AppConfig::from_cli(cli(&[]));
            assert!(matches!(result, Err(ApiError::BadRequest(msg)) if msg.contains("GAP_API_KEY")));

            let config = AppConfig::from_cli(cli(&["--auth-mode", "none"])).unwrap();
            assert_eq!(config.auth.mode, AuthMode::None);
        });
    }

    #[test]
    fn rejects_wildcard_cors_and_zero_cache() {
        with_envs(&[("GAP_CORS_ORIGINS", None), ("GAP_CACHE_CAPACITY", None)], || {
            assert!(AppConfig::from_cli(cli(&["--api-key", "k", "--cors-origins", "*"])).is_err());
            assert!(AppConfig::from_cli(cli(&["--api-key", "k", "--cache-capacity", "0"])).is_err());

            let config = AppConfig::from_cli(cli(&[
                "--api-key",
                "k",
                "--cors-origins",
                "http://a.test, http://b.test",
            ]))
            .unwrap();
            assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
            assert_eq!(config.cache_capacity.get(), 512);
            assert_eq!(config.cache_ttl, Duration::from_secs(300));
        });
    }
}
