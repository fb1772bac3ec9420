/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, CORS 許可、Auth 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - Auth 関連は AuthConfig にまとめ、AuthService へ参照で渡す
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

/// Mount point of the API. Route policy never sees it (suffix matching).
pub const API_PREFIX: &str = "/api/v2";

const DEFAULT_PUBLIC_ROUTES: &str = "/auth/signup,/auth/logout,/health";

const DEFAULT_TOKEN_TTL_SECONDS: u64 = 86_400; // 1 day
const MAX_TOKEN_TTL_SECONDS: u64 = 365 * 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings consumed by `AuthService`.
#[derive(Clone)]
pub struct AuthConfig {
    // Unset means "not configured": protected routes fail closed.
    pub jwt_secret: Option<String>,
    pub leeway_seconds: u64,
    pub token_ttl_seconds: u64,
    pub public_routes: Vec<String>,
    pub default_limit_workflows: u32,
    pub default_limit_nodes: u32,
    // `Secure` attribute on the auth cookie
    pub secure_cookies: bool,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("leeway_seconds", &self.leeway_seconds)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("public_routes", &self.public_routes)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: Option<String>,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub request_timeout_seconds: u64,
    pub body_limit_bytes: usize,

    pub auth: AuthConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = comma_list(&std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let request_timeout_seconds = env_parse("REQUEST_TIMEOUT_SECONDS", 30);
        let body_limit_bytes = env_parse("BODY_LIMIT_BYTES", 1024 * 1024);

        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        let leeway_seconds = env_parse("ACCESS_TOKEN_LEEWAY_SECONDS", 0);
        let token_ttl_seconds =
            parse_token_ttl(std::env::var("ACCESS_TOKEN_TTL_SECONDS").ok().as_deref())?;

        let public_routes = comma_list(
            &std::env::var("PUBLIC_ROUTES").unwrap_or_else(|_| DEFAULT_PUBLIC_ROUTES.to_string()),
        );

        let default_limit_workflows = env_parse("DEFAULT_LIMIT_WORKFLOWS", 10);
        let default_limit_nodes = env_parse("DEFAULT_LIMIT_NODES", 50);

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            request_timeout_seconds,
            body_limit_bytes,
            auth: AuthConfig {
                jwt_secret,
                leeway_seconds,
                token_ttl_seconds,
                public_routes,
                default_limit_workflows,
                default_limit_nodes,
                secure_cookies: app_env.is_production(),
            },
        })
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Unset means the default; anything else must be a whole number of seconds
/// in `1..=MAX_TOKEN_TTL_SECONDS` so `iat + ttl` always fits an `i64`.
fn parse_token_ttl(raw: Option<&str>) -> Result<u64, ConfigError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_TOKEN_TTL_SECONDS);
    };

    raw.parse::<u64>()
        .ok()
        .filter(|ttl| (1..=MAX_TOKEN_TTL_SECONDS).contains(ttl))
        .filter(|ttl| i64::try_from(*ttl).is_ok())
        .ok_or(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"))
}

fn comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
