/// Configuration management for the API server
///
/// Configuration is read once at startup from the process environment (after
/// loading a `.env` file if present) and shared immutably as `Arc<Config>`.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `PORT` / `API_PORT`: Port to bind to (default: 3000)
/// - `DATABASE_URL`: PostgreSQL connection string, or the parts
///   `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for JWT signing (required, at least 32 chars)
/// - `JWT_EXPIRES_IN`: Token lifetime such as `7d`, `24h`, `30m` or plain
///   seconds (default: 7d)
/// - `PASSWORD_MEMORY_KIB`, `PASSWORD_ITERATIONS`, `PASSWORD_PARALLELISM`:
///   Argon2 cost (defaults: 65536, 3, 4)
/// - `CORS_ORIGINS`: Comma-separated origins, `*` for any (default: *)
/// - `PRODUCTION`: Enables HSTS (default: false)
/// - `STATIC_DIR`: Directory served for non-API paths (default: public)
/// - `RUN_MIGRATIONS`: Apply migrations at startup (default: true)
///
/// # Example
///
/// ```no_run
/// use taskhub_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use std::env;
use taskhub_shared::auth::password::PasswordParams;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_JWT_EXPIRES_IN: &str = "7d";

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Production mode adds HSTS
    pub production: bool,

    /// Browser client directory, served as the router fallback if it exists
    pub static_dir: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HS256 signing secret
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Token lifetime in seconds
    pub expires_in_seconds: i64,
}

impl JwtConfig {
    pub fn expires_in(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.expires_in_seconds)
    }
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        let params = PasswordParams::default();
        Self {
            memory_kib: params.memory_kib,
            iterations: params.iterations,
            parallelism: params.parallelism,
        }
    }
}

impl PasswordConfig {
    pub fn params(&self) -> PasswordParams {
        PasswordParams {
            memory_kib: self.memory_kib,
            iterations: self.iterations,
            parallelism: self.parallelism,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does not
    /// parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match var("PORT").or_else(|| var("API_PORT")) {
            Some(port) => port.parse::<u16>().context("PORT must be a valid port number")?,
            None => DEFAULT_PORT,
        };

        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let production = parse_bool(var("PRODUCTION"), false)?;
        let static_dir = var("STATIC_DIR").unwrap_or_else(|| "public".to_string());

        let database_url = match var("DATABASE_URL") {
            Some(url) => url,
            None => database_url_from_parts(&var)?,
        };

        let max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value
                .parse::<u32>()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            None => 10,
        };

        let run_migrations = parse_bool(var("RUN_MIGRATIONS"), true)?;

        let jwt_secret = var("JWT_SECRET").context("JWT_SECRET environment variable is required")?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let expires_in = var("JWT_EXPIRES_IN").unwrap_or_else(|| DEFAULT_JWT_EXPIRES_IN.to_string());
        let expires_in_seconds = parse_duration(&expires_in)?;
        if chrono::Utc::now()
            .checked_add_signed(chrono::Duration::seconds(expires_in_seconds))
            .is_none()
        {
            anyhow::bail!("JWT_EXPIRES_IN '{}' is too far in the future", expires_in);
        }

        let defaults = PasswordConfig::default();
        let password = PasswordConfig {
            memory_kib: parse_number(var("PASSWORD_MEMORY_KIB"), defaults.memory_kib, "PASSWORD_MEMORY_KIB")?,
            iterations: parse_number(var("PASSWORD_ITERATIONS"), defaults.iterations, "PASSWORD_ITERATIONS")?,
            parallelism: parse_number(var("PASSWORD_PARALLELISM"), defaults.parallelism, "PASSWORD_PARALLELISM")?,
        };
        password
            .params()
            .to_argon2()
            .context("PASSWORD_MEMORY_KIB, PASSWORD_ITERATIONS and PASSWORD_PARALLELISM must form valid Argon2 parameters")?;

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
                static_dir,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                run_migrations,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                expires_in_seconds,
            },
            password,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn database_url_from_parts<F>(var: &F) -> anyhow::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let name = var("DB_NAME")
        .context("DATABASE_URL or DB_NAME environment variable is required")?;
    let host = var("DB_HOST").unwrap_or_else(|| "localhost".to_string());
    let port = var("DB_PORT").unwrap_or_else(|| "5432".to_string());
    let user = var("DB_USER").unwrap_or_else(|| "postgres".to_string());

    Ok(match var("DB_PASSWORD") {
        Some(password) => format!("postgresql://{}:{}@{}:{}/{}", user, password, host, port, name),
        None => format!("postgresql://{}@{}:{}/{}", user, host, port, name),
    })
}

fn parse_bool(value: Option<String>, default: bool) -> anyhow::Result<bool> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => anyhow::bail!("Invalid boolean value '{}'", other),
    }
}

fn parse_number(value: Option<String>, default: u32, key: &str) -> anyhow::Result<u32> {
    match value {
        Some(value) => value
            .parse::<u32>()
            .with_context(|| format!("{} must be a positive integer", key)),
        None => Ok(default),
    }
}

/// Parses a lifetime like `7d`, `24h`, `30m`, `45s` or `3600` into seconds
pub fn parse_duration(value: &str) -> anyhow::Result<i64> {
    let value = value.trim();
    let (digits, multiplier) = match value.char_indices().last() {
        Some((i, 'd')) => (&value[..i], 86_400),
        Some((i, 'h')) => (&value[..i], 3_600),
        Some((i, 'm')) => (&value[..i], 60),
        Some((i, 's')) => (&value[..i], 1),
        _ => (value, 1),
    };

    let amount = digits
        .parse::<i64>()
        .with_context(|| format!("Invalid duration '{}'", value))?;

    if amount <= 0 {
        anyhow::bail!("Duration '{}' must be positive", value);
    }

    amount
        .checked_mul(multiplier)
        .filter(|seconds| chrono::Duration::try_seconds(*seconds).is_some())
        .with_context(|| format!("Duration '{}' is out of range", value))
}
