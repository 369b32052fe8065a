use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// HMAC secret for signing session tokens.
    pub session_secret: String,
    /// Session token lifetime in hours. Default: 24.
    pub session_ttl_hours: i64,
    /// Hard cap on the public feedback listing. Default: 50.
    pub feedback_list_cap: i64,
}

const PLACEHOLDER_SECRET: &str = "CHANGE_ME_SESSION_SECRET";

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let session_secret = std::env::var("MEALBRIDGE_SESSION_SECRET")
        .unwrap_or_else(|_| PLACEHOLDER_SECRET.into());

    if session_secret == PLACEHOLDER_SECRET {
        let env_mode = std::env::var("MEALBRIDGE_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default();
        if env_mode == "production" {
            anyhow::bail!(
                "MEALBRIDGE_SESSION_SECRET is still the insecure placeholder. \
                 Set a proper random secret before running in production."
            );
        }
        eprintln!("⚠️  MEALBRIDGE_SESSION_SECRET is not set — using insecure placeholder. Set a random secret for production.");
    }

    Ok(Config {
        port: std::env::var("MEALBRIDGE_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .unwrap_or(8080),
        database_url: std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/mealbridge".into()),
        session_secret,
        session_ttl_hours: std::env::var("MEALBRIDGE_SESSION_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(24),
        feedback_list_cap: std::env::var("MEALBRIDGE_FEEDBACK_CAP")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(50),
    })
}
