use std::env;

pub const DEFAULT_SERVICE_NAME: &str = "paddock-journal";

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub photo_bucket: String,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| format!("PORT must be a valid port number, got '{}'", raw))?,
            Err(_) => 8000,
        };

        Ok(Self {
            supabase_url: env::var("SUPABASE_URL")
                .map_err(|_| "SUPABASE_URL is required")?
                .trim_end_matches('/')
                .to_string(),
            supabase_anon_key: env::var("SUPABASE_ANON_KEY")
                .map_err(|_| "SUPABASE_ANON_KEY is required")?,
            jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .map_err(|_| "SUPABASE_JWT_SECRET is required")?,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            photo_bucket: env::var("PHOTO_BUCKET").unwrap_or_else(|_| "moment-photos".to_string()),
        })
    }
}

/// Name reported in every response envelope
pub fn service_name() -> String {
    env::var("SERVICE_NAME").unwrap_or_else(|_| DEFAULT_SERVICE_NAME.to_string())
}
