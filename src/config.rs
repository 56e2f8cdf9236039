use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_path: String,
    /// The single frontend origin allowed to make credentialed requests
    pub frontend_origin: String,
    pub environment: String,
    pub log_requests: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8787".to_string())
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/flashcards.redb".to_string());

        let frontend_origin = env::var("FRONTEND_ORIGIN_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        if frontend_origin.is_empty() {
            return Err("FRONTEND_ORIGIN_URL must not be empty".to_string());
        }

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let log_requests = env::var("LOG_REQUESTS")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .map_err(|_| "Invalid LOG_REQUESTS (expected true or false)")?;

        Ok(Config {
            server_host,
            server_port,
            database_path,
            frontend_origin,
            environment,
            log_requests,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
