/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`). Bounds time to
    /// first byte; the generation stream itself is governed by
    /// `generation_budget_secs`.
    pub request_timeout_secs: u64,
    /// Server-side execution budget for one generation run (default: `300`).
    pub generation_budget_secs: u64,
    /// Model gateway connection settings.
    pub gateway: GatewayConfig,
    /// Vector index connection settings. `None` disables furniture
    /// matching for the whole deployment.
    pub vector_index: Option<VectorIndexConfig>,
}

/// Connection settings for the model gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base HTTP URL, e.g. `https://gateway.internal`.
    pub base_url: String,
    /// Bearer token sent with every gateway request.
    pub api_token: String,
}

/// Connection settings for the product vector index.
#[derive(Debug, Clone)]
pub struct VectorIndexConfig {
    /// Qdrant HTTP URL, e.g. `https://host:6333`.
    pub url: String,
    /// Value for the `api-key` header.
    pub api_key: String,
    /// Product collection name.
    pub collection: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `GENERATION_BUDGET_SECS` | `300`                      |
    /// | `GATEWAY_URL`            | `http://localhost:8787`    |
    /// | `GATEWAY_API_TOKEN`      | *(empty)*                  |
    /// | `QDRANT_URL`             | *(unset -- matching off)*   |
    /// | `QDRANT_API_KEY`         | *(empty)*                  |
    /// | `QDRANT_COLLECTION`      | `catalog_products`         |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let generation_budget_secs: u64 = std::env::var("GENERATION_BUDGET_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("GENERATION_BUDGET_SECS must be a valid u64");

        let gateway = GatewayConfig {
            base_url: std::env::var("GATEWAY_URL")
                .unwrap_or_else(|_| "http://localhost:8787".into()),
            api_token: std::env::var("GATEWAY_API_TOKEN").unwrap_or_default(),
        };

        // Furniture matching is an optional collaborator: without an index
        // URL the whole sub-pipeline is off, decided once at startup.
        let vector_index = std::env::var("QDRANT_URL").ok().map(|url| VectorIndexConfig {
            url,
            api_key: std::env::var("QDRANT_API_KEY").unwrap_or_default(),
            collection: std::env::var("QDRANT_COLLECTION")
                .unwrap_or_else(|_| "catalog_products".into()),
        });

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            generation_budget_secs,
            gateway,
            vector_index,
        }
    }
}
