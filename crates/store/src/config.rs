//! Store configuration types.

use serde::Deserialize;

/// Configuration for the object store.
///
/// Every field is optional in every source and falls back to the local
/// MinIO development defaults, so a bare `StoreConfig::default()` talks to
/// `minio` started with its stock credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Bucket that hosts uploaded media.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Endpoint URL of the S3-compatible service. Also the base of every
    /// public object URL this store hands out.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Region sent with each request; MinIO accepts any value.
    #[serde(default = "default_region")]
    pub region: String,
    /// Access key ID.
    #[serde(default = "default_access_key")]
    pub access_key: String,
    /// Secret access key.
    #[serde(default = "default_secret_key")]
    pub secret_key: String,
    /// Address the bucket in the URL path rather than as a subdomain.
    /// Required by MinIO and most self-hosted S3-compatible services.
    #[serde(default = "default_path_style")]
    pub path_style: bool,
}

fn default_bucket() -> String {
    StoreConfig::DEFAULT_BUCKET.to_string()
}

fn default_endpoint() -> String {
    StoreConfig::DEFAULT_ENDPOINT.to_string()
}

fn default_region() -> String {
    StoreConfig::DEFAULT_REGION.to_string()
}

fn default_access_key() -> String {
    // MinIO stock development credentials
    "minioadmin".to_string()
}

fn default_secret_key() -> String {
    "minioadmin".to_string()
}

fn default_path_style() -> bool {
    true
}

impl StoreConfig {
    /// Default bucket name.
    pub const DEFAULT_BUCKET: &'static str = "posts";
    /// Default endpoint: local MinIO.
    pub const DEFAULT_ENDPOINT: &'static str = "http://localhost:9000";
    /// Default region.
    pub const DEFAULT_REGION: &'static str = "us-east-1";

    /// Set the bucket name.
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Set the endpoint URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set the credential pair.
    #[must_use]
    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = access_key.into();
        self.secret_key = secret_key.into();
        self
    }

    /// Set path-style addressing.
    #[must_use]
    pub fn with_path_style(mut self, path_style: bool) -> Self {
        self.path_style = path_style;
        self
    }

    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones overriding earlier: `config/default`, then
    /// `config/<RUN_MODE>` (both optional), then `GLINT`-prefixed
    /// environment variables (`GLINT__BUCKET`, `GLINT__ENDPOINT`,
    /// `GLINT__REGION`, `GLINT__ACCESS_KEY`, `GLINT__SECRET_KEY`,
    /// `GLINT__PATH_STYLE`). A `.env` file is honored if present.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("GLINT").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            endpoint: default_endpoint(),
            region: default_region(),
            access_key: default_access_key(),
            secret_key: default_secret_key(),
            path_style: default_path_style(),
        }
    }
}
