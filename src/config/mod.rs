use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000"). Optional for worker processes.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Redis connection string for the job queue and result store
    pub redis_url: String,

    /// Base URL of the extraction engine inference service
    pub engine_url: String,

    /// Seconds a job result stays readable after its last write
    #[serde(default = "default_result_ttl_secs")]
    pub result_ttl_secs: u64,

    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_result_ttl_secs() -> u64 {
    3600
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_applied_when_unset() {
        let config: AppConfig = envy::from_iter(vec![
            ("REDIS_URL".to_string(), "redis://localhost:6379/0".to_string()),
            ("ENGINE_URL".to_string(), "http://localhost:8001".to_string()),
        ])
        .expect("config should parse with only required vars");

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.result_ttl_secs, 3600);
        assert_eq!(config.max_upload_bytes, 25 * 1024 * 1024);
    }
}
