use std::env;

use crate::services::merge_service::MergeConsistency;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub profile: String,
    pub merge_consistency: MergeConsistency,
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let profile = env::var("PROFILE").unwrap_or_else(|_| "default".to_string());

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            if profile == "default" {
                "sqlite://frontdesk.db?mode=rwc".to_string()
            } else {
                format!("sqlite://frontdesk_{}.db?mode=rwc", profile)
            }
        });

        let merge_consistency = match env::var("MERGE_CONSISTENCY") {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                tracing::warn!("{}; falling back to compensating merges", e);
                MergeConsistency::Compensating
            }),
            Err(_) => MergeConsistency::Compensating,
        };

        Self {
            database_url,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(Vec::new),
            profile,
            merge_consistency,
            seed_demo: env::var("SEED_DEMO").is_ok(),
        }
    }
}
