use asteria_common::env_or;

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        // Unset or unparsable PORT falls back to the default.
        Self {
            port: env_or("PORT", DEFAULT_PORT),
        }
    }
}
