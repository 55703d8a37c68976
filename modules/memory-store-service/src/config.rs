use memory_store_types::DEFAULT_LIST_LIMIT;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub default_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9104,
            db_path: "./memory.db".to_string(),
            default_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("MEMORY_STORE_HOST").unwrap_or(defaults.host),
            port: parse_var("MEMORY_STORE_PORT", defaults.port),
            db_path: env::var("MEMORY_STORE_DB_PATH").unwrap_or(defaults.db_path),
            default_limit: parse_var("MEMORY_STORE_DEFAULT_LIMIT", defaults.default_limit),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("{} has invalid value {:?}, using default", name, raw);
            default
        }),
        Err(_) => default,
    }
}
