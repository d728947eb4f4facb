use std::{env, fs, net::SocketAddr, path::Path};

use crate::{errors::Error, Result};

/// Typed configuration for the surrounding process.
///
/// Everything the core needs is environment-driven; a `.env` file next to the
/// binary is honored but never overrides the real environment.
#[derive(Clone, Debug)]
pub struct Config {
    /// Bind address for the internal HTTP surface.
    pub http_addr: SocketAddr,
    /// Public domains under which short links are served; the first entry is
    /// used when rendering full short URLs. Empty means replies carry the
    /// bare code only.
    pub public_domains: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let http_addr = parse_http_addr(env_str("SENTINEL_HTTP_ADDR"))?;
        let public_domains = parse_csv(env_str("SENTINEL_PUBLIC_DOMAINS"));

        Ok(Self {
            http_addr,
            public_domains,
        })
    }

    /// First configured public domain, if any.
    pub fn public_base_url(&self) -> Option<&str> {
        self.public_domains.first().map(String::as_str)
    }
}

fn parse_http_addr(v: Option<String>) -> Result<SocketAddr> {
    let raw = v.unwrap_or_else(|| "0.0.0.0:5000".to_string());
    raw.trim()
        .parse::<SocketAddr>()
        .map_err(|_| Error::Config(format!("invalid SENTINEL_HTTP_ADDR: {raw}")))
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn parse_csv(v: Option<String>) -> Vec<String> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
