use anyhow::Context;
use serde::Deserialize;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 2323;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// TCP port to listen on, bound on all addresses.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Config {
    /// Loads configuration.
    ///
    /// Precedence: YAML file named by `HTTPD_CONFIG`, then the `HTTPD_PORT`
    /// environment variable, then [`DEFAULT_PORT`].
    pub fn load() -> anyhow::Result<Self> {
        if let Ok(path) = std::env::var("HTTPD_CONFIG") {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {path}"))?;
            let cfg = serde_yaml::from_str(&text)
                .with_context(|| format!("parsing config file {path}"))?;
            return Ok(cfg);
        }

        let port = match std::env::var("HTTPD_PORT") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("HTTPD_PORT is not a valid port: {value:?}"))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self { port })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}
