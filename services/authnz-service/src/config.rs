use anyhow::{Context, Result};
use authnz_jwt::config::{
    DIRECTIVE_CLAIM_NAME, DIRECTIVE_COOKIE_NAME, DIRECTIVE_KEY, DIRECTIVE_VERIFY_MODE,
};
use authnz_jwt::{DirConfig, GATE_HANDLER};
use std::env;
use std::net::{IpAddr, SocketAddr};

/// Environment variable feeding each directive of the configured location.
const DIRECTIVE_ENV: &[(&str, &str)] = &[
    (DIRECTIVE_KEY, "AUTHNZ_KEY"),
    (DIRECTIVE_COOKIE_NAME, "AUTHNZ_COOKIE_NAME"),
    (DIRECTIVE_CLAIM_NAME, "AUTHNZ_CLAIM_NAME"),
    (DIRECTIVE_VERIFY_MODE, "AUTHNZ_VERIFY_MODE"),
];

/// A path prefix with the handler it is routed to and its directives.
#[derive(Debug, Clone)]
pub struct LocationConfig {
    pub prefix: String,
    pub handler: Option<String>,
    pub dir: DirConfig,
}

impl LocationConfig {
    pub fn new(prefix: impl Into<String>, handler: Option<&str>, dir: DirConfig) -> Self {
        Self {
            prefix: prefix.into(),
            handler: handler.map(str::to_owned),
            dir,
        }
    }

    fn matches(&self, path: &str) -> bool {
        let Some(rest) = path.strip_prefix(self.prefix.as_str()) else {
            return false;
        };
        rest.is_empty() || self.prefix.ends_with('/') || rest.starts_with('/')
    }
}

/// Location table resolved once per request; the longest matching prefix wins.
#[derive(Debug, Clone, Default)]
pub struct Locations {
    entries: Vec<LocationConfig>,
}

impl Locations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, location: LocationConfig) -> Self {
        self.entries.push(location);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resolve(&self, path: &str) -> Option<&LocationConfig> {
        self.entries
            .iter()
            .filter(|location| location.matches(path))
            .max_by_key(|location| location.prefix.len())
    }
}

#[derive(Debug, Clone)]
pub struct AuthnzConfig {
    pub host: String,
    pub port: u16,
    pub locations: Locations,
}

impl AuthnzConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8090);

        let prefix = lookup("AUTHNZ_LOCATION").unwrap_or_else(|| "/".to_string());
        let handler = lookup("AUTHNZ_HANDLER").unwrap_or_else(|| GATE_HANDLER.to_string());

        let mut dir = DirConfig::new();
        for (directive, key) in DIRECTIVE_ENV {
            if let Some(value) = lookup(key) {
                dir.apply_directive(directive, &value)
                    .with_context(|| format!("Failed to apply {key}"))?;
            }
        }

        let locations =
            Locations::new().with_location(LocationConfig::new(prefix, Some(&handler), dir));

        Ok(Self {
            host,
            port,
            locations,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("Invalid HOST '{}'", self.host))?;
        Ok(SocketAddr::from((ip, self.port)))
    }
}
