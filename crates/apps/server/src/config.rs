use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_ADDR: &str = "127.0.0.1:9200";

#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// JSON array of `{ iata, name, lat, lon }`; the built-in table is used
    /// when unset.
    pub airports_path: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let raw_addr = var("AIRPORTS_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw_addr
            .parse()
            .map_err(|e| format!("invalid AIRPORTS_ADDR {raw_addr:?}: {e}"))?;
        let airports_path = var("AIRPORTS_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);
        Ok(Self {
            addr,
            airports_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ServerConfig;
    use std::path::PathBuf;

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.addr.to_string(), "127.0.0.1:9200");
        assert_eq!(config.airports_path, None);
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_lookup(|key| match key {
            "AIRPORTS_ADDR" => Some("0.0.0.0:8080".into()),
            "AIRPORTS_PATH" => Some("/data/airports.json".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(
            config.airports_path,
            Some(PathBuf::from("/data/airports.json"))
        );
    }

    #[test]
    fn rejects_bad_addr() {
        let err = ServerConfig::from_lookup(|key| {
            (key == "AIRPORTS_ADDR").then(|| "not-an-addr".to_string())
        })
        .unwrap_err();
        assert!(err.contains("AIRPORTS_ADDR"));
    }
}
