use anyhow::{Context, Result, bail};
use config::{Config, File, FileFormat};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::net::Ipv6Addr;
use std::path::Path;

/// Credential file used when none is given on the command line
pub const DEFAULT_CREDENTIAL_FILE: &str = "api_credentials.json";

/// Port the Proxmox VE API listens on
pub const DEFAULT_API_PORT: u16 = 8006;

#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Credentials {
    /// Hostname or IP of any cluster node
    pub host: String,

    /// API user including realm, eg. `root@pam`
    pub username: String,

    pub password: String,

    /// API port, defaults to 8006
    pub port: Option<u16>,

    /// Verify the API TLS certificate, off by default since clusters
    /// usually run with self-signed certificates
    #[serde(default)]
    pub verify_tls: bool,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

impl Credentials {
    /// Load credentials from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let creds: Credentials = Config::builder()
            .add_source(File::from(path).format(FileFormat::Json))
            .build()
            .with_context(|| format!("Failed to read credentials from {}", path.display()))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse credentials in {}", path.display()))?;
        creds
            .validate()
            .with_context(|| format!("Invalid credentials in {}", path.display()))?;
        Ok(creds)
    }

    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            bail!("host is empty");
        }
        if self.username.trim().is_empty() {
            bail!("username is empty");
        }
        if self.password.is_empty() {
            bail!("password is empty");
        }
        Ok(())
    }

    /// Base url of the API, `https://{host}:{port}/`
    pub fn api_base(&self) -> Result<Url> {
        let port = self.port.unwrap_or(DEFAULT_API_PORT);
        let host = self.host.trim();
        let url = if host.parse::<Ipv6Addr>().is_ok() {
            format!("https://[{}]:{}/", host, port)
        } else {
            format!("https://{}:{}/", host, port)
        };
        url.parse()
            .with_context(|| format!("Invalid API host {}", self.host))
    }
}
