//! Secure connect bundle loading.
//!
//! A bundle is a zip archive produced by the hosting provider. It carries the
//! CQL contact point in `config.json` and the TLS material used for mutual
//! authentication:
//!
//! - `config.json`: `{"host": "...", "port": 29080, "cql_port": 29042, "keyspace": "...", ...}`
//! - `ca.crt`: certificate authority (PEM)
//! - `cert`: client certificate (PEM)
//! - `key`: client private key (PEM)
//!
//! Only direct-contact bundles are supported: the session dials
//! `host:cql_port` with the bundle's TLS identity and no SNI server name.
//! Clusters that sit behind an SNI-routing proxy, discovered through the
//! metadata service on `port`, cannot be reached this way.

use openssl::pkey::PKey;
use openssl::ssl::{SslContext, SslContextBuilder, SslMethod, SslVerifyMode};
use openssl::x509::X509;
use serde::Deserialize;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENTRY: &str = "config.json";
pub const CA_ENTRY: &str = "ca.crt";
pub const CERT_ENTRY: &str = "cert";
pub const KEY_ENTRY: &str = "key";

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Failed to read bundle {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed bundle archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Bundle is missing '{0}'")]
    MissingEntry(String),

    #[error("Invalid bundle config.json: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid TLS material in bundle: {0}")]
    Tls(#[from] openssl::error::ErrorStack),
}

/// Contents of the bundle's `config.json`; unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BundleConfig {
    pub host: String,
    /// Metadata service port of SNI-proxied clusters
    #[serde(default)]
    pub port: Option<u16>,
    pub cql_port: u16,
    #[serde(default)]
    pub keyspace: Option<String>,
    #[serde(default, rename = "localDC")]
    pub local_dc: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SecureBundle {
    pub config: BundleConfig,
    pub ca_cert: Vec<u8>,
    pub client_cert: Vec<u8>,
    pub client_key: Vec<u8>,
}

impl SecureBundle {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BundleError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| BundleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&data)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, BundleError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(data))?;

        let config: BundleConfig = serde_json::from_slice(&read_entry(&mut archive, CONFIG_ENTRY)?)?;

        Ok(Self {
            config,
            ca_cert: read_entry(&mut archive, CA_ENTRY)?,
            client_cert: read_entry(&mut archive, CERT_ENTRY)?,
            client_key: read_entry(&mut archive, KEY_ENTRY)?,
        })
    }

    /// `host:port` of the CQL endpoint.
    pub fn contact_point(&self) -> String {
        format!("{}:{}", self.config.host, self.config.cql_port)
    }

    /// `https://host:port/metadata` when the bundle advertises a metadata
    /// service, which means the cluster expects SNI-routed connections.
    pub fn metadata_url(&self) -> Option<String> {
        self.config
            .port
            .map(|port| format!("https://{}:{}/metadata", self.config.host, port))
    }

    /// TLS context trusting the bundle's CA and presenting its client certificate.
    pub fn ssl_context(&self) -> Result<SslContext, BundleError> {
        let mut builder = SslContextBuilder::new(SslMethod::tls())?;

        let ca = X509::from_pem(&self.ca_cert)?;
        builder.cert_store_mut().add_cert(ca)?;

        let cert = X509::from_pem(&self.client_cert)?;
        builder.set_certificate(&cert)?;
        let key = PKey::private_key_from_pem(&self.client_key)?;
        builder.set_private_key(&key)?;
        builder.check_private_key()?;

        builder.set_verify(SslVerifyMode::PEER);
        Ok(builder.build())
    }
}

fn read_entry(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Vec<u8>, BundleError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(BundleError::MissingEntry(name.to_string()))
        }
        Err(e) => return Err(e.into()),
    };
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)
        .map_err(|e| BundleError::Zip(e.into()))?;
    Ok(contents)
}
