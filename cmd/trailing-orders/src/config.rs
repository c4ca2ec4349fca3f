use clap::arg;
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

use crate::commands::HEADING_RPC;
use crate::rpc;

pub mod passphrase {
    pub const TESTNET: &str = "Test SDF Network ; September 2015";
    pub const MAINNET: &str = "Public Global Stellar Network ; September 2015";
}

pub const DEFAULT_RPC_URL: &str = "https://soroban-testnet.stellar.org";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("contract id is not configured; use --contract-id or set CONTRACT_ID")]
    MissingContractId,
    #[error("invalid rpc header {0:?}, expected \"Name: value\"")]
    InvalidHeader(String),
    #[error(transparent)]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),
    #[error(transparent)]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),
    #[error(transparent)]
    Rpc(#[from] rpc::Error),
}

#[derive(Debug, clap::Args, Clone)]
#[group(skip)]
pub struct Args {
    /// RPC server endpoint
    #[arg(
        long = "rpc-url",
        env = "RPC_URL",
        default_value = DEFAULT_RPC_URL,
        help_heading = HEADING_RPC,
    )]
    pub rpc_url: String,

    /// Passphrase of the network transactions are built for
    #[arg(
        long = "network-passphrase",
        env = "NETWORK_PASSPHRASE",
        default_value = passphrase::TESTNET,
        help_heading = HEADING_RPC,
    )]
    pub network_passphrase: String,

    /// Id of the trailing-orders contract, e.g. `CA3D...`
    #[arg(long = "contract-id", env = "CONTRACT_ID", help_heading = HEADING_RPC)]
    pub contract_id: Option<String>,

    /// Extra header sent with every RPC request, e.g. `"Authorization: Bearer <token>"`
    #[arg(
        long = "rpc-header",
        env = "RPC_HEADERS",
        num_args = 1,
        action = clap::ArgAction::Append,
        value_delimiter = '\n',
        value_parser = parse_http_header,
        help_heading = HEADING_RPC,
    )]
    pub rpc_headers: Vec<(String, String)>,
}

impl Args {
    pub fn config(&self) -> Config {
        Config {
            rpc_url: self.rpc_url.clone(),
            network_passphrase: self.network_passphrase.clone(),
            contract_id: self.contract_id.clone().filter(|id| !id.is_empty()),
            rpc_headers: self.rpc_headers.clone(),
        }
    }
}

/// Everything the build and submit operations need to know about their environment.
///
/// Built once at startup and only ever read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub rpc_url: String,
    pub network_passphrase: String,
    pub contract_id: Option<String>,
    pub rpc_headers: Vec<(String, String)>,
}

/// The part of [`Config`] that is safe to show to end users. Header values may hold
/// credentials so they are left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfig {
    pub rpc_url: String,
    pub network_passphrase: String,
    pub contract_id: Option<String>,
}

impl Config {
    pub fn new(rpc_url: &str, network_passphrase: &str, contract_id: Option<&str>) -> Self {
        Config {
            rpc_url: rpc_url.to_string(),
            network_passphrase: network_passphrase.to_string(),
            contract_id: contract_id.filter(|id| !id.is_empty()).map(str::to_string),
            rpc_headers: Vec::new(),
        }
    }

    pub fn contract_id(&self) -> Result<&str, Error> {
        match self.contract_id.as_deref() {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(Error::MissingContractId),
        }
    }

    pub fn public(&self) -> PublicConfig {
        PublicConfig {
            rpc_url: self.rpc_url.clone(),
            network_passphrase: self.network_passphrase.clone(),
            contract_id: self.contract_id.clone(),
        }
    }

    pub fn rpc_client(&self) -> Result<rpc::Client, Error> {
        let mut additional_headers = HeaderMap::new();
        for (name, value) in &self.rpc_headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())?;
            let header_value = HeaderValue::from_str(value)?;
            additional_headers.insert(header_name, header_value);
        }
        Ok(rpc::Client::new_with_headers(
            &self.rpc_url,
            additional_headers,
        )?)
    }
}

fn parse_http_header(header: &str) -> Result<(String, String), Error> {
    let Some((name, value)) = header.split_once(':') else {
        return Err(Error::InvalidHeader(header.to_string()));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidHeader(header.to_string()));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
