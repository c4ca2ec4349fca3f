use crate::rpc::{self, Rpc};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0:?} is not a valid account public key")]
    InvalidAddress(String),
    #[error("account {0} not found; fund it before building transactions for it")]
    AccountNotFound(String),
    #[error(transparent)]
    Network(rpc::Error),
}

/// An account as of the moment it was fetched. Never cached: every build reads a fresh copy
/// so the next sequence number is current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: String,
    pub sequence: i64,
}

impl Account {
    pub fn next_sequence(&self) -> i64 {
        self.sequence + 1
    }
}

/// Read `address`'s current sequence number with a single ledger entry lookup.
///
/// No retries are attempted here.
pub async fn fetch(rpc: &impl Rpc, address: &str) -> Result<Account, Error> {
    if stellar_strkey::ed25519::PublicKey::from_string(address).is_err() {
        return Err(Error::InvalidAddress(address.to_string()));
    }
    let entry = rpc.get_account(address).await.map_err(|e| match e {
        rpc::Error::NotFound(..) => Error::AccountNotFound(address.to_string()),
        e => Error::Network(e),
    })?;
    tracing::debug!(address, sequence = entry.seq_num.0, "fetched account");
    Ok(Account {
        address: address.to_string(),
        sequence: entry.seq_num.0,
    })
}
