//! Submission of signed transactions and observation of their outcome.
//!
//! A submission either fails immediately (the server refused it), or is polled by hash until
//! the ledger reports it as applied or failed. Running out of attempts is not an error: the
//! outcome is [`Outcome::Pending`] and the hash can be used to look the transaction up later.
//! Dropping the returned future stops the local polling only, never the transaction.
use std::time::Duration;

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::Serialize;
use tokio::time::sleep;

use crate::rpc::{self, Rpc};
use crate::xdr::{
    DecoratedSignature, FeeBumpTransactionEnvelope, FeeBumpTransactionInnerTx, Limits,
    MuxedAccount, MuxedAccountMed25519, Preconditions, ReadXdr, Transaction,
    TransactionEnvelope, TransactionExt, TransactionV0, TransactionV0Envelope,
    TransactionV1Envelope, Uint256,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("malformed transaction envelope: {0}")]
    MalformedEnvelope(String),
    #[error(transparent)]
    Network(rpc::Error),
    #[error("checking status of transaction {hash}: {source}")]
    Poll { hash: String, source: rpc::Error },
}

/// How often, and how many times, to ask for a submitted transaction's status.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
    /// Wait before poll `attempt` (1-based, the first poll is never delayed) given the base
    /// interval.
    pub backoff: fn(attempt: u32, interval: Duration) -> Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            interval: Duration::from_secs(1),
            backoff: fixed,
        }
    }
}

impl PollPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
            ..Default::default()
        }
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        (self.backoff)(attempt, self.interval)
    }
}

pub fn fixed(_attempt: u32, interval: Duration) -> Duration {
    interval
}

/// Doubles the interval on every attempt, up to 30 seconds.
pub fn doubling(attempt: u32, interval: Duration) -> Duration {
    const MAX: Duration = Duration::from_secs(30);
    interval
        .checked_mul(1 << attempt.saturating_sub(1).min(16))
        .map_or(MAX, |d| d.min(MAX))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "UPPERCASE")]
pub enum Outcome {
    Success {
        hash: String,
        #[serde(rename = "resultXdr")]
        result_xdr: Option<String>,
    },
    Failed {
        hash: String,
        error: Option<String>,
    },
    Pending {
        hash: String,
    },
}

impl Outcome {
    pub fn hash(&self) -> &str {
        match self {
            Outcome::Success { hash, .. }
            | Outcome::Failed { hash, .. }
            | Outcome::Pending { hash } => hash,
        }
    }
}

/// Send the signed base64 envelope `signed` and wait for its outcome under `policy`.
pub async fn submit(
    rpc: &impl Rpc,
    network_passphrase: &str,
    signed: &str,
    policy: &PollPolicy,
) -> Result<Outcome, Error> {
    let envelope = parse_envelope(signed, network_passphrase)?;
    let sent = rpc
        .send_transaction(&envelope)
        .await
        .map_err(Error::Network)?;
    if sent.is_rejected() {
        tracing::warn!(hash = %sent.hash, status = %sent.status, "transaction rejected");
        return Ok(Outcome::Failed {
            hash: sent.hash,
            error: sent.error_result_xdr,
        });
    }
    tracing::info!(hash = %sent.hash, "transaction submitted");
    wait_for_transaction(rpc, sent.hash, policy).await
}

/// Poll `hash` until it reaches a final status or `policy` runs out of attempts.
pub async fn wait_for_transaction(
    rpc: &impl Rpc,
    hash: String,
    policy: &PollPolicy,
) -> Result<Outcome, Error> {
    for attempt in 0..policy.max_attempts {
        if attempt > 0 {
            sleep(policy.delay(attempt)).await;
        }
        let response = match rpc.get_transaction(&hash).await {
            Ok(response) => response,
            Err(source) => return Err(Error::Poll { hash, source }),
        };
        match response.status.as_str() {
            "SUCCESS" => {
                tracing::trace!(?response);
                return Ok(Outcome::Success {
                    hash,
                    result_xdr: response.result_xdr,
                });
            }
            "FAILED" => {
                tracing::warn!(%hash, "transaction failed");
                return Ok(Outcome::Failed {
                    hash,
                    error: response.result_xdr,
                });
            }
            status => tracing::debug!(%hash, attempt, status, "transaction not final yet"),
        }
    }
    tracing::info!(%hash, "transaction still pending");
    Ok(Outcome::Pending { hash })
}

/// Decode a signed envelope and check that the signatures made by its source account, and
/// by the fee source of a fee bump, were made for `network_passphrase`.
pub fn parse_envelope(
    signed: &str,
    network_passphrase: &str,
) -> Result<TransactionEnvelope, Error> {
    let envelope = TransactionEnvelope::from_xdr_base64(signed.trim(), Limits::none())
        .map_err(|e| Error::MalformedEnvelope(e.to_string()))?;
    match &envelope {
        TransactionEnvelope::TxV0(TransactionV0Envelope { tx, signatures }) => {
            verify_source_signatures(&v0_as_transaction(tx), signatures, network_passphrase)?;
        }
        TransactionEnvelope::Tx(TransactionV1Envelope { tx, signatures }) => {
            verify_source_signatures(tx, signatures, network_passphrase)?;
        }
        TransactionEnvelope::TxFeeBump(FeeBumpTransactionEnvelope { tx, signatures }) => {
            let FeeBumpTransactionInnerTx::Tx(inner) = &tx.inner_tx;
            verify_source_signatures(&inner.tx, &inner.signatures, network_passphrase)?;
            let hash = rpc::fee_bump_transaction_hash(tx, network_passphrase)
                .map_err(|e| Error::MalformedEnvelope(e.to_string()))?;
            verify_signatures(
                "fee source",
                ed25519_key(&tx.fee_source),
                &hash,
                signatures,
                network_passphrase,
            )?;
        }
    }
    Ok(envelope)
}

fn verify_source_signatures(
    tx: &Transaction,
    signatures: &[DecoratedSignature],
    network_passphrase: &str,
) -> Result<(), Error> {
    let hash = rpc::transaction_hash(tx, network_passphrase)
        .map_err(|e| Error::MalformedEnvelope(e.to_string()))?;
    verify_signatures(
        "source account",
        ed25519_key(&tx.source_account),
        &hash,
        signatures,
        network_passphrase,
    )
}

/// Signatures whose hint does not match `key` belong to other signers and are left to the
/// server.
fn verify_signatures(
    signer: &str,
    key: [u8; 32],
    hash: &[u8; 32],
    signatures: &[DecoratedSignature],
    network_passphrase: &str,
) -> Result<(), Error> {
    let verifying_key = VerifyingKey::from_bytes(&key)
        .map_err(|_| Error::MalformedEnvelope(format!("invalid {signer}")))?;
    for decorated in signatures.iter().filter(|s| s.hint.0 == key[28..]) {
        let signature = Signature::from_slice(decorated.signature.0.as_slice())
            .map_err(|_| Error::MalformedEnvelope("invalid signature".to_string()))?;
        if verifying_key.verify(hash, &signature).is_err() {
            return Err(Error::MalformedEnvelope(format!(
                "{signer} signature is not valid for network {network_passphrase:?}"
            )));
        }
    }
    Ok(())
}

fn ed25519_key(account: &MuxedAccount) -> [u8; 32] {
    match account {
        MuxedAccount::Ed25519(Uint256(key))
        | MuxedAccount::MuxedEd25519(MuxedAccountMed25519 {
            ed25519: Uint256(key),
            ..
        }) => *key,
    }
}

// Pre-protocol-13 envelopes are signed over their v1 form.
fn v0_as_transaction(tx: &TransactionV0) -> Transaction {
    Transaction {
        source_account: MuxedAccount::Ed25519(tx.source_account_ed25519.clone()),
        fee: tx.fee,
        seq_num: tx.seq_num.clone(),
        cond: tx
            .time_bounds
            .clone()
            .map_or(Preconditions::None, Preconditions::Time),
        memo: tx.memo.clone(),
        operations: tx.operations.clone(),
        ext: TransactionExt::V0,
    }
}
