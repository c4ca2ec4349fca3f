use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::account::{self, Account};
use crate::invocation::{self, Invocation};
use crate::rpc::{self, Rpc};
use crate::xdr::{
    self, HostFunction, InvokeHostFunctionOp, Limits, Memo, MuxedAccount, Operation,
    OperationBody, Preconditions, SequenceNumber, TimeBounds, TimePoint, Transaction,
    TransactionEnvelope, TransactionExt, TransactionV1Envelope, Uint256, VecM, WriteXdr,
};

/// Inclusion fee, in stroops, offered for every contract call. Simulation adds the resource
/// fee on top of it.
pub const CONTRACT_CALL_FEE: u32 = 100_000;

/// How long a built transaction stays valid.
pub const TIMEOUT: Duration = Duration::from_secs(300);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Account(#[from] account::Error),
    #[error(transparent)]
    Invocation(#[from] invocation::Error),
    #[error("transaction simulation failed: {message}")]
    Simulation { message: String, events: Vec<String> },
    #[error("fee too large: resource fee {0} does not fit the transaction fee")]
    LargeFee(u64),
    #[error(transparent)]
    Network(rpc::Error),
    /// The server answered, but the simulation does not fit the transaction.
    #[error("unusable simulation response: {0}")]
    Response(rpc::Error),
    #[error(transparent)]
    Xdr(#[from] xdr::Error),
    #[error("system time is before the unix epoch")]
    Clock,
}

impl From<rpc::Error> for Error {
    fn from(e: rpc::Error) -> Self {
        match e {
            rpc::Error::TransactionSimulationFailed { message, events } => {
                Error::Simulation { message, events }
            }
            rpc::Error::LargeFee(fee) => Error::LargeFee(fee),
            e @ (rpc::Error::UnexpectedSimulateTransactionResultSize { .. }
            | rpc::Error::UnexpectedOperationCount { .. }
            | rpc::Error::InvalidResponse
            | rpc::Error::Xdr(_)
            | rpc::Error::Serde(_)) => Error::Response(e),
            e => Error::Network(e),
        }
    }
}

/// A transaction that still needs its resources and fees computed by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub tx: Transaction,
    pub network_passphrase: String,
}

/// A simulated transaction, complete except for its signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedEnvelope {
    pub tx: Transaction,
    pub network_passphrase: String,
}

impl PreparedEnvelope {
    /// Unsigned `TransactionEnvelope` in base64 XDR, the form wallets sign.
    pub fn to_xdr_base64(&self) -> Result<String, Error> {
        Ok(TransactionEnvelope::Tx(TransactionV1Envelope {
            tx: self.tx.clone(),
            signatures: VecM::default(),
        })
        .to_xdr_base64(Limits::none())?)
    }

    pub fn hash(&self) -> Result<String, Error> {
        let hash = rpc::transaction_hash(&self.tx, &self.network_passphrase)?;
        Ok(hex::encode(hash))
    }

    pub fn fee(&self) -> u32 {
        self.tx.fee
    }
}

/// Wrap `invocation` in a transaction from `source`, using the account's next sequence
/// number and a validity window ending [`TIMEOUT`] from now.
pub async fn assemble(
    rpc: &impl Rpc,
    invocation: &Invocation,
    source: &str,
    network_passphrase: &str,
) -> Result<Envelope, Error> {
    let account = account::fetch(rpc, source).await?;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| Error::Clock)?;
    let tx = build_invoke_contract_tx(invocation, &account, now.as_secs())?;
    tracing::debug!(
        function = %invocation.function,
        contract = %invocation.contract_id(),
        source,
        seq = tx.seq_num.0,
        "assembled transaction"
    );
    Ok(Envelope {
        tx,
        network_passphrase: network_passphrase.to_string(),
    })
}

/// Simulate `envelope` and apply the ledger's footprint, authorizations and resource fee.
pub async fn prepare(rpc: &impl Rpc, envelope: Envelope) -> Result<PreparedEnvelope, Error> {
    let tx = rpc.prepare_transaction(&envelope.tx).await.map_err(|e| {
        if let rpc::Error::TransactionSimulationFailed { message, .. } = &e {
            tracing::warn!("simulation failed: {message}");
        }
        Error::from(e)
    })?;
    tracing::debug!(fee = tx.fee, "prepared transaction");
    Ok(PreparedEnvelope {
        tx,
        network_passphrase: envelope.network_passphrase,
    })
}

fn build_invoke_contract_tx(
    invocation: &Invocation,
    account: &Account,
    now: u64,
) -> Result<Transaction, Error> {
    let source = stellar_strkey::ed25519::PublicKey::from_string(&account.address)
        .map_err(|_| account::Error::InvalidAddress(account.address.clone()))?;
    let op = Operation {
        source_account: None,
        body: OperationBody::InvokeHostFunction(InvokeHostFunctionOp {
            host_function: HostFunction::InvokeContract(invocation.invoke_contract_args()?),
            auth: VecM::default(),
        }),
    };
    Ok(Transaction {
        source_account: MuxedAccount::Ed25519(Uint256(source.0)),
        fee: CONTRACT_CALL_FEE,
        seq_num: SequenceNumber(account.next_sequence()),
        cond: Preconditions::Time(TimeBounds {
            min_time: TimePoint(0),
            max_time: TimePoint(now + TIMEOUT.as_secs()),
        }),
        memo: Memo::None,
        operations: vec![op].try_into()?,
        ext: TransactionExt::V0,
    })
}
