//! In-memory ledger used by the unit tests.
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::rpc::{
    self, GetTransactionResponse, Rpc, SendTransactionResponse, SimulateHostFunctionResultRaw,
    SimulateTransactionResponse,
};
use crate::xdr::{
    AccountEntry, AccountEntryExt, AccountId, ExtensionPoint, LedgerFootprint, Limits, PublicKey,
    SequenceNumber, SorobanResources, SorobanTransactionData, String32, Thresholds,
    TransactionEnvelope, Uint256, VecM, WriteXdr,
};

pub const ACCOUNT: &str = "GBZXN7PIRZGNMHGA7MUUUF4GWPY5AYPV6LY4UV2GL6VJGIQRXFDNMADI";
pub const CONTRACT: &str = "CA3D5KRYM6CB7OWQ6TWYRR3Z4T7GNZLKERYNZGGA5SOAOPIFY6YQGAXE";
pub const HASH: &str = "64977cc4bb7f8bf75bdc47570548a994667899d3319b72f95cb2a64e567ad52c";

pub fn account_entry(address: &str, seq: i64) -> AccountEntry {
    AccountEntry {
        account_id: AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(
            stellar_strkey::ed25519::PublicKey::from_string(address)
                .unwrap()
                .0,
        ))),
        balance: 10_000_000,
        seq_num: SequenceNumber(seq),
        num_sub_entries: 0,
        inflation_dest: None,
        flags: 0,
        home_domain: String32::default(),
        thresholds: Thresholds([1, 0, 0, 0]),
        signers: VecM::default(),
        ext: AccountEntryExt::V0,
    }
}

pub fn transaction_data() -> SorobanTransactionData {
    SorobanTransactionData {
        resources: SorobanResources {
            footprint: LedgerFootprint {
                read_only: VecM::default(),
                read_write: VecM::default(),
            },
            instructions: 1_000,
            read_bytes: 5,
            write_bytes: 0,
        },
        resource_fee: 58_181,
        ext: ExtensionPoint::V0,
    }
}

pub fn simulation(min_resource_fee: u64) -> SimulateTransactionResponse {
    SimulateTransactionResponse {
        min_resource_fee,
        latest_ledger: 3,
        results: vec![SimulateHostFunctionResultRaw {
            auth: vec![],
            xdr: "AAAAAQ==".to_string(),
        }],
        transaction_data: transaction_data().to_xdr_base64(Limits::none()).unwrap(),
        ..Default::default()
    }
}

pub fn status(status: &str) -> GetTransactionResponse {
    GetTransactionResponse {
        status: status.to_string(),
        result_xdr: (status != "NOT_FOUND").then(|| format!("{status}-result")),
        ..Default::default()
    }
}

#[derive(Default)]
pub struct FakeRpc {
    pub sequence: Option<i64>,
    pub simulation: Option<SimulateTransactionResponse>,
    pub send: Option<SendTransactionResponse>,
    /// Answers to successive `getTransaction` calls. Once exhausted every poll answers
    /// `NOT_FOUND`, unless `poll_error` is set.
    pub statuses: Mutex<VecDeque<GetTransactionResponse>>,
    pub poll_error: bool,
    pub calls: Mutex<Vec<&'static str>>,
    pub sent: Mutex<Vec<TransactionEnvelope>>,
}

impl FakeRpc {
    pub fn with_account(sequence: i64) -> Self {
        FakeRpc {
            sequence: Some(sequence),
            ..Default::default()
        }
    }

    pub fn with_statuses(send: SendTransactionResponse, statuses: Vec<GetTransactionResponse>) -> Self {
        FakeRpc {
            send: Some(send),
            statuses: Mutex::new(statuses.into()),
            ..Default::default()
        }
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|m| **m == method)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, method: &'static str) {
        self.calls.lock().unwrap().push(method);
    }
}

pub fn accepted() -> SendTransactionResponse {
    SendTransactionResponse {
        hash: HASH.to_string(),
        status: "PENDING".to_string(),
        ..Default::default()
    }
}

#[async_trait::async_trait]
impl Rpc for FakeRpc {
    async fn get_account(&self, address: &str) -> Result<AccountEntry, rpc::Error> {
        self.record("getAccount");
        match self.sequence {
            Some(seq) => Ok(account_entry(address, seq)),
            None => Err(rpc::Error::NotFound(
                "Account".to_string(),
                address.to_string(),
            )),
        }
    }

    async fn simulate_transaction(
        &self,
        _: &TransactionEnvelope,
    ) -> Result<SimulateTransactionResponse, rpc::Error> {
        self.record("simulateTransaction");
        self.simulation.clone().ok_or(rpc::Error::InvalidResponse)
    }

    async fn send_transaction(
        &self,
        tx: &TransactionEnvelope,
    ) -> Result<SendTransactionResponse, rpc::Error> {
        self.record("sendTransaction");
        self.sent.lock().unwrap().push(tx.clone());
        self.send.clone().ok_or(rpc::Error::InvalidResponse)
    }

    async fn get_transaction(&self, _: &str) -> Result<GetTransactionResponse, rpc::Error> {
        self.record("getTransaction");
        if let Some(next) = self.statuses.lock().unwrap().pop_front() {
            return Ok(next);
        }
        if self.poll_error {
            return Err(rpc::Error::InvalidResponse);
        }
        Ok(status("NOT_FOUND"))
    }
}
