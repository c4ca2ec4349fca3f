use assert_cmd::Command;
use httpmock::{prelude::*, Mock};
use serde_json::{json, Value};
use trailing_orders_rpc::xdr::{
    AccountEntry, AccountEntryExt, AccountId, ExtensionPoint, LedgerEntryData, LedgerFootprint,
    Limits, Memo, MuxedAccount, Preconditions, PublicKey, SequenceNumber, SorobanResources,
    SorobanTransactionData, String32, Thresholds, Transaction, TransactionEnvelope,
    TransactionExt, TransactionV1Envelope, Uint256, VecM, WriteXdr,
};

pub const OWNER: &str = "GBZXN7PIRZGNMHGA7MUUUF4GWPY5AYPV6LY4UV2GL6VJGIQRXFDNMADI";
pub const CONTRACT_ID: &str = "CA3D5KRYM6CB7OWQ6TWYRR3Z4T7GNZLKERYNZGGA5SOAOPIFY6YQGAXE";
pub const HASH: &str = "64977cc4bb7f8bf75bdc47570548a994667899d3319b72f95cb2a64e567ad52c";

/// The binary with none of its configuration leaking in from the environment.
pub fn trailing_orders() -> Command {
    let mut cmd = Command::cargo_bin("trailing-orders").unwrap();
    for var in [
        "RPC_URL",
        "NETWORK_PASSPHRASE",
        "CONTRACT_ID",
        "RPC_HEADERS",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn owner_key() -> [u8; 32] {
    stellar_strkey::ed25519::PublicKey::from_string(OWNER)
        .unwrap()
        .0
}

pub fn unsigned_envelope() -> String {
    TransactionEnvelope::Tx(TransactionV1Envelope {
        tx: Transaction {
            source_account: MuxedAccount::Ed25519(Uint256(owner_key())),
            fee: 100,
            seq_num: SequenceNumber(2),
            cond: Preconditions::None,
            memo: Memo::None,
            operations: VecM::default(),
            ext: TransactionExt::V0,
        },
        signatures: VecM::default(),
    })
    .to_xdr_base64(Limits::none())
    .unwrap()
}

pub fn mock_rpc<'a>(server: &'a MockServer, method: &str, result: Value) -> Mock<'a> {
    server.mock(|when, then| {
        when.method(POST)
            .path("/")
            .body_contains(format!("\"method\":\"{method}\""));
        then.status(200).json_body(json!({
            "jsonrpc": "2.0",
            "id": 0,
            "result": result,
        }));
    })
}

pub fn mock_account(server: &MockServer, sequence: i64) -> Mock<'_> {
    let entry = LedgerEntryData::Account(AccountEntry {
        account_id: AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(owner_key()))),
        balance: 10_000_000,
        seq_num: SequenceNumber(sequence),
        num_sub_entries: 0,
        inflation_dest: None,
        flags: 0,
        home_domain: String32::default(),
        thresholds: Thresholds([1, 0, 0, 0]),
        signers: VecM::default(),
        ext: AccountEntryExt::V0,
    })
    .to_xdr_base64(Limits::none())
    .unwrap();
    mock_rpc(
        server,
        "getLedgerEntries",
        json!({
            "entries": [{ "key": "", "xdr": entry, "lastModifiedLedgerSeq": 10 }],
            "latestLedger": 12
        }),
    )
}

pub fn mock_simulation(server: &MockServer, min_resource_fee: u64) -> Mock<'_> {
    let transaction_data = SorobanTransactionData {
        ext: ExtensionPoint::V0,
        resources: SorobanResources {
            footprint: LedgerFootprint {
                read_only: VecM::default(),
                read_write: VecM::default(),
            },
            instructions: 1_000,
            read_bytes: 0,
            write_bytes: 0,
        },
        resource_fee: 0,
    }
    .to_xdr_base64(Limits::none())
    .unwrap();
    mock_rpc(
        server,
        "simulateTransaction",
        json!({
            "transactionData": transaction_data,
            "minResourceFee": min_resource_fee.to_string(),
            "results": [{ "auth": [], "xdr": "AAAAAQ==" }],
            "cost": { "cpuInsns": "1000", "memBytes": "1000" },
            "latestLedger": 12
        }),
    )
}
