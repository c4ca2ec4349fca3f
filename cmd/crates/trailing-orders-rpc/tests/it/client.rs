use httpmock::{prelude::*, Mock};
use serde_json::json;
use trailing_orders_rpc::xdr::{
    AccountEntry, AccountEntryExt, AccountId, LedgerEntryData, Limits, Memo, MuxedAccount,
    Preconditions, PublicKey, SequenceNumber, String32, Thresholds, Transaction,
    TransactionEnvelope, TransactionExt, TransactionV1Envelope, Uint256, VecM, WriteXdr,
};
use trailing_orders_rpc::{Client, Error, Rpc};

const SOURCE: &str = "GBZXN7PIRZGNMHGA7MUUUF4GWPY5AYPV6LY4UV2GL6VJGIQRXFDNMADI";

fn source_bytes() -> [u8; 32] {
    stellar_strkey::ed25519::PublicKey::from_string(SOURCE)
        .unwrap()
        .0
}

fn account_entry(seq: i64) -> AccountEntry {
    AccountEntry {
        account_id: AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(source_bytes()))),
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

fn envelope() -> TransactionEnvelope {
    TransactionEnvelope::Tx(TransactionV1Envelope {
        tx: Transaction {
            source_account: MuxedAccount::Ed25519(Uint256(source_bytes())),
            fee: 100,
            seq_num: SequenceNumber(1),
            cond: Preconditions::None,
            memo: Memo::None,
            operations: VecM::default(),
            ext: TransactionExt::V0,
        },
        signatures: VecM::default(),
    })
}

fn mock_method<'a>(server: &'a MockServer, method: &str, result: serde_json::Value) -> Mock<'a> {
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

#[tokio::test]
async fn get_account_reads_the_ledger_entry() {
    let server = MockServer::start();
    let entry = LedgerEntryData::Account(account_entry(4_294_967_300))
        .to_xdr_base64(Limits::none())
        .unwrap();
    let mock = mock_method(
        &server,
        "getLedgerEntries",
        json!({
            "entries": [{ "key": "", "xdr": entry, "lastModifiedLedgerSeq": 12 }],
            "latestLedger": 14
        }),
    );

    let client = Client::new(&server.url("")).unwrap();
    let account = client.get_account(SOURCE).await.unwrap();

    mock.assert();
    assert_eq!(account.seq_num, SequenceNumber(4_294_967_300));
}

#[tokio::test]
async fn get_account_reports_missing_accounts() {
    let server = MockServer::start();
    mock_method(&server, "getLedgerEntries", json!({ "latestLedger": 14 }));

    let client = Client::new(&server.url("")).unwrap();
    match client.get_account(SOURCE).await {
        Err(Error::NotFound(kind, address)) => {
            assert_eq!(kind, "Account");
            assert_eq!(address, SOURCE);
        }
        r => panic!("expected NotFound, got: {r:#?}"),
    }
}

#[tokio::test]
async fn get_account_rejects_bad_addresses_without_a_request() {
    let server = MockServer::start();
    let mock = mock_method(&server, "getLedgerEntries", json!({ "latestLedger": 14 }));

    let client = Client::new(&server.url("")).unwrap();
    assert!(matches!(
        client.get_account("not-an-address").await,
        Err(Error::InvalidAddress(_))
    ));
    mock.assert_hits(0);
}

#[tokio::test]
async fn send_and_get_transaction() {
    let server = MockServer::start();
    let send = mock_method(
        &server,
        "sendTransaction",
        json!({
            "hash": "64977cc4bb7f8bf75bdc47570548a994667899d3319b72f95cb2a64e567ad52c",
            "status": "PENDING",
            "latestLedger": "1479",
            "latestLedgerCloseTime": "1690594566"
        }),
    );
    let get = mock_method(
        &server,
        "getTransaction",
        json!({
            "status": "SUCCESS",
            "latestLedger": 1480,
            "envelopeXdr": "AAAA",
            "resultXdr": "AAAB",
            "resultMetaXdr": "AAAC"
        }),
    );

    let client = Client::new(&server.url("")).unwrap();
    let sent = client.send_transaction(&envelope()).await.unwrap();
    assert_eq!(sent.status, "PENDING");
    assert!(!sent.is_rejected());
    assert_eq!(sent.latest_ledger, 1479);

    let fetched = client.get_transaction(&sent.hash).await.unwrap();
    assert_eq!(fetched.status, "SUCCESS");
    assert_eq!(fetched.result_meta_xdr.as_deref(), Some("AAAC"));

    send.assert();
    get.assert();
}

#[tokio::test]
async fn rpc_headers_are_sent() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/")
            .header("authorization", "Bearer test-token")
            .header("x-client-name", "trailing-orders");
        then.status(200).json_body(json!({
            "jsonrpc": "2.0",
            "id": 0,
            "result": {
                "passphrase": "Test SDF Network ; September 2015",
                "protocolVersion": 20
            }
        }));
    });

    let mut headers = http::HeaderMap::new();
    headers.insert(
        "Authorization",
        http::HeaderValue::from_static("Bearer test-token"),
    );
    let client = Client::new_with_headers(&server.url(""), headers).unwrap();
    let passphrase = client
        .verify_network_passphrase(Some("Test SDF Network ; September 2015"))
        .await
        .unwrap();

    mock.assert();
    assert_eq!(passphrase, "Test SDF Network ; September 2015");
}

#[tokio::test]
async fn simulation_errors_carry_the_diagnostic_events() {
    let server = MockServer::start();
    mock_method(
        &server,
        "simulateTransaction",
        json!({
            "error": "HostError: Error(Contract, #3)",
            "events": ["AAAAAQ=="],
            "latestLedger": 20
        }),
    );

    let client = Client::new(&server.url("")).unwrap();
    let TransactionEnvelope::Tx(TransactionV1Envelope { tx, .. }) = envelope() else {
        panic!("unexpected envelope");
    };
    match client.prepare_transaction(&tx).await {
        Err(Error::TransactionSimulationFailed { message, events }) => {
            assert_eq!(message, "HostError: Error(Contract, #3)");
            assert_eq!(events, vec!["AAAAAQ==".to_string()]);
        }
        r => panic!("expected TransactionSimulationFailed, got: {r:#?}"),
    }
}
