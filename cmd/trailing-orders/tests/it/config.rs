use predicates::prelude::*;

use crate::util::{trailing_orders, CONTRACT_ID};

#[test]
fn prints_public_config() {
    trailing_orders()
        .arg("config")
        .arg("--contract-id")
        .arg(CONTRACT_ID)
        .arg("--rpc-header")
        .arg("Authorization: Bearer secret")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "\"contractId\": \"{CONTRACT_ID}\""
        )))
        .stdout(predicate::str::contains(
            "\"rpcUrl\": \"https://soroban-testnet.stellar.org\"",
        ))
        .stdout(predicate::str::contains("secret").not());
}

#[test]
fn reads_config_from_env() {
    trailing_orders()
        .env("RPC_URL", "http://localhost:8000/soroban/rpc")
        .env("NETWORK_PASSPHRASE", "Standalone Network ; February 2017")
        .env("CONTRACT_ID", CONTRACT_ID)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "\"rpcUrl\": \"http://localhost:8000/soroban/rpc\"",
        ))
        .stdout(predicate::str::contains(
            "\"networkPassphrase\": \"Standalone Network ; February 2017\"",
        ));
}

#[test]
fn missing_contract_id_is_null() {
    trailing_orders()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"contractId\": null"));
}

#[test]
fn check_accepts_matching_network() {
    let server = httpmock::MockServer::start();
    let network = crate::util::mock_rpc(
        &server,
        "getNetwork",
        serde_json::json!({
            "passphrase": "Test SDF Network ; September 2015",
            "protocolVersion": 20
        }),
    );

    trailing_orders()
        .args(["config", "--check"])
        .arg("--rpc-url")
        .arg(server.base_url())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"contractId\": null"));
    network.assert_hits(1);
}

#[test]
fn check_rejects_other_network() {
    let server = httpmock::MockServer::start();
    crate::util::mock_rpc(
        &server,
        "getNetwork",
        serde_json::json!({
            "passphrase": "Public Global Stellar Network ; September 2015",
            "protocolVersion": 20
        }),
    );

    trailing_orders()
        .args(["config", "--check"])
        .arg("--rpc-url")
        .arg(server.base_url())
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("does not match the server"));
}
