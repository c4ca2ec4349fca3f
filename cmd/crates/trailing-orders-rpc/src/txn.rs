use sha2::{Digest, Sha256};

use crate::xdr::{
    FeeBumpTransaction, Hash, Limits, OperationBody, ReadXdr, SorobanAuthorizationEntry,
    Transaction, TransactionExt, TransactionSignaturePayload,
    TransactionSignaturePayloadTaggedTransaction, VecM, WriteXdr,
};
use crate::{Error, SimulateTransactionResponse};

// Apply the result of a simulateTransaction onto a transaction envelope, preparing it for
// signing.
pub fn assemble(
    raw: &Transaction,
    simulation: &SimulateTransactionResponse,
) -> Result<Transaction, Error> {
    let mut tx = raw.clone();

    // simulate.results is one-result-per-function and assumes a single operation.
    if tx.operations.len() != 1 {
        return Err(Error::UnexpectedOperationCount {
            count: tx.operations.len(),
        });
    }

    let transaction_data = simulation.transaction_data()?;

    let mut op = tx.operations[0].clone();
    if let OperationBody::InvokeHostFunction(ref mut body) = &mut op.body {
        if body.auth.is_empty() {
            if simulation.results.len() != 1 {
                return Err(Error::UnexpectedSimulateTransactionResultSize {
                    length: simulation.results.len(),
                });
            }

            let auths = simulation
                .results
                .iter()
                .map(|r| {
                    VecM::try_from(
                        r.auth
                            .iter()
                            .map(|v| SorobanAuthorizationEntry::from_xdr_base64(v, Limits::none()))
                            .collect::<Result<Vec<_>, _>>()?,
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;
            if let Some(auth) = auths.into_iter().next() {
                body.auth = auth;
            }
        }
    }

    // The resource fee is added on top of the inclusion fee the caller chose. An overflow
    // is reported instead of clamped so the signed fee is always the one asked for.
    let resource_fee = u32::try_from(simulation.min_resource_fee)
        .map_err(|_| Error::LargeFee(simulation.min_resource_fee))?;
    tx.fee = tx
        .fee
        .checked_add(resource_fee)
        .ok_or(Error::LargeFee(simulation.min_resource_fee))?;

    tx.operations = vec![op].try_into()?;
    tx.ext = TransactionExt::V1(transaction_data);
    Ok(tx)
}

/// Hash of `tx` as signed on the network identified by `network_passphrase`.
pub fn transaction_hash(tx: &Transaction, network_passphrase: &str) -> Result<[u8; 32], Error> {
    signature_payload_hash(
        TransactionSignaturePayloadTaggedTransaction::Tx(tx.clone()),
        network_passphrase,
    )
}

/// Hash of the fee bump wrapper `tx`, the payload its fee source signs.
pub fn fee_bump_transaction_hash(
    tx: &FeeBumpTransaction,
    network_passphrase: &str,
) -> Result<[u8; 32], Error> {
    signature_payload_hash(
        TransactionSignaturePayloadTaggedTransaction::TxFeeBump(tx.clone()),
        network_passphrase,
    )
}

fn signature_payload_hash(
    tagged_transaction: TransactionSignaturePayloadTaggedTransaction,
    network_passphrase: &str,
) -> Result<[u8; 32], Error> {
    let signature_payload = TransactionSignaturePayload {
        network_id: Hash(Sha256::digest(network_passphrase).into()),
        tagged_transaction,
    };
    Ok(Sha256::digest(signature_payload.to_xdr(Limits::none())?).into())
}
