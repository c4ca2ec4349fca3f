//! Typed argument lists for the four contract entry points.
//!
//! Builders check their input and encode it; none of them talk to the network. The argument
//! order of each list is the order of the contract function's parameters.
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::config::{self, Config};
use crate::oracle::{self, OracleTicker};
use crate::scval;
use crate::xdr::{Hash, InvokeContractArgs, ScAddress, ScSymbol, ScVal};

/// Slippage is expressed in basis points and must stay below 100%.
pub const MAX_SLIP_BPS: u32 = 10_000;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] config::Error),
    #[error("contract id {0:?} is not a valid contract address")]
    InvalidContractId(String),
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{field} must be a valid public key, got {value:?}")]
    InvalidPublicKey { field: &'static str, value: String },
    #[error("invalid {field} {value}, expected {expected}")]
    OutOfRange {
        field: &'static str,
        value: Number,
        expected: &'static str,
    },
    #[error("invalid {field}: {source}")]
    Value {
        field: &'static str,
        source: scval::Error,
    },
    #[error("invalid {field}: {source}")]
    Oracle {
        field: &'static str,
        source: oracle::Error,
    },
    #[error(transparent)]
    Xdr(#[from] crate::xdr::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    CreateSimpleTrigger,
    CancelOrder,
    TriggerOne,
    CreateTrailingStopLoss,
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Function::CreateSimpleTrigger => "create_simple_trigger",
            Function::CancelOrder => "cancel_order",
            Function::TriggerOne => "trigger_one",
            Function::CreateTrailingStopLoss => "create_trailing_stop_loss",
        }
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleTriggerRequest {
    pub owner: String,
    pub sell_asset: String,
    pub buy_asset: String,
    /// i128 as a decimal string
    pub amount_to_sell: String,
    /// i128 as a decimal string
    pub trigger_price: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderRequest {
    pub owner: String,
    /// u64 as a decimal string
    pub order_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerOneRequest {
    /// Account that submits the transaction. It is not passed to the contract.
    pub caller: String,
    pub oracle_ticker: OracleTicker,
    /// u64 as a decimal string
    pub order_id: String,
    pub slip_bps: Number,
    pub deadline_secs: Number,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailingStopRequest {
    pub owner: String,
    pub sell_asset: String,
    pub buy_asset: String,
    /// i128 as a decimal string
    pub amount_to_sell: String,
    /// The contract accepts 1..=9999. Out of range values are left for the contract to
    /// reject during simulation.
    pub trail_bps: Number,
    pub oracle_ticker: OracleTicker,
}

/// A call to one contract function, ready to be wrapped into a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub contract: Hash,
    pub function: Function,
    pub args: Vec<ScVal>,
    /// The account expected to submit the call.
    pub source: String,
}

impl Invocation {
    pub fn contract_id(&self) -> String {
        stellar_strkey::Contract(self.contract.0).to_string()
    }

    pub fn invoke_contract_args(&self) -> Result<InvokeContractArgs, Error> {
        Ok(InvokeContractArgs {
            contract_address: ScAddress::Contract(self.contract.clone()),
            function_name: ScSymbol(self.function.name().try_into()?),
            args: self.args.clone().try_into()?,
        })
    }
}

pub fn create_simple_trigger(
    config: &Config,
    req: &SimpleTriggerRequest,
) -> Result<Invocation, Error> {
    let contract = contract(config)?;
    let owner = required("owner", &req.owner)?;
    let sell_asset = required("sellAsset", &req.sell_asset)?;
    let buy_asset = required("buyAsset", &req.buy_asset)?;
    let amount_to_sell = required("amountToSell", &req.amount_to_sell)?;
    let trigger_price = required("triggerPrice", &req.trigger_price)?;
    Ok(Invocation {
        contract,
        function: Function::CreateSimpleTrigger,
        args: vec![
            value("owner", scval::address_from_str(owner))?,
            value("sellAsset", scval::address_from_str(sell_asset))?,
            value("buyAsset", scval::address_from_str(buy_asset))?,
            value("amountToSell", scval::i128_from_str(amount_to_sell))?,
            value("triggerPrice", scval::i128_from_str(trigger_price))?,
        ],
        source: owner.to_string(),
    })
}

pub fn cancel_order(config: &Config, req: &CancelOrderRequest) -> Result<Invocation, Error> {
    let contract = contract(config)?;
    let owner = required("owner", &req.owner)?;
    let order_id = required("orderId", &req.order_id)?;
    Ok(Invocation {
        contract,
        function: Function::CancelOrder,
        args: vec![
            value("owner", scval::address_from_str(owner))?,
            value("orderId", scval::u64_from_str(order_id))?,
        ],
        source: owner.to_string(),
    })
}

pub fn trigger_one(config: &Config, req: &TriggerOneRequest) -> Result<Invocation, Error> {
    let contract = contract(config)?;
    if stellar_strkey::ed25519::PublicKey::from_string(&req.caller).is_err() {
        return Err(Error::InvalidPublicKey {
            field: "caller",
            value: req.caller.clone(),
        });
    }
    if !req
        .slip_bps
        .as_f64()
        .is_some_and(|v| (0.0..f64::from(MAX_SLIP_BPS)).contains(&v))
    {
        return Err(Error::OutOfRange {
            field: "slipBps",
            value: req.slip_bps.clone(),
            expected: "0 <= slipBps < 10000",
        });
    }
    if !req.deadline_secs.as_f64().is_some_and(|v| v >= 0.0) {
        return Err(Error::OutOfRange {
            field: "deadlineSecs",
            value: req.deadline_secs.clone(),
            expected: "deadlineSecs >= 0",
        });
    }
    let order_id = required("orderId", &req.order_id)?;
    Ok(Invocation {
        contract,
        function: Function::TriggerOne,
        args: vec![
            oracle_ticker("oracleTicker", &req.oracle_ticker)?,
            value("orderId", scval::u64_from_str(order_id))?,
            value("slipBps", scval::u32_from_number(&req.slip_bps))?,
            value("deadlineSecs", scval::u64_from_number(&req.deadline_secs))?,
        ],
        source: req.caller.clone(),
    })
}

pub fn create_trailing_stop_loss(
    config: &Config,
    req: &TrailingStopRequest,
) -> Result<Invocation, Error> {
    let contract = contract(config)?;
    let owner = required("owner", &req.owner)?;
    let sell_asset = required("sellAsset", &req.sell_asset)?;
    let buy_asset = required("buyAsset", &req.buy_asset)?;
    let amount_to_sell = required("amountToSell", &req.amount_to_sell)?;
    Ok(Invocation {
        contract,
        function: Function::CreateTrailingStopLoss,
        args: vec![
            value("owner", scval::address_from_str(owner))?,
            value("sellAsset", scval::address_from_str(sell_asset))?,
            value("buyAsset", scval::address_from_str(buy_asset))?,
            value("amountToSell", scval::i128_from_str(amount_to_sell))?,
            value("trailBps", scval::u32_from_number(&req.trail_bps))?,
            oracle_ticker("oracleTicker", &req.oracle_ticker)?,
        ],
        source: owner.to_string(),
    })
}

fn contract(config: &Config) -> Result<Hash, Error> {
    let id = config.contract_id()?;
    stellar_strkey::Contract::from_string(id)
        .map(|c| Hash(c.0))
        .map_err(|_| Error::InvalidContractId(id.to_string()))
}

fn required<'a>(field: &'static str, v: &'a str) -> Result<&'a str, Error> {
    if v.is_empty() {
        Err(Error::Required(field))
    } else {
        Ok(v)
    }
}

fn value(field: &'static str, v: Result<ScVal, scval::Error>) -> Result<ScVal, Error> {
    v.map_err(|source| Error::Value { field, source })
}

fn oracle_ticker(field: &'static str, ticker: &OracleTicker) -> Result<ScVal, Error> {
    ticker
        .to_scval()
        .map_err(|source| Error::Oracle { field, source })
}
