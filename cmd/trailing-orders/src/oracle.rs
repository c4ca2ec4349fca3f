//! The price-oracle reference passed to `trigger_one` and `create_trailing_stop_loss`.
//!
//! On the contract side this is the oracle client's `Asset` enum,
//! `enum Asset { Stellar(Address), Other(Symbol) }`, which the host lays out as a two element
//! vec of the variant name followed by its payload. The variant names are part of the
//! contract's interface and must not change independently of it.
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::scval::{self, address_to_string, sc_symbol, symbol_to_string, unexpected};
use crate::xdr::{ScVal, ScVec};

const STELLAR: &str = "Stellar";
const OTHER: &str = "Other";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Value(#[from] scval::Error),
    #[error("unknown oracle ticker variant {0:?}")]
    UnknownVariant(String),
    #[error("oracle ticker must be a vec of a variant name and one value")]
    Shape,
    #[error("oracle ticker {0:?} must look like stellar:<address> or other:<symbol>")]
    Unparseable(String),
    #[error(transparent)]
    Xdr(#[from] crate::xdr::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OracleTicker {
    /// An asset issued on the ledger, identified by its contract address.
    Stellar { address: String },
    /// Anything else the oracle prices, identified by a symbol such as `XLMUSD`.
    Other { symbol: String },
}

impl OracleTicker {
    pub fn to_scval(&self) -> Result<ScVal, Error> {
        let (tag, payload) = match self {
            OracleTicker::Stellar { address } => (STELLAR, scval::address_from_str(address)?),
            OracleTicker::Other { symbol } => (OTHER, scval::symbol_from_str(symbol)?),
        };
        Ok(ScVal::Vec(Some(ScVec(
            vec![ScVal::Symbol(sc_symbol(tag)?), payload].try_into()?,
        ))))
    }
}

impl TryFrom<&ScVal> for OracleTicker {
    type Error = Error;

    fn try_from(v: &ScVal) -> Result<Self, Self::Error> {
        let ScVal::Vec(Some(ScVec(items))) = v else {
            return Err(Error::Shape);
        };
        let [ScVal::Symbol(tag), payload] = items.as_slice() else {
            return Err(Error::Shape);
        };
        match symbol_to_string(tag).as_str() {
            STELLAR => match payload {
                ScVal::Address(address) => Ok(OracleTicker::Stellar {
                    address: address_to_string(address),
                }),
                other => Err(unexpected("Address", other).into()),
            },
            OTHER => match payload {
                ScVal::Symbol(symbol) => Ok(OracleTicker::Other {
                    symbol: symbol_to_string(symbol),
                }),
                other => Err(unexpected("Symbol", other).into()),
            },
            unknown => Err(Error::UnknownVariant(unknown.to_string())),
        }
    }
}

impl FromStr for OracleTicker {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("stellar", address)) => Ok(OracleTicker::Stellar {
                address: address.to_string(),
            }),
            Some(("other", symbol)) => Ok(OracleTicker::Other {
                symbol: symbol.to_string(),
            }),
            _ => Err(Error::Unparseable(s.to_string())),
        }
    }
}
