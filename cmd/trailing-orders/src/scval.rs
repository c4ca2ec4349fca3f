//! Conversions from the scalar forms callers supply (decimal strings, JSON numbers, strkeys)
//! into the typed [`ScVal`] arguments the orders contract expects.
//!
//! Every encoder is pure. Integer widths are checked exactly; nothing is truncated or
//! rounded on the way in.
use std::str::FromStr;

use serde_json::Number;

use crate::xdr::{
    AccountId, Hash, Int128Parts, PublicKey, ScAddress, ScSymbol, ScVal, Uint256,
};

/// Longest symbol the contract host accepts.
pub const SYMBOL_MAX_LEN: usize = 32;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("{value:?} is not a valid {ty}")]
    Encoding { value: String, ty: &'static str },
    #[error("{0:?} is not a valid account or contract address")]
    InvalidAddress(String),
    #[error("expected {expected}, found {found}")]
    UnexpectedType {
        expected: &'static str,
        found: &'static str,
    },
}

impl Error {
    fn encoding(value: impl ToString, ty: &'static str) -> Self {
        Error::Encoding {
            value: value.to_string(),
            ty,
        }
    }

    /// Input was well formed but names nothing the ledger can address.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidAddress(_))
    }
}

pub fn i128_from_str(s: &str) -> Result<ScVal, Error> {
    let v = i128::from_str(s).map_err(|_| Error::encoding(s, "i128"))?;
    Ok(ScVal::I128(Int128Parts {
        hi: (v >> 64) as i64,
        lo: v as u64,
    }))
}

pub fn u64_from_str(s: &str) -> Result<ScVal, Error> {
    u64::from_str(s)
        .map(ScVal::U64)
        .map_err(|_| Error::encoding(s, "u64"))
}

/// Integral floats such as `5.0` are accepted as their integer value.
pub fn u32_from_number(n: &Number) -> Result<ScVal, Error> {
    integral(n)
        .and_then(|v| u32::try_from(v).ok())
        .map(ScVal::U32)
        .ok_or_else(|| Error::encoding(n, "u32"))
}

pub fn u64_from_number(n: &Number) -> Result<ScVal, Error> {
    integral(n)
        .map(ScVal::U64)
        .ok_or_else(|| Error::encoding(n, "u64"))
}

// Non-negative integer value of a JSON number, if it has one.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn integral(n: &Number) -> Option<u64> {
    if let Some(v) = n.as_u64() {
        return Some(v);
    }
    if n.is_i64() {
        return None;
    }
    let f = n.as_f64()?;
    (f.fract() == 0.0 && f >= 0.0 && f < u64::MAX as f64).then_some(f as u64)
}

/// Accepts an account public key (`G...`) or a contract id (`C...`).
pub fn address_from_str(s: &str) -> Result<ScVal, Error> {
    Ok(ScVal::Address(sc_address(s)?))
}

pub fn sc_address(s: &str) -> Result<ScAddress, Error> {
    match stellar_strkey::Strkey::from_string(s) {
        Ok(stellar_strkey::Strkey::PublicKeyEd25519(key)) => Ok(ScAddress::Account(AccountId(
            PublicKey::PublicKeyTypeEd25519(Uint256(key.0)),
        ))),
        Ok(stellar_strkey::Strkey::Contract(contract)) => Ok(ScAddress::Contract(Hash(contract.0))),
        _ => Err(Error::InvalidAddress(s.to_string())),
    }
}

pub fn symbol_from_str(s: &str) -> Result<ScVal, Error> {
    Ok(ScVal::Symbol(sc_symbol(s)?))
}

pub fn sc_symbol(s: &str) -> Result<ScSymbol, Error> {
    let valid = !s.is_empty()
        && s.len() <= SYMBOL_MAX_LEN
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(Error::encoding(s, "symbol"));
    }
    s.try_into()
        .map(ScSymbol)
        .map_err(|_| Error::encoding(s, "symbol"))
}

pub fn i128_to_string(v: &ScVal) -> Result<String, Error> {
    match v {
        ScVal::I128(Int128Parts { hi, lo }) => {
            Ok((i128::from(*hi) << 64 | i128::from(*lo)).to_string())
        }
        other => Err(unexpected("i128", other)),
    }
}

pub fn u64_to_string(v: &ScVal) -> Result<String, Error> {
    match v {
        ScVal::U64(n) => Ok(n.to_string()),
        other => Err(unexpected("u64", other)),
    }
}

pub fn address_to_string(address: &ScAddress) -> String {
    match address {
        ScAddress::Account(AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(key)))) => {
            stellar_strkey::ed25519::PublicKey(*key).to_string()
        }
        ScAddress::Contract(Hash(contract)) => stellar_strkey::Contract(*contract).to_string(),
    }
}

pub fn symbol_to_string(symbol: &ScSymbol) -> String {
    symbol.0.to_utf8_string_lossy()
}

pub(crate) fn unexpected(expected: &'static str, found: &ScVal) -> Error {
    Error::UnexpectedType {
        expected,
        found: found.name(),
    }
}
