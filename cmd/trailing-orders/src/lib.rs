#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_panics_doc
)]
pub(crate) use trailing_orders_rpc as rpc;
pub(crate) use trailing_orders_rpc::xdr;

mod cli;
pub use cli::main;

pub mod account;
pub mod assemble;
pub mod commands;
pub mod config;
pub mod invocation;
pub mod oracle;
pub mod orders;
pub mod print;
pub mod scval;
pub mod submit;

#[cfg(test)]
mod fake;

pub use commands::Root;
pub use orders::Orders;
