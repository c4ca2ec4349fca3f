use std::io::{self, Read};
use std::time::Duration;

use crate::config;
use crate::orders::{self, Orders};
use crate::print::Print;
use crate::submit::PollPolicy;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Orders(#[from] orders::Error),
    #[error("reading transaction from stdin: {0}")]
    Stdin(io::Error),
    #[error("no transaction given; pass --xdr or pipe the signed envelope to stdin")]
    NoTransaction,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, clap::Parser, Clone)]
#[group(skip)]
pub struct Cmd {
    /// Signed transaction envelope as base64 XDR. Read from stdin when omitted
    #[arg(long)]
    pub xdr: Option<String>,

    /// Number of times to check the transaction's status before reporting it as pending
    #[arg(long, default_value_t = 20)]
    pub max_attempts: u32,

    /// Milliseconds to wait between status checks
    #[arg(long, default_value_t = 1_000)]
    pub interval_ms: u64,

    #[command(flatten)]
    pub config: config::Args,
}

impl Cmd {
    pub async fn run(&self, print: &Print) -> Result<(), Error> {
        let signed = match &self.xdr {
            Some(xdr) => xdr.clone(),
            None => {
                let mut buf = String::new();
                io::stdin().read_to_string(&mut buf).map_err(Error::Stdin)?;
                buf
            }
        };
        if signed.trim().is_empty() {
            return Err(Error::NoTransaction);
        }

        let orders = Orders::from_config(self.config.config())?;
        let policy = PollPolicy::new(self.max_attempts, Duration::from_millis(self.interval_ms));
        print.globeln(format!(
            "Submitting transaction to {}",
            orders.config().rpc_url
        ));
        let outcome = orders.submit(&signed, &policy).await?;
        print.log_outcome(&outcome);
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        Ok(())
    }
}
