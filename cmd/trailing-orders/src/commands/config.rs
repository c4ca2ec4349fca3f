use crate::config;
use crate::print::Print;
use crate::rpc;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] config::Error),
    #[error(transparent)]
    Rpc(#[from] rpc::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, clap::Parser, Clone)]
#[group(skip)]
pub struct Cmd {
    /// Ask the RPC server which network it serves and fail unless it matches the passphrase
    #[arg(long)]
    pub check: bool,

    #[command(flatten)]
    pub config: config::Args,
}

impl Cmd {
    pub async fn run(&self, print: &Print) -> Result<(), Error> {
        let config = self.config.config();
        if self.check {
            let client = config.rpc_client()?;
            client
                .verify_network_passphrase(Some(&config.network_passphrase))
                .await?;
            print.globeln(format!(
                "{} serves \"{}\"",
                config.rpc_url, config.network_passphrase
            ));
        }
        println!("{}", serde_json::to_string_pretty(&config.public())?);
        Ok(())
    }
}
