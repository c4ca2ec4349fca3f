use std::str::FromStr;

use clap::{CommandFactory, FromArgMatches, Parser};

use crate::print::Print;

pub mod build;
pub mod config;
pub mod global;
pub mod submit;

pub const HEADING_RPC: &str = "Options (RPC)";
pub const HEADING_GLOBAL: &str = "Options (Global)";

const ABOUT: &str = "Build and submit transactions for the trailing-orders contract";

// long_about is shown when someone uses `--help`; short help when using `-h`
const LONG_ABOUT: &str = "

Build commands simulate the contract call against the configured RPC server and print the \
unsigned transaction envelope as base64 XDR. Sign it with a wallet, then hand the signed \
envelope to `submit`, which sends it and waits for the outcome.

The RPC server, network passphrase and contract id can also be set with the RPC_URL, \
NETWORK_PASSPHRASE and CONTRACT_ID environment variables, or in a `.env` file.";

#[derive(Parser, Debug)]
#[command(
    name = "trailing-orders",
    about = ABOUT,
    version,
    long_about = ABOUT.to_string() + LONG_ABOUT,
    disable_help_subcommand = true,
)]
pub struct Root {
    #[clap(flatten)]
    pub global_args: global::Args,

    #[command(subcommand)]
    pub cmd: Cmd,
}

impl Root {
    pub fn new() -> Result<Self, Error> {
        Self::try_parse().map_err(Error::Clap)
    }

    pub fn from_arg_matches<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::from_arg_matches_mut(&mut Self::command().try_get_matches_from(itr)?)
    }

    pub async fn run(&self) -> Result<(), Error> {
        let print = Print::new(self.global_args.quiet);
        match &self.cmd {
            Cmd::Build(build) => build.run(&print).await?,
            Cmd::Submit(submit) => submit.run(&print).await?,
            Cmd::Config(config) => config.run(&print).await?,
        };
        Ok(())
    }
}

impl FromStr for Root {
    type Err = clap::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_arg_matches(s.split_whitespace())
    }
}

#[derive(Parser, Debug)]
pub enum Cmd {
    /// Build an unsigned transaction for one of the contract's functions
    #[command(subcommand)]
    Build(build::Cmd),
    /// Submit a signed transaction and wait for its outcome
    Submit(submit::Cmd),
    /// Print the configuration builds and submissions use
    Config(config::Cmd),
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Build(#[from] build::Error),
    #[error(transparent)]
    Submit(#[from] submit::Error),
    #[error(transparent)]
    Config(#[from] config::Error),
    #[error(transparent)]
    Clap(#[from] clap::Error),
}
