use crate::assemble::{self, assemble, prepare};
use crate::config::{self, Config, PublicConfig};
use crate::invocation::{
    self, CancelOrderRequest, Invocation, SimpleTriggerRequest, TrailingStopRequest,
    TriggerOneRequest,
};
use crate::rpc::{self, Rpc};
use crate::submit::{self, Outcome, PollPolicy};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] config::Error),
    #[error(transparent)]
    Invocation(#[from] invocation::Error),
    #[error(transparent)]
    Assemble(#[from] assemble::Error),
    #[error(transparent)]
    Submit(#[from] submit::Error),
}

/// The operations offered to callers: build an unsigned transaction for one of the contract
/// functions, or submit a signed one.
///
/// Holds the only two pieces of shared state, the configuration and the RPC handle, and
/// never mutates either, so one `Orders` can serve any number of concurrent calls.
pub struct Orders<R> {
    rpc: R,
    config: Config,
}

impl Orders<rpc::Client> {
    pub fn from_config(config: Config) -> Result<Self, Error> {
        let rpc = config.rpc_client()?;
        Ok(Self::new(rpc, config))
    }
}

impl<R: Rpc> Orders<R> {
    pub fn new(rpc: R, config: Config) -> Self {
        Self { rpc, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn public_config(&self) -> PublicConfig {
        self.config.public()
    }

    pub async fn build_create_simple_trigger(
        &self,
        req: &SimpleTriggerRequest,
    ) -> Result<String, Error> {
        self.build(invocation::create_simple_trigger(&self.config, req)?)
            .await
    }

    pub async fn build_cancel_order(&self, req: &CancelOrderRequest) -> Result<String, Error> {
        self.build(invocation::cancel_order(&self.config, req)?)
            .await
    }

    pub async fn build_trigger_one(&self, req: &TriggerOneRequest) -> Result<String, Error> {
        self.build(invocation::trigger_one(&self.config, req)?)
            .await
    }

    pub async fn build_create_trailing(&self, req: &TrailingStopRequest) -> Result<String, Error> {
        self.build(invocation::create_trailing_stop_loss(&self.config, req)?)
            .await
    }

    pub async fn submit(&self, signed: &str, policy: &PollPolicy) -> Result<Outcome, Error> {
        Ok(submit::submit(&self.rpc, &self.config.network_passphrase, signed, policy).await?)
    }

    async fn build(&self, invocation: Invocation) -> Result<String, Error> {
        let envelope = assemble(
            &self.rpc,
            &invocation,
            &invocation.source,
            &self.config.network_passphrase,
        )
        .await?;
        let prepared = prepare(&self.rpc, envelope).await?;
        tracing::debug!(hash = %prepared.hash()?, "built {} transaction", invocation.function);
        Ok(prepared.to_xdr_base64()?)
    }
}
