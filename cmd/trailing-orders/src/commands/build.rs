use serde_json::Number;

use crate::config;
use crate::invocation::{
    CancelOrderRequest, SimpleTriggerRequest, TrailingStopRequest, TriggerOneRequest,
};
use crate::oracle::OracleTicker;
use crate::orders::{self, Orders};
use crate::print::Print;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Orders(#[from] orders::Error),
}

#[derive(Debug, clap::Subcommand)]
pub enum Cmd {
    /// Build a `create_simple_trigger` call: sell once the price crosses a fixed trigger
    SimpleTrigger(SimpleTrigger),
    /// Build a `cancel_order` call
    Cancel(Cancel),
    /// Build a `trigger_one` call that executes a single order if its condition is met
    TriggerOne(TriggerOne),
    /// Build a `create_trailing_stop_loss` call
    Trailing(Trailing),
}

impl Cmd {
    pub async fn run(&self, print: &Print) -> Result<(), Error> {
        let (config, description) = match self {
            Cmd::SimpleTrigger(cmd) => (&cmd.config, "create_simple_trigger"),
            Cmd::Cancel(cmd) => (&cmd.config, "cancel_order"),
            Cmd::TriggerOne(cmd) => (&cmd.config, "trigger_one"),
            Cmd::Trailing(cmd) => (&cmd.config, "create_trailing_stop_loss"),
        };
        let orders = Orders::from_config(config.config())?;
        print.searchln(format!("Simulating {description} transaction…"));
        let xdr = match self {
            Cmd::SimpleTrigger(cmd) => orders.build_create_simple_trigger(&cmd.request()).await?,
            Cmd::Cancel(cmd) => orders.build_cancel_order(&cmd.request()).await?,
            Cmd::TriggerOne(cmd) => orders.build_trigger_one(&cmd.request()).await?,
            Cmd::Trailing(cmd) => orders.build_create_trailing(&cmd.request()).await?,
        };
        print.checkln("Transaction ready to sign");
        println!("{xdr}");
        Ok(())
    }
}

#[derive(Debug, clap::Parser, Clone)]
#[group(skip)]
pub struct SimpleTrigger {
    /// Account that owns the order and submits the transaction
    #[arg(long)]
    pub owner: String,
    /// Contract address of the asset to sell
    #[arg(long)]
    pub sell_asset: String,
    /// Contract address of the asset to buy
    #[arg(long)]
    pub buy_asset: String,
    /// Amount to sell, in the asset's smallest unit
    #[arg(long, allow_hyphen_values = true)]
    pub amount_to_sell: String,
    #[arg(long, allow_hyphen_values = true)]
    pub trigger_price: String,
    #[command(flatten)]
    pub config: config::Args,
}

impl SimpleTrigger {
    fn request(&self) -> SimpleTriggerRequest {
        SimpleTriggerRequest {
            owner: self.owner.clone(),
            sell_asset: self.sell_asset.clone(),
            buy_asset: self.buy_asset.clone(),
            amount_to_sell: self.amount_to_sell.clone(),
            trigger_price: self.trigger_price.clone(),
        }
    }
}

#[derive(Debug, clap::Parser, Clone)]
#[group(skip)]
pub struct Cancel {
    #[arg(long)]
    pub owner: String,
    #[arg(long, allow_hyphen_values = true)]
    pub order_id: String,
    #[command(flatten)]
    pub config: config::Args,
}

impl Cancel {
    fn request(&self) -> CancelOrderRequest {
        CancelOrderRequest {
            owner: self.owner.clone(),
            order_id: self.order_id.clone(),
        }
    }
}

#[derive(Debug, clap::Parser, Clone)]
#[group(skip)]
pub struct TriggerOne {
    /// Account that submits the transaction
    #[arg(long)]
    pub caller: String,
    /// Price source, `stellar:<contract address>` or `other:<symbol>`
    #[arg(long)]
    pub oracle: OracleTicker,
    #[arg(long, allow_hyphen_values = true)]
    pub order_id: String,
    /// Accepted slippage in basis points, below 10000
    #[arg(long, allow_hyphen_values = true)]
    pub slip_bps: Number,
    /// Seconds the resulting swap stays valid for
    #[arg(long, allow_hyphen_values = true)]
    pub deadline_secs: Number,
    #[command(flatten)]
    pub config: config::Args,
}

impl TriggerOne {
    fn request(&self) -> TriggerOneRequest {
        TriggerOneRequest {
            caller: self.caller.clone(),
            oracle_ticker: self.oracle.clone(),
            order_id: self.order_id.clone(),
            slip_bps: self.slip_bps.clone(),
            deadline_secs: self.deadline_secs.clone(),
        }
    }
}

#[derive(Debug, clap::Parser, Clone)]
#[group(skip)]
pub struct Trailing {
    #[arg(long)]
    pub owner: String,
    #[arg(long)]
    pub sell_asset: String,
    #[arg(long)]
    pub buy_asset: String,
    #[arg(long, allow_hyphen_values = true)]
    pub amount_to_sell: String,
    /// Distance from the best price seen, in basis points (1 to 9999)
    #[arg(long, allow_hyphen_values = true)]
    pub trail_bps: Number,
    /// Price source, `stellar:<contract address>` or `other:<symbol>`
    #[arg(long)]
    pub oracle: OracleTicker,
    #[command(flatten)]
    pub config: config::Args,
}

impl Trailing {
    fn request(&self) -> TrailingStopRequest {
        TrailingStopRequest {
            owner: self.owner.clone(),
            sell_asset: self.sell_asset.clone(),
            buy_asset: self.buy_asset.clone(),
            amount_to_sell: self.amount_to_sell.clone(),
            trail_bps: self.trail_bps.clone(),
            oracle_ticker: self.oracle.clone(),
        }
    }
}
