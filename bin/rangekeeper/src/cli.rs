use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name="Rangekeeper", version, about = "Manage one concentrated-liquidity position", long_about = None)]
pub struct AppArgs {
    #[arg(long, default_value = "config.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open a new position over a price range
    Open {
        /// Lower price bound, quote per base
        #[arg(long)]
        lower: String,
        /// Upper price bound, quote per base
        #[arg(long)]
        upper: String,
        /// Liquidity sizing input, a positive decimal
        #[arg(long)]
        size: String,
        /// Slippage tolerance override, e.g. 0.005
        #[arg(long)]
        slippage: Option<f64>,
    },
    /// Show the live state of a position
    Inspect {
        #[arg(long)]
        token_id: u128,
    },
    /// Move all liquidity of a position onto a new price range
    Rebalance {
        #[arg(long)]
        token_id: u128,
        #[arg(long)]
        lower: String,
        #[arg(long)]
        upper: String,
        #[arg(long)]
        slippage: Option<f64>,
    },
    /// Remove liquidity and collect what is owed
    Withdraw {
        #[arg(long)]
        token_id: u128,
        /// Share of the liquidity to remove, 1-100
        #[arg(long, default_value_t = 100)]
        percentage: u8,
        /// Leave accrued fees uncollected
        #[arg(long)]
        keep_fees: bool,
    },
}
