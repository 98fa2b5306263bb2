use std::env;
use std::process::exit;

use alloy::network::EthereumWallet;
use alloy::providers::ProviderBuilder;
use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::U256;
use clap::Parser;
use eyre::Result;
use rangekeeper_chain::{ChainClient, NodeClient};
use rangekeeper_types::{KeeperError, KeeperSettings};
use rangekeeper_workflows::{
    inspect_position, open_position, rebalance_position, withdraw_position, OpenParams, RebalanceParams, WithdrawParams,
};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};
use url::Url;

use crate::cli::{AppArgs, Command};
use crate::config::KeeperConfig;

mod cli;
mod config;

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,alloy_rpc_client=off,alloy_transport_http=off,hyper_util=off".into());
    let fmt_layer = fmt::Layer::default().with_file(false).with_line_number(false).with_filter(env_filter);
    tracing_subscriber::registry().with(fmt_layer).init();

    let args = AppArgs::parse();
    let config = KeeperConfig::load_from_file(args.config.clone())?;

    let private_key = env::var(&config.signer.env)
        .map_err(|_| eyre::eyre!("signing key expected in environment variable {}", config.signer.env))?;
    let signer: PrivateKeySigner = private_key.parse()?;
    let caller = signer.address();
    let wallet = EthereumWallet::from(signer);
    let rpc_url = Url::parse(&config.chain.rpc_url)?;
    let provider = ProviderBuilder::new().with_recommended_fillers().wallet(wallet).on_http(rpc_url);

    let settings = config.to_settings(caller)?;
    let client = NodeClient::new(provider, settings.position_manager, caller);
    info!(chain_id = settings.chain_id, pool = %settings.pool.address, %caller, "rangekeeper starting");

    if let Err(e) = run(&settings, &client, args.command).await {
        error!(%e, "operation failed");
        exit(1);
    }
    Ok(())
}

async fn run<C: ChainClient>(settings: &KeeperSettings, client: &C, command: Command) -> Result<(), KeeperError> {
    match command {
        Command::Open { lower, upper, size, slippage } => {
            let params = OpenParams { price_lower: lower, price_upper: upper, size, slippage };
            let outcome = open_position(settings, client, &params).await?;
            println!("opened position {} over ticks [{}, {}]", outcome.token_id, outcome.tick_lower, outcome.tick_upper);
            println!("  liquidity : {}", outcome.liquidity);
            println!(
                "  deposited : {} {} / {} {}",
                outcome.desired.amount0, settings.pool.token0.symbol, outcome.desired.amount1, settings.pool.token1.symbol
            );
            println!("  tx        : {}", outcome.tx_hash);
        }
        Command::Inspect { token_id } => {
            let snapshot = inspect_position(settings, client, U256::from(token_id)).await?;
            println!("position {}", snapshot.token_id);
            println!("  liquidity     : {}", snapshot.liquidity);
            println!(
                "  price range   : [{:.6}, {:.6}] (ticks {} .. {})",
                snapshot.price_lower, snapshot.price_upper, snapshot.tick_lower, snapshot.tick_upper
            );
            println!(
                "  current price : {:.6} ({})",
                snapshot.price_current,
                if snapshot.in_range { "in range" } else { "out of range" }
            );
            println!(
                "  composition   : {:.1}% {} / {:.1}% {}",
                snapshot.token0_share * 100.0,
                settings.pool.token0.symbol,
                snapshot.token1_share * 100.0,
                settings.pool.token1.symbol
            );
            println!("  owed          : {} / {}", snapshot.tokens_owed0, snapshot.tokens_owed1);
            println!("  fee growth    : {} / {}", snapshot.fee_growth_inside0_x128, snapshot.fee_growth_inside1_x128);
        }
        Command::Rebalance { token_id, lower, upper, slippage } => {
            let params = RebalanceParams { token_id: U256::from(token_id), price_lower: lower, price_upper: upper, slippage };
            let outcome = rebalance_position(settings, client, &params).await?;
            println!("rebalanced position {} -> {}", outcome.old_token_id, outcome.new_token_id);
            println!("  new ticks : [{}, {}]", outcome.tick_lower, outcome.tick_upper);
            println!("  collected : {} / {}", outcome.collected.amount0, outcome.collected.amount1);
            println!("  redeployed: {} / {}", outcome.redeployed.amount0, outcome.redeployed.amount1);
        }
        Command::Withdraw { token_id, percentage, keep_fees } => {
            let params = WithdrawParams { token_id: U256::from(token_id), percentage, collect_fees: !keep_fees };
            let outcome = withdraw_position(settings, client, &params).await?;
            println!("withdrew {percentage}% of position {token_id}");
            println!("  principal : {} / {}", outcome.withdrawn.amount0, outcome.withdrawn.amount1);
            println!("  collected : {} / {}", outcome.collected.amount0, outcome.collected.amount1);
        }
    }
    Ok(())
}
