pub use inspect::{inspect_position, PositionSnapshot};
pub use open::{open_position, OpenOutcome, OpenParams};
pub use rebalance::{rebalance_position, RebalanceOutcome, RebalanceParams};
pub use withdraw::{withdraw_position, WithdrawOutcome, WithdrawParams};

mod inspect;
mod open;
mod rebalance;
mod withdraw;

use alloy_primitives::{Address, U256};
use rangekeeper_chain::{ChainClient, Erc20ApproveCall, WriteCall};
use rangekeeper_types::{KeeperError, KeeperSettings};
use tracing::debug;

/// Absolute expiry for a write call, minutes in the future.
fn deadline(settings: &KeeperSettings) -> u64 {
    chrono::Utc::now().timestamp() as u64 + settings.deadline_secs
}

/// Issues an ERC-20 approval only when the registry's allowance is short.
/// The approval is its own transaction: if a later step fails, the allowance
/// stays observable on-chain and is simply reused on retry.
async fn ensure_allowance<C: ChainClient>(client: &C, settings: &KeeperSettings, token: Address, needed: U256) -> Result<(), KeeperError> {
    if needed.is_zero() {
        return Ok(());
    }
    let current = client.erc20_allowance(token, client.caller(), settings.position_manager).await?;
    if current >= needed {
        debug!(%token, %current, "allowance sufficient");
        return Ok(());
    }
    debug!(%token, %current, %needed, "approving position manager");
    let pending = client
        .submit(WriteCall::ApproveErc20(Erc20ApproveCall { token, spender: settings.position_manager, amount: needed }))
        .await?;
    client.confirm(pending).await?;
    Ok(())
}

/// Price bounds quantize independently; when the base token is token1 a
/// higher human price maps to a lower tick, so the pair is ordered after
/// conversion. A range that collapses onto one tick is unusable.
fn order_ticks(tick_a: i32, tick_b: i32) -> Result<(i32, i32), KeeperError> {
    let (lower, upper) = if tick_a <= tick_b { (tick_a, tick_b) } else { (tick_b, tick_a) };
    if lower == upper {
        return Err(KeeperError::InvalidRange { lower: lower.to_string(), upper: upper.to_string() });
    }
    Ok((lower, upper))
}
