use alloy_primitives::{Address, U256};
use rangekeeper_types::{KeeperError, PoolState, Position};

use crate::calls::{CallReceipt, PendingCall, WriteCall};

/// The external ledger boundary consumed by the workflows: a handful of
/// reads, plus submit-then-confirm for the typed write calls. Implementations
/// classify their failures into the keeper taxonomy and never retry.
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync {
    /// Address the writes are sent from.
    fn caller(&self) -> Address;

    async fn pool_state(&self, pool: Address) -> Result<PoolState, KeeperError>;

    async fn position(&self, token_id: U256) -> Result<Position, KeeperError>;

    async fn erc20_allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256, KeeperError>;

    async fn owner_of(&self, token_id: U256) -> Result<Address, KeeperError>;

    async fn approved_for(&self, token_id: U256) -> Result<Address, KeeperError>;

    async fn is_approved_for_all(&self, owner: Address, operator: Address) -> Result<bool, KeeperError>;

    async fn submit(&self, call: WriteCall) -> Result<PendingCall, KeeperError>;

    async fn confirm(&self, pending: PendingCall) -> Result<CallReceipt, KeeperError>;
}
