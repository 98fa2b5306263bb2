pub use calls::{CallReceipt, CollectCall, DecreaseCall, Erc20ApproveCall, MintCall, Minted, NftApproveCall, PendingCall, WriteCall};
pub use client::ChainClient;
pub use node::NodeClient;

mod calls;
mod client;
pub mod mock;
mod node;
