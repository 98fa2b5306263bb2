pub use amount::AmountPair;
pub use error::KeeperError;
pub use fee::FeeTier;
pub use pool::{PoolRef, PoolState};
pub use position::Position;
pub use settings::KeeperSettings;
pub use token::Token;

mod amount;
mod error;
mod fee;
mod pool;
mod position;
mod settings;
mod token;
