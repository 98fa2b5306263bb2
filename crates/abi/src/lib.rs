pub use erc20::IERC20;
pub use pool::IUniswapV3Pool;
pub use position_manager::INonfungiblePositionManager;

mod erc20;
mod pool;
mod position_manager;
