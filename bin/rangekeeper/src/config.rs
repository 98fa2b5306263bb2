use std::fs;

use alloy_primitives::Address;
use eyre::{eyre, Result};
use rangekeeper_types::{FeeTier, KeeperSettings, PoolRef, Token};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub rpc_url: String,
}

/// The signing key is never placed in the file, only the name of the
/// environment variable holding it.
#[derive(Clone, Debug, Deserialize)]
pub struct SignerConfig {
    pub env: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TokenConfig {
    pub address: String,
    pub decimals: u8,
    pub symbol: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TokensConfig {
    pub base: TokenConfig,
    pub quote: TokenConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PoolConfig {
    pub address: String,
    pub fee: FeeTier,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ManagerConfig {
    pub address: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_slippage")]
    pub slippage: f64,
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        DefaultsConfig { slippage: default_slippage(), deadline_secs: default_deadline_secs() }
    }
}

fn default_slippage() -> f64 {
    0.005
}

fn default_deadline_secs() -> u64 {
    600
}

#[derive(Clone, Debug, Deserialize)]
pub struct KeeperConfig {
    pub chain: ChainConfig,
    pub signer: SignerConfig,
    pub tokens: TokensConfig,
    pub pool: PoolConfig,
    pub manager: ManagerConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl KeeperConfig {
    pub fn load_from_file(file_name: String) -> Result<KeeperConfig> {
        let contents = fs::read_to_string(file_name)?;
        let config: KeeperConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn to_settings(&self, recipient: Address) -> Result<KeeperSettings> {
        let parse_token = |cfg: &TokenConfig| -> Result<Token> {
            let address =
                cfg.address.parse::<Address>().map_err(|e| eyre!("bad address {} for {}: {e}", cfg.address, cfg.symbol))?;
            Ok(Token::new(self.chain.chain_id, address, cfg.decimals, cfg.symbol.clone()))
        };
        let base = parse_token(&self.tokens.base)?;
        let quote = parse_token(&self.tokens.quote)?;
        let pool_address = self.pool.address.parse::<Address>().map_err(|e| eyre!("bad pool address {}: {e}", self.pool.address))?;
        let position_manager =
            self.manager.address.parse::<Address>().map_err(|e| eyre!("bad manager address {}: {e}", self.manager.address))?;
        let pool = PoolRef::new(pool_address, base.clone(), quote.clone(), self.pool.fee)?;

        Ok(KeeperSettings {
            chain_id: self.chain.chain_id,
            pool,
            base,
            quote,
            position_manager,
            recipient,
            default_slippage: self.defaults.slippage,
            deadline_secs: self.defaults.deadline_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[chain]
chain_id = 1
rpc_url = "http://localhost:8545"

[signer]
env = "PRIVATE_KEY"

[tokens.base]
address = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"
decimals = 18
symbol = "WETH"

[tokens.quote]
address = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
decimals = 6
symbol = "USDC"

[pool]
address = "0x88e6A0c2dDD26FEEb64F039a2c41296FcB3f5640"
fee = "medium"

[manager]
address = "0xC36442b4a4522E871399CD717aBDD847Ab11FE88"
"#;

    #[test]
    fn parses_and_resolves_settings() {
        let config: KeeperConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.pool.fee, FeeTier::Medium);
        assert_eq!(config.defaults.slippage, 0.005);
        let settings = config.to_settings(Address::repeat_byte(0x11)).unwrap();
        // sorted pair: USDC has the lower address
        assert_eq!(settings.pool.token0.symbol, "USDC");
        assert_eq!(settings.base.symbol, "WETH");
        assert_eq!(settings.deadline_secs, 600);
    }
}
