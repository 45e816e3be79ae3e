//! Live chain gateway over an alloy provider with a local signing wallet

use alloy::network::{ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, TxHash};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::str::FromStr;
use tracing::{debug, info};

use super::contracts::{IUniswapV2Factory, IUniswapV2Pair};
use super::{ChainGateway, PoolReserves, SettlementCall, SettlementReceipt};
use crate::arbitrage::pricing::GasQuote;
use crate::config::AccountConfig;

pub struct AlloyGateway {
    provider: DynProvider,
    pair: IUniswapV2Pair::IUniswapV2PairInstance<DynProvider>,
    bot: Address,
    wallet: Address,
    chain_id: u64,
    /// Pairs sort their tokens by address; true when the taker token is token0
    base_is_token0: bool,
}

impl AlloyGateway {
    /// Connect to the node, unlock the wallet and resolve the pool pair
    pub async fn connect(config: &AccountConfig) -> Result<Self> {
        let addresses = config.addresses()?;
        let chain_id = config.bot.chain_id;

        let key = config.wallet.private_key.trim();
        let signer = PrivateKeySigner::from_str(key.strip_prefix("0x").unwrap_or(key))
            .context("invalid wallet private key")?
            .with_chain_id(Some(chain_id));

        let wallet = signer.address();
        if wallet != addresses.wallet {
            bail!(
                "private key controls {} but PUBLIC_ADDRESS is {}",
                wallet,
                addresses.wallet
            );
        }

        let provider = ProviderBuilder::new()
            .wallet(signer)
            .connect(&config.node.endpoint)
            .await
            .context("failed to connect to network endpoint")?
            .erased();

        let factory = IUniswapV2Factory::new(addresses.pair_factory, provider.clone());
        let pair_address = factory
            .getPair(addresses.quote_token, addresses.base_token)
            .call()
            .await
            .context("getPair failed")?;
        if pair_address == Address::ZERO {
            bail!(
                "no pool for {} / {}",
                addresses.quote_token,
                addresses.base_token
            );
        }

        info!(
            pair = %pair_address,
            bot = %addresses.bot,
            wallet = %wallet,
            chain_id,
            "⛓️ Chain gateway connected"
        );

        Ok(Self {
            pair: IUniswapV2Pair::new(pair_address, provider.clone()),
            provider,
            bot: addresses.bot,
            wallet,
            chain_id,
            base_is_token0: addresses.base_token < addresses.quote_token,
        })
    }

    pub fn wallet(&self) -> Address {
        self.wallet
    }

    fn settlement_request(&self, call: &SettlementCall) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(self.wallet)
            .with_to(self.bot)
            .with_input(call.start_trade_calldata())
    }
}

#[async_trait]
impl ChainGateway for AlloyGateway {
    async fn pool_reserves(&self) -> Result<PoolReserves> {
        let reserves = self
            .pair
            .getReserves()
            .call()
            .await
            .context("getReserves failed")?;

        let r0 = reserves.reserve0.to::<u128>();
        let r1 = reserves.reserve1.to::<u128>();
        let (reserve_a, reserve_b) = if self.base_is_token0 { (r0, r1) } else { (r1, r0) };

        debug!(reserve_a, reserve_b, "Pool reserves");
        Ok(PoolReserves {
            reserve_a,
            reserve_b,
        })
    }

    async fn gas_price(&self) -> Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .context("eth_gasPrice failed")
    }

    async fn estimate_settlement_gas(&self, call: &SettlementCall) -> Result<u64> {
        self.provider
            .estimate_gas(self.settlement_request(call))
            .await
            .context("startTrade gas estimation failed")
    }

    async fn nonce(&self) -> Result<u64> {
        self.provider
            .get_transaction_count(self.wallet)
            .await
            .context("eth_getTransactionCount failed")
    }

    async fn submit_settlement(
        &self,
        call: &SettlementCall,
        gas: &GasQuote,
        nonce: u64,
    ) -> Result<TxHash> {
        let tx = self
            .settlement_request(call)
            .with_chain_id(self.chain_id)
            .with_nonce(nonce)
            .with_gas_limit(gas.gas_estimate)
            .with_gas_price(gas.gas_price);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .context("failed to broadcast settlement")?;

        Ok(*pending.tx_hash())
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<SettlementReceipt> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .get_receipt()
            .await
            .context("failed to fetch settlement receipt")?;

        Ok(SettlementReceipt {
            tx_hash,
            success: receipt.status(),
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }
}
