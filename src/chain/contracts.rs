//! Contract interfaces: pair factory, pool pair, exchange proxy and the bot's
//! own settlement contract.

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IUniswapV2Factory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
    }

    #[sol(rpc)]
    interface IUniswapV2Pair {
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
    }

    /// Native limit order. Field order MUST match the exchange's struct.
    #[derive(Debug, PartialEq, Eq)]
    struct LimitOrder {
        address makerToken;
        address takerToken;
        uint128 makerAmount;
        uint128 takerAmount;
        uint128 takerTokenFeeAmount;
        address maker;
        address taker;
        address sender;
        address feeRecipient;
        bytes32 pool;
        uint64 expiry;
        uint256 salt;
    }

    /// Field order: signatureType, v, r, s
    #[derive(Debug, PartialEq, Eq)]
    struct LimitOrderSignature {
        uint8 signatureType;
        uint8 v;
        bytes32 r;
        bytes32 s;
    }

    interface IZeroExProxy {
        function fillLimitOrder(
            LimitOrder order,
            LimitOrderSignature signature,
            uint128 takerTokenFillAmount
        ) external payable returns (uint128 takerTokenFilledAmount, uint128 makerTokenFilledAmount);
    }

    /// Buys the maker side on the exchange and unwinds it through the pool
    interface IArbBot {
        function startTrade(uint256 takerAmount, uint256 makerAmount, bytes zeroXData) external;
    }
}
