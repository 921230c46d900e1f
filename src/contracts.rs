//! Centralized Contract Definitions
//!
//! Solidity interfaces used by the bot, defined with alloy's `sol!` macro.
//! Each interface carries `#[sol(rpc)]` so it can be called through any
//! alloy Provider.
//!
//! Created: 2026-10-18

use alloy::sol;

// ── ERC20 ─────────────────────────────────────────────────────────────

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
    }
}

// ── Uniswap V2 ───────────────────────────────────────────────────────

sol! {
    #[sol(rpc)]
    interface IUniswapV2Factory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
    }
}

sol! {
    #[sol(rpc)]
    interface IUniswapV2Pair {
        event Swap(address indexed sender, uint amount0In, uint amount1In, uint amount0Out, uint amount1Out, address indexed to);

        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
        function token0() external view returns (address);
    }
}

sol! {
    #[sol(rpc)]
    interface IUniswapV2Router02 {
        function getAmountsOut(uint256 amountIn, address[] calldata path) external view returns (uint256[] memory amounts);
    }
}

// ── Settlement contract (two-leg arbitrage, one transaction) ─────────

sol! {
    #[sol(rpc)]
    interface IArbitrage {
        function executeTrade(bool startOnVenueA, address token0, address token1, uint256 flashAmount) external;
    }
}
