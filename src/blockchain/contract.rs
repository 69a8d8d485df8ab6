//! Binding for the badge contract.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::blockchain::types::{ChainError, ChainResult};

sol! {
    /// ERC-1155 style badge collection with a daily mint.
    interface IBaseBadge {
        function balanceOf(address account, uint256 id) external view returns (uint256);
        function mintDailyBadge(string answer) external;
    }
}

/// Calldata for `balanceOf(account, badge_id)`.
pub fn balance_of_calldata(account: Address, badge_id: u64) -> Bytes {
    IBaseBadge::balanceOfCall {
        account,
        id: U256::from(badge_id),
    }
    .abi_encode()
    .into()
}

pub fn decode_balance(data: &[u8]) -> ChainResult<U256> {
    IBaseBadge::balanceOfCall::abi_decode_returns(data)
        .map_err(|e| ChainError::Contract(format!("Unexpected balanceOf return data: {}", e)))
}

/// Calldata for `mintDailyBadge(answer)`.
pub fn mint_calldata(answer: &str) -> Bytes {
    IBaseBadge::mintDailyBadgeCall {
        answer: answer.to_string(),
    }
    .abi_encode()
    .into()
}
