//! Vault factory and vault contract bindings.

use alloy::sol;

sol! {
    /// Factory deploying a vault clone per user.
    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface IVaultFactory {
        /// Emitted once per deployed vault clone.
        event VaultCreated(address indexed user, address indexed vault);
    }
}

sol! {
    /// Vault clone created by [`IVaultFactory`].
    #[sol(rpc)]
    #[derive(Debug, PartialEq, Eq)]
    interface IVault {
        /// Quote asset deposited, vault shares minted to the user.
        event Deposit(address indexed user, uint256 quoteAmount, uint256 sharesMinted);

        /// Vault shares burned, quote and base assets returned to the user.
        event Withdraw(
            address indexed user,
            uint256 quoteReturned,
            uint256 baseReturned,
            uint256 sharesBurned
        );

        /// Owner-initiated rebalance.
        event Rebalance();

        /// Permissionless rebalance.
        event Rebalanced();

        /// Total amount of the underlying asset managed by the vault.
        function totalAssets() external view returns (uint256);

        /// Total amount of vault shares issued.
        function totalSupply() external view returns (uint256);
    }
}
