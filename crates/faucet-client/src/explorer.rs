//! Block explorer links

/// Explorer used for chains missing from the table
pub const DEFAULT_EXPLORER: &str = "https://etherscan.io";

/// Explorer base URL for a chain id
pub fn explorer_base(chain_id: u64) -> &'static str {
    match chain_id {
        1 => "https://etherscan.io",
        5 => "https://goerli.etherscan.io",
        11155111 => "https://sepolia.etherscan.io",
        137 => "https://polygonscan.com",
        195 => "https://web3.okx.com/explorer/x-layer-testnet",
        196 => "https://web3.okx.com/explorer/x-layer",
        80001 => "https://mumbai.polygonscan.com",
        42161 => "https://arbiscan.io",
        421614 => "https://sepolia.arbiscan.io",
        8453 => "https://basescan.org",
        84532 => "https://sepolia.basescan.org",
        1952 => "https://www.oklink.com/x-layer-testnet",
        _ => DEFAULT_EXPLORER,
    }
}

/// Explorer link for a transaction hash
pub fn tx_url(tx_hash: &str, chain_id: u64) -> String {
    format!("{}/tx/{}", explorer_base(chain_id), tx_hash)
}

/// Explorer link for an account
pub fn address_url(address: &str, chain_id: u64) -> String {
    format!("{}/address/{}", explorer_base(chain_id), address)
}
