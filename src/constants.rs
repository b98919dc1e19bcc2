/// Lamports in one SOL
pub const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// Program IDs
pub mod programs {
    /// Metaplex Token Metadata program
    pub const TOKEN_METADATA: &str = "metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bcq3LtT";
}

/// Default endpoints
pub mod endpoints {
    /// Public explorer JSON-RPC endpoint
    pub const EXPLORER_RPC: &str = "https://explorer-api.mainnet-beta.solana.com/";
    /// Block explorer used for notification links
    pub const EXPLORER_WEB: &str = "https://explorer.solana.com";
}

/// Notification embed defaults
pub mod embed {
    pub const USERNAME: &str = "Solana Explorer Monitor";
    pub const AVATAR_URL: &str = "https://s2.coinmarketcap.com/static/img/coins/64x64/5426.png";
    pub const FOOTER_TEXT: &str = "kx tools";
    pub const COLOR: u32 = 3_553_598;
    pub const DEFAULT_TITLE: &str = "NEW TRANSACTION";
}

/// Instruction types recognised by the classifier
pub mod instructions {
    pub const MINT_TO: &str = "mintTo";
    pub const TRANSFER: &str = "transfer";
}
