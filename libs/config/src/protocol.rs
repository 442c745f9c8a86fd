//! Pair protocol constants
//!
//! Every value here is part of the pair's observable arithmetic. Off-ledger
//! callers that pre-compute swap parameters depend on them being bit-exact,
//! so they are constants rather than settings.

/// Shares permanently minted to the liquidity sink on the first deposit
pub const MINIMUM_LIQUIDITY: u64 = 1_000;

/// Liquidity sink receiving the locked minimum liquidity (the zero address)
pub const LIQUIDITY_SINK: [u8; 20] = [0u8; 20];

/// Swap fee parameters (0.2% retained in reserves)
pub mod fees {
    /// Denominator shared by the quote formulas and the swap invariant
    pub const FEE_DENOMINATOR: u64 = 1_000;

    /// Units per `FEE_DENOMINATOR` deducted from every exchange input
    pub const FEE_NUMERATOR: u64 = 2;

    /// Units per `FEE_DENOMINATOR` of input that count towards the output
    pub const INPUT_MULTIPLIER: u64 = FEE_DENOMINATOR - FEE_NUMERATOR;

    /// Protocol fee takes 1 / (PROTOCOL_FEE_DIVISOR + 1) of the growth in sqrt(k)
    pub const PROTOCOL_FEE_DIVISOR: u64 = 5;
}

/// Fixed-point layout of reserves and price accumulators
pub mod fixed_point {
    /// Bit width of a committed reserve
    pub const RESERVE_BITS: usize = 112;

    /// Fractional bits of the UQ112x112 price encoding
    pub const RESOLUTION: usize = 112;

    /// Timestamps are stored modulo 2^TIMESTAMP_BITS
    pub const TIMESTAMP_BITS: u32 = 32;
}
