/*!
 * Payment wall: mobile-money gateway client and the local wallet.
 *
 * - `gateway`: charge initiation and verification against the gateway API
 * - `wallet`: per-profile balances, atomic debits, verified top-ups
 */

// Re-export main types for easier usage
pub use self::gateway::{ChargeOutcome, ChargeState, MomoGateway, MomoProvider};
pub use self::wallet::WalletService;

// Submodules
pub mod gateway;
pub mod wallet;
