//! Pool operations
//!
//! Each file adds one group of entry points to [`crate::state::Pool`].

pub mod burn;
pub mod collect;
pub mod collect_protocol;
pub mod flash;
pub mod increase_observation_cardinality_next;
pub mod initialize;
pub mod mint;
pub mod modify_position;
pub mod observe;
pub mod set_fee_protocol;
pub mod swap;

pub use collect::CollectParams;
pub use collect_protocol::CollectProtocolParams;
pub use flash::FlashParams;
pub use mint::MintParams;
pub use modify_position::check_ticks;
pub use observe::CumulativesInside;
pub use set_fee_protocol::SetFeeProtocolParams;
pub use swap::SwapParams;
