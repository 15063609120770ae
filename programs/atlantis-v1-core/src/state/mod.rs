pub mod config;
pub mod fee_tier;
pub mod oracle;
pub mod pool;
pub mod position;
pub mod tick;
pub mod tick_bitmap;

pub use config::*;
pub use fee_tier::*;
pub use oracle::*;
pub use pool::*;
pub use position::*;
pub use tick::*;
pub use tick_bitmap::*;
