//! Core domain models shared across all Zorium services.
//!
//! These are the "truth" types: what the database stores and the API serializes.

pub mod collection;
pub mod email_token;
pub mod nft;
pub mod notification;
pub mod rewards;
pub mod social;
pub mod stats;
pub mod transaction;
pub mod user;

pub use collection::*;
pub use email_token::*;
pub use nft::*;
pub use notification::*;
pub use rewards::*;
pub use social::*;
pub use stats::*;
pub use transaction::*;
pub use user::*;
