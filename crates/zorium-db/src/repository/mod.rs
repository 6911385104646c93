//! Repository layer: query functions organized by domain.

pub mod collections;
pub mod comments;
pub mod early_bird;
pub mod email_tokens;
pub mod follows;
pub mod ledger;
pub mod likes;
pub mod nfts;
pub mod notifications;
pub mod stats;
pub mod transactions;
pub mod users;
pub mod wheel;
