//! API route modules.

pub mod admin;
pub mod analytics;
pub mod auth;
pub mod collections;
pub mod health;
pub mod nfts;
pub mod notifications;
pub mod search;
pub mod social;
pub mod transactions;
pub mod users;
pub mod wheel;

use zorium_common::error::{ZoriumError, ZoriumResult};
use zorium_common::pagination::PageParams;

/// `(limit, offset)` for a list endpoint, capped by `limits.max_page_size`.
pub(crate) fn page_window(params: &PageParams) -> (i64, i64) {
    params.resolve(zorium_common::config::get().limits.max_page_size)
}

/// Convert a human ZRM/price amount ("1.5") to a base-unit string.
pub(crate) fn to_base_units(human: &str) -> ZoriumResult<String> {
    let decimals = zorium_common::config::get().chain.zrm_decimals;
    Ok(zorium_chain::zrm::parse_amount(human, decimals)?.to_string())
}

/// Like [`to_base_units`] but rejects zero.
pub(crate) fn positive_base_units(human: &str) -> ZoriumResult<String> {
    let amount = to_base_units(human)?;
    if amount == "0" {
        return Err(ZoriumError::validation("Amount must be greater than zero"));
    }
    Ok(amount)
}

pub(crate) fn format_zrm(base_units: &str) -> String {
    let decimals = zorium_common::config::get().chain.zrm_decimals;
    zorium_chain::zrm::format_base_units(base_units, decimals)
}
