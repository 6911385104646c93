//! ZRM rewards: the ledger, Early Bird allocations, and wheel spins.
//!
//! All amounts are base-unit decimal strings (NUMERIC(78,0) in Postgres).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const LEDGER_EARLY_BIRD: &str = "early_bird";
pub const LEDGER_WHEEL: &str = "wheel";
pub const LEDGER_ALLOCATION: &str = "allocation";
pub const LEDGER_DEPOSIT: &str = "deposit";
pub const LEDGER_WITHDRAWAL: &str = "withdrawal";

pub const LEDGER_KINDS: [&str; 5] = [
    LEDGER_EARLY_BIRD,
    LEDGER_WHEEL,
    LEDGER_ALLOCATION,
    LEDGER_DEPOSIT,
    LEDGER_WITHDRAWAL,
];

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub wallet_address: Option<String>,
    pub kind: String,
    pub amount: String,
    pub tx_hash: Option<String>,
    pub note: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new ledger row.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry<'a> {
    pub user_id: Option<Uuid>,
    pub wallet_address: Option<&'a str>,
    pub kind: &'a str,
    pub amount: &'a str,
    pub tx_hash: Option<&'a str>,
    pub note: Option<&'a str>,
    pub created_by: Option<Uuid>,
}

/// Sum of ledger amounts for one kind.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LedgerTotal {
    pub kind: String,
    pub entries: i64,
    pub total: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EarlyBirdReward {
    pub id: Uuid,
    pub user_id: Uuid,
    /// 1-based registration position
    pub position: i64,
    pub amount: String,
    pub claimed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WheelSpin {
    pub id: Uuid,
    pub user_id: Uuid,
    pub wallet_address: String,
    pub prize_label: String,
    pub amount: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregate spin history for one wallet.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WheelHistory {
    pub total_spins: i64,
    pub total_won: String,
    pub last_spin_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct WheelStatus {
    pub address: String,
    pub can_spin: bool,
    pub last_spin_at: Option<DateTime<Utc>>,
    pub next_spin_at: Option<DateTime<Utc>>,
    pub total_spins: i64,
    /// Whole-ZRM decimal string
    pub total_won: String,
}

#[derive(Debug, Serialize)]
pub struct SpinResult {
    pub spin: WheelSpin,
    /// Whole-ZRM decimal string
    pub amount_zrm: String,
    pub next_spin_at: DateTime<Utc>,
}

/// Caller's ZRM balance as tracked by the ledger.
#[derive(Debug, Serialize)]
pub struct ZrmBalance {
    pub user_id: Uuid,
    pub balance: String,
    pub balance_zrm: String,
    pub recent: Vec<LedgerEntry>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyTransactionRequest {
    pub tx_hash: String,
    pub from_address: String,
    /// Whole-ZRM decimal string, e.g. "250.5"
    pub amount: String,
    pub user_id: Option<Uuid>,
    /// "deposit" (to treasury) or "allocation" (to the allocation wallet)
    pub kind: String,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AllocateRequest {
    pub user_id: Uuid,
    /// Whole-ZRM decimal string
    pub amount: String,
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LedgerFilter {
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TreasuryOverview {
    pub token_address: Option<String>,
    pub treasury_address: Option<String>,
    pub treasury_balance: Option<String>,
    pub allocation_address: Option<String>,
    pub allocation_balance: Option<String>,
    pub block_number: u64,
    pub ledger: Vec<LedgerTotal>,
}
