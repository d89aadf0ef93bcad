use serde::{Deserialize, Serialize};

/// Creation counters reported by `GET /api/qrcodes/stats/`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_qr_codes: u64,
    pub created_today: u64,
    pub created_this_week: u64,
    pub created_this_month: u64,
}
