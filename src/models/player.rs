use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::credit_transaction_entity;

/// 玩家余额响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BalanceResponse {
    /// 玩家ID
    pub player_id: i64,
    /// 积分余额(美分)
    pub credit_balance: i64,
}

/// 积分流水查询参数
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreditTransactionQuery {
    /// 页码 (默认 1)
    pub page: Option<u32>,
    /// 每页数量 (默认 20)
    pub page_size: Option<u32>,
}

/// 积分流水响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreditTransactionResponse {
    /// 流水ID
    pub id: i64,
    /// 变动金额(美分)
    pub amount: i64,
    /// 变动后余额(美分)
    pub balance_after: i64,
    /// 关联槽位ID
    pub related_slot_id: Option<i64>,
    /// 说明
    pub description: Option<String>,
    /// 时间
    pub created_at: DateTime<Utc>,
}

impl From<credit_transaction_entity::Model> for CreditTransactionResponse {
    fn from(m: credit_transaction_entity::Model) -> Self {
        CreditTransactionResponse {
            id: m.id,
            amount: m.amount,
            balance_after: m.balance_after,
            related_slot_id: m.related_slot_id,
            description: m.description,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}
