use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{DispositionKind, DispositionStatus, disposition_record_entity};

/// 处置请求 (发货或转积分)
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct DispositionRequest {
    /// 处置方式
    pub kind: DispositionKind,
}

/// 处置记录响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DispositionResponse {
    /// 记录ID
    pub id: i64,
    /// 槽位ID
    pub slot_id: i64,
    /// 处置方式
    pub kind: DispositionKind,
    /// 处理状态
    pub status: DispositionStatus,
    /// 转积分金额(美分), 发货类为 NULL
    pub credited_amount: Option<i64>,
    /// 申请时间
    pub requested_at: Option<DateTime<Utc>>,
    /// 完成时间
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<disposition_record_entity::Model> for DispositionResponse {
    fn from(m: disposition_record_entity::Model) -> Self {
        DispositionResponse {
            id: m.id,
            slot_id: m.slot_id,
            kind: m.kind,
            status: m.status,
            credited_amount: m.credited_amount,
            requested_at: m.requested_at,
            processed_at: m.processed_at,
        }
    }
}

/// 待处置奖品响应 (已领取未处置)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PendingPrizeResponse {
    /// 槽位ID
    pub slot_id: i64,
    /// 商品ID
    pub offering_id: i64,
    /// 奖品等级
    pub tier: String,
    /// 奖品名称
    pub name: String,
    /// 转积分可得金额(美分)
    pub credit_value_cents: i64,
    /// 领取时间
    pub claimed_at: Option<DateTime<Utc>>,
    /// 处置期限 (过期自动转积分)
    pub disposition_deadline: Option<DateTime<Utc>>,
}

/// 发货状态更新请求 (管理端)
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdateFulfillmentRequest {
    /// 目标状态 (必须按 pending -> processing -> shipped -> completed 顺序)
    pub status: DispositionStatus,
}

/// 到期扫描结果
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct SweepSummary {
    /// 本次转积分的槽位数
    pub swept_slots: i64,
    /// 涉及玩家数
    pub players: i64,
    /// 转出积分总额(美分)
    pub credited_total_cents: i64,
    /// 失败并跳过的玩家数
    pub failed_players: i64,
}
