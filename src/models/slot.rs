use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::slot_entity;

/// 槽位列表查询参数 (管理端)
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SlotQuery {
    /// 页码 (默认 1)
    pub page: Option<u32>,
    /// 每页数量 (默认 20)
    pub page_size: Option<u32>,
}

/// 槽位响应 (管理端奖池巡检)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SlotResponse {
    /// 槽位ID
    pub id: i64,
    /// 商品ID
    pub offering_id: i64,
    /// 槽位编号
    pub slot_number: i32,
    /// 绑定的奖品ID
    pub outcome_id: i64,
    /// 领取玩家ID (NULL = 未领取)
    pub claimed_by: Option<i64>,
    /// 领取时间
    pub claimed_at: Option<DateTime<Utc>>,
    /// 处置期限
    pub disposition_deadline: Option<DateTime<Utc>>,
}

impl From<slot_entity::Model> for SlotResponse {
    fn from(m: slot_entity::Model) -> Self {
        SlotResponse {
            id: m.id,
            offering_id: m.offering_id,
            slot_number: m.slot_number,
            outcome_id: m.outcome_id,
            claimed_by: m.claimed_by,
            claimed_at: m.claimed_at,
            disposition_deadline: m.disposition_deadline,
        }
    }
}
