use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::draw_record_entity;

use super::PaginatedResponse;

/// 抽选请求
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AllocateRequest {
    /// 抽选数量 (1 或连抽数量)
    pub count: i32,
}

/// 单个抽中的奖品 (含槽位信息, 供前端演出选择)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DrawnOutcome {
    /// 槽位ID
    pub slot_id: i64,
    /// 槽位编号
    pub slot_number: i32,
    /// 奖品等级
    pub tier: String,
    /// 奖品名称
    pub name: String,
    /// 转积分面值(美分)
    pub credit_value_cents: i64,
}

/// 抽选响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DrawResponse {
    /// 本次抽选的引用ID (同批次记录共享)
    pub draw_ref: String,
    /// 抽中的奖品列表
    pub outcomes: Vec<DrawnOutcome>,
    /// 抽选后的剩余槽位数
    pub remaining_slots: i32,
}

/// 抽选历史查询参数
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct DrawRecordQuery {
    /// 页码 (默认 1)
    pub page: Option<u32>,
    /// 每页数量 (默认 20)
    pub page_size: Option<u32>,
}

/// 抽选历史记录响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DrawRecordResponse {
    /// 记录ID
    pub id: i64,
    /// 抽选引用ID
    pub draw_ref: String,
    /// 商品ID
    pub offering_id: i64,
    /// 槽位ID
    pub slot_id: i64,
    /// 奖品等级 (历史快照)
    pub outcome_tier: String,
    /// 奖品名称 (历史快照)
    pub outcome_name: String,
    /// 面值(美分)
    pub credit_value_cents: i64,
    /// 抽选时间
    pub created_at: DateTime<Utc>,
}

impl From<draw_record_entity::Model> for DrawRecordResponse {
    fn from(m: draw_record_entity::Model) -> Self {
        DrawRecordResponse {
            id: m.id,
            draw_ref: m.draw_ref,
            offering_id: m.offering_id,
            slot_id: m.slot_id,
            outcome_tier: m.outcome_tier,
            outcome_name: m.outcome_name,
            credit_value_cents: m.credit_value_cents,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// 抽选历史分页响应
pub type DrawRecordPageResponse = PaginatedResponse<DrawRecordResponse>;
