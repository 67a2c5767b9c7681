use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{DrawMode, OfferingStatus, offering_entity};

/// 商品列表查询参数
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct OfferingQuery {
    /// 按状态过滤 (缺省返回 active 与 sold_out)
    pub status: Option<OfferingStatus>,
    /// 页码 (默认 1)
    pub page: Option<u32>,
    /// 每页数量 (默认 20)
    pub page_size: Option<u32>,
}

/// 商品响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OfferingResponse {
    /// 商品ID
    pub id: i64,
    /// 商品名称
    pub name: String,
    /// 单次抽选价格(美分)
    pub price_cents: i64,
    /// 槽位总数
    pub total_slots: i32,
    /// 剩余槽位数
    pub remaining_slots: i32,
    /// 状态
    pub status: OfferingStatus,
    /// 抽选模式 (random / ordered)
    pub draw_mode: DrawMode,
}

impl From<offering_entity::Model> for OfferingResponse {
    fn from(m: offering_entity::Model) -> Self {
        OfferingResponse {
            id: m.id,
            name: m.name,
            price_cents: m.price_cents,
            total_slots: m.total_slots,
            remaining_slots: m.remaining_slots,
            status: m.status,
            draw_mode: m.draw_mode,
        }
    }
}

/// 奖池生成请求中的分布项: 奖品与其相对权重
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct DistributionEntry {
    /// 奖品ID
    pub outcome_id: i64,
    /// 相对权重 (必须为正)
    pub weight: i32,
}

/// 奖池生成请求
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct GenerateSlotsRequest {
    /// 槽位总数
    pub total_slots: i32,
    /// 奖品分布 (每个奖品至少占一个槽位, 余量按权重随机)
    pub distribution: Vec<DistributionEntry>,
    /// 保留的槽位编号 (重新生成时不会被改动)
    #[serde(default)]
    pub locked_slot_numbers: Vec<i32>,
}

/// 奖池生成响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GenerateSlotsResponse {
    /// 商品ID
    pub offering_id: i64,
    /// 生成后的槽位总数
    pub total_slots: i32,
    /// 本次新生成的槽位数
    pub generated: i32,
    /// 被保留的槽位数
    pub locked: i32,
}

/// 槽位重新编号请求
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RenumberRequest {
    /// 目标编号 (1..=total_slots)
    pub new_number: i32,
}

/// 单个槽位的编号变更
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SlotMoveResponse {
    /// 槽位ID
    pub slot_id: i64,
    /// 变更后的编号
    pub new_number: i32,
}

/// 槽位重新编号响应 (含级联移动的槽位)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenumberResponse {
    /// 本次全部编号变更 (请求槽位与被挤走的槽位)
    pub moves: Vec<SlotMoveResponse>,
}
