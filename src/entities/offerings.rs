use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
#[serde(rename_all = "snake_case")]
pub enum OfferingStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "sold_out")]
    SoldOut,
    #[sea_orm(string_value = "archived")]
    Archived,
}

impl std::fmt::Display for OfferingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OfferingStatus::Draft => write!(f, "draft"),
            OfferingStatus::Active => write!(f, "active"),
            OfferingStatus::SoldOut => write!(f, "sold_out"),
            OfferingStatus::Archived => write!(f, "archived"),
        }
    }
}

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    #[sea_orm(string_value = "random")]
    Random,
    #[sea_orm(string_value = "ordered")]
    Ordered,
}

impl std::fmt::Display for DrawMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawMode::Random => write!(f, "random"),
            DrawMode::Ordered => write!(f, "ordered"),
        }
    }
}

/// 商品 (Offering) 实体
/// 概念说明:
/// - total_slots: 奖池槽位总数
/// - remaining_slots: 剩余未领取槽位数, 仅由抽选分配器扣减
/// - status: draft 阶段可重新生成奖池; 只有 active 可被抽选
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "offerings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    /// 单次抽选价格(美分), 仅供展示; 支付在本服务之外
    pub price_cents: i64,
    pub total_slots: i32,
    pub remaining_slots: i32,
    pub status: OfferingStatus,
    pub draw_mode: DrawMode,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// 是否可被抽选
    pub fn is_active(&self) -> bool {
        self.status == OfferingStatus::Active
    }

    /// 是否允许重新生成奖池 (仅 draft)
    pub fn allows_regeneration(&self) -> bool {
        self.status == OfferingStatus::Draft
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
