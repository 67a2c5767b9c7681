use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 抽选历史记录实体
/// 同一次 allocate 产生的多条记录共享一个 draw_ref;
/// 奖品名称与面值为历史快照, 不随奖品配置变更
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "draw_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub draw_ref: String,
    pub offering_id: i64,
    pub player_id: i64,
    pub slot_id: i64,
    pub outcome_tier: String,
    pub outcome_name: String,
    pub credit_value_cents: i64,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
