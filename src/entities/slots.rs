use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 奖池槽位 (Slot) 实体
/// 概念说明:
/// - slot_number: 在 (offering_id, slot_number) 上唯一,
///   全部槽位编号构成 [1, total_slots] 的一个排列
/// - claimed_by: NULL 表示未领取; 领取后绑定玩家并写入处置期限
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "slots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub offering_id: i64,
    pub slot_number: i32,
    pub outcome_id: i64,
    pub claimed_by: Option<i64>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub disposition_deadline: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model {
    /// 是否已被领取
    pub fn is_claimed(&self) -> bool {
        self.claimed_by.is_some()
    }

    /// 处置期限是否已过
    pub fn is_deadline_passed(&self, now: DateTime<Utc>) -> bool {
        match self.disposition_deadline {
            Some(deadline) => now > deadline,
            None => false,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
