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
pub enum DispositionKind {
    #[sea_orm(string_value = "ship")]
    Ship,
    #[sea_orm(string_value = "convert_to_credit")]
    ConvertToCredit,
}

impl std::fmt::Display for DispositionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispositionKind::Ship => write!(f, "ship"),
            DispositionKind::ConvertToCredit => write!(f, "convert_to_credit"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
#[serde(rename_all = "snake_case")]
pub enum DispositionStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "processing")]
    Processing,
    #[sea_orm(string_value = "shipped")]
    Shipped,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl DispositionStatus {
    /// 发货流程状态机: pending -> processing -> shipped -> completed
    /// 转积分记录创建即 completed, 不再流转
    pub fn can_transition_to(self, next: DispositionStatus) -> bool {
        use DispositionStatus::*;
        matches!(
            (self, next),
            (Pending, Processing) | (Processing, Shipped) | (Shipped, Completed)
        )
    }
}

impl std::fmt::Display for DispositionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispositionStatus::Pending => write!(f, "pending"),
            DispositionStatus::Processing => write!(f, "processing"),
            DispositionStatus::Shipped => write!(f, "shipped"),
            DispositionStatus::Completed => write!(f, "completed"),
        }
    }
}

/// 处置记录实体
/// slot_id 唯一索引保证每个槽位至多一条记录; 并发下后写的一方
/// 会收到唯一键冲突并被映射为 "已处置" 错误
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "disposition_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub slot_id: i64,
    pub kind: DispositionKind,
    pub status: DispositionStatus,
    /// 转积分金额(美分); 发货类为 NULL
    pub credited_amount: Option<i64>,
    pub requested_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fulfillment_transitions_in_order() {
        use DispositionStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Completed));
    }

    #[test]
    fn test_fulfillment_transitions_rejected() {
        use DispositionStatus::*;
        assert!(!Pending.can_transition_to(Shipped));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Processing.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Processing));
        assert!(!Shipped.can_transition_to(Processing));
    }
}
