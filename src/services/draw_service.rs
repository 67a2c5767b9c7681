use crate::entities::{
    DrawMode, OfferingStatus, draw_record_entity as draw_records, offering_entity as offerings,
    outcome_entity as outcomes, slot_entity as slots,
};
use crate::error::{AppError, AppResult};
use crate::models::{DrawResponse, DrawnOutcome};
use chrono::{Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct DrawService {
    pool: DatabaseConnection,
    /// 领取后处置期限(天)
    disposition_deadline_days: i64,
}

impl DrawService {
    pub fn new(pool: DatabaseConnection, disposition_deadline_days: i64) -> Self {
        Self {
            pool,
            disposition_deadline_days,
        }
    }

    /// 抽选分配 (Allocate)
    ///
    /// 正确性核心: 同一事务内
    /// 1. 条件扣减 remaining_slots (单条 UPDATE, status=active 且
    ///    remaining >= count 才生效) —— 该行锁将同一商品上的并发
    ///    抽选串行化, 不同商品互不阻塞
    /// 2. 选择 count 个未领取槽位 (random: 随机 / ordered: 编号最小)
    /// 3. 带 claimed_by IS NULL 守卫的条件更新完成领取, 行数不符即
    ///    整体回滚 (提交时再校验, 关闭竞态窗口)
    /// 4. 写抽选历史, remaining 归零时翻转 sold_out
    /// 失败路径不产生任何部分领取, 计数不变; 不自动重试
    pub async fn allocate(
        &self,
        offering_id: i64,
        player_id: i64,
        count: i32,
    ) -> AppResult<DrawResponse> {
        if count <= 0 {
            return Err(AppError::ValidationError(
                "Draw count must be positive".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;

        let offering = offerings::Entity::find_by_id(offering_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Offering {offering_id} not found")))?;

        // 条件扣减: 读-改-写会竞态, 必须是单条条件 UPDATE
        let decrement = offerings::Entity::update_many()
            .col_expr(
                offerings::Column::RemainingSlots,
                Expr::col(offerings::Column::RemainingSlots).sub(count),
            )
            .col_expr(offerings::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(offerings::Column::Id.eq(offering_id))
            .filter(offerings::Column::Status.eq(OfferingStatus::Active))
            .filter(offerings::Column::RemainingSlots.gte(count))
            .exec(&txn)
            .await?;

        if decrement.rows_affected == 0 {
            // 区分: 非 active / 库存不足
            if !offering.is_active() {
                return Err(AppError::OfferingNotActive(format!(
                    "offering {} status is {}",
                    offering_id, offering.status
                )));
            }
            return Err(AppError::InsufficientInventory {
                requested: count,
                remaining: offering.remaining_slots,
            });
        }

        // 槽位选择 (扣减行锁已串行化同一商品的并发抽选)
        let base = slots::Entity::find()
            .filter(slots::Column::OfferingId.eq(offering_id))
            .filter(slots::Column::ClaimedBy.is_null());
        let selected = match offering.draw_mode {
            DrawMode::Random => {
                base.order_by(Expr::cust("RANDOM()"), Order::Asc)
                    .limit(count as u64)
                    .all(&txn)
                    .await?
            }
            DrawMode::Ordered => {
                base.order_by_asc(slots::Column::SlotNumber)
                    .limit(count as u64)
                    .all(&txn)
                    .await?
            }
        };

        // 提交时再校验 (计数与槽位集不一致时宁可中止)
        if selected.len() != count as usize {
            return Err(AppError::InsufficientInventory {
                requested: count,
                remaining: selected.len() as i32,
            });
        }

        let now = Utc::now();
        let deadline = now + Duration::days(self.disposition_deadline_days);
        let slot_ids: Vec<i64> = selected.iter().map(|s| s.id).collect();

        let claim = slots::Entity::update_many()
            .col_expr(slots::Column::ClaimedBy, Expr::value(player_id))
            .col_expr(slots::Column::ClaimedAt, Expr::value(now))
            .col_expr(slots::Column::DispositionDeadline, Expr::value(deadline))
            .col_expr(slots::Column::UpdatedAt, Expr::value(now))
            .filter(slots::Column::Id.is_in(slot_ids))
            .filter(slots::Column::ClaimedBy.is_null())
            .exec(&txn)
            .await?;
        if claim.rows_affected != count as u64 {
            return Err(AppError::ConcurrencyConflict(format!(
                "claimed {} of {} selected slots, aborting draw",
                claim.rows_affected, count
            )));
        }

        // 奖品快照
        let outcome_ids: Vec<i64> = selected.iter().map(|s| s.outcome_id).collect();
        let outcome_rows = outcomes::Entity::find()
            .filter(outcomes::Column::Id.is_in(outcome_ids))
            .all(&txn)
            .await?;
        let by_id: HashMap<i64, &outcomes::Model> =
            outcome_rows.iter().map(|o| (o.id, o)).collect();

        let draw_ref = Uuid::new_v4().to_string();
        let mut drawn: Vec<DrawnOutcome> = Vec::with_capacity(selected.len());
        let mut records: Vec<draw_records::ActiveModel> = Vec::with_capacity(selected.len());
        for slot in &selected {
            let outcome = by_id.get(&slot.outcome_id).ok_or_else(|| {
                AppError::InternalError(format!(
                    "Outcome {} bound to slot {} does not exist",
                    slot.outcome_id, slot.id
                ))
            })?;
            drawn.push(DrawnOutcome {
                slot_id: slot.id,
                slot_number: slot.slot_number,
                tier: outcome.tier.clone(),
                name: outcome.name.clone(),
                credit_value_cents: outcome.credit_value_cents,
            });
            records.push(draw_records::ActiveModel {
                draw_ref: Set(draw_ref.clone()),
                offering_id: Set(offering_id),
                player_id: Set(player_id),
                slot_id: Set(slot.id),
                outcome_tier: Set(outcome.tier.clone()),
                outcome_name: Set(outcome.name.clone()),
                credit_value_cents: Set(outcome.credit_value_cents),
                ..Default::default()
            });
        }
        draw_records::Entity::insert_many(records).exec(&txn).await?;

        // 剩余数与售罄翻转
        let remaining = offerings::Entity::find_by_id(offering_id)
            .one(&txn)
            .await?
            .map(|o| o.remaining_slots)
            .ok_or_else(|| {
                AppError::InternalError(format!("Offering {offering_id} disappeared mid-draw"))
            })?;
        if remaining == 0 {
            offerings::Entity::update_many()
                .col_expr(
                    offerings::Column::Status,
                    Expr::value(OfferingStatus::SoldOut),
                )
                .col_expr(offerings::Column::UpdatedAt, Expr::value(now))
                .filter(offerings::Column::Id.eq(offering_id))
                .filter(offerings::Column::Status.eq(OfferingStatus::Active))
                .filter(offerings::Column::RemainingSlots.eq(0))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        log::info!(
            "Draw {draw_ref}: player {player_id} claimed {count} slots from offering {offering_id}, {remaining} remaining"
        );

        Ok(DrawResponse {
            draw_ref,
            outcomes: drawn,
            remaining_slots: remaining,
        })
    }
}
