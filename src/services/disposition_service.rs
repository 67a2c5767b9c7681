use crate::entities::{
    DispositionKind, DispositionStatus, credit_transaction_entity as credit_transactions,
    disposition_record_entity as disposition_records, outcome_entity as outcomes,
    player_entity as players, slot_entity as slots,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    DispositionResponse, PaginatedResponse, PaginationParams, PendingPrizeResponse, SweepSummary,
};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict, PostgresQueryBuilder, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IntoActiveModel, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use std::collections::{BTreeMap, HashMap};

#[derive(Clone)]
pub struct DispositionService {
    pool: DatabaseConnection,
}

impl DispositionService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 记录处置 (发货或转积分)
    ///
    /// 仅限本人已领取、未处置且未过期的槽位; 转积分时记录创建、
    /// 余额自增与流水写入在同一事务内完成, 不可分离。
    /// 并发重复处置由 slot_id 唯一索引兜底, 失败方收到 "已处置"。
    pub async fn record_disposition(
        &self,
        player_id: i64,
        slot_id: i64,
        kind: DispositionKind,
    ) -> AppResult<DispositionResponse> {
        let txn = self.pool.begin().await?;

        let slot = slots::Entity::find_by_id(slot_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Slot {slot_id} not found")))?;
        match slot.claimed_by {
            Some(owner) if owner == player_id => {}
            Some(_) => return Err(AppError::Forbidden),
            None => {
                return Err(AppError::ValidationError(format!(
                    "Slot {slot_id} has not been claimed"
                )));
            }
        }

        let existing = disposition_records::Entity::find()
            .filter(disposition_records::Column::SlotId.eq(slot_id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(AppError::AlreadyDisposed(slot_id));
        }

        let now = Utc::now();
        // 过期槽位只走到期扫描的自动转积分路径
        if slot.is_deadline_passed(now) {
            return Err(AppError::DeadlinePassed(slot_id));
        }

        let record = match kind {
            DispositionKind::Ship => disposition_records::ActiveModel {
                slot_id: Set(slot_id),
                kind: Set(DispositionKind::Ship),
                status: Set(DispositionStatus::Pending),
                credited_amount: Set(None),
                requested_at: Set(Some(now)),
                processed_at: Set(None),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| map_duplicate_disposition(e, slot_id))?,
            DispositionKind::ConvertToCredit => {
                let outcome = outcomes::Entity::find_by_id(slot.outcome_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| {
                        AppError::InternalError(format!(
                            "Outcome {} bound to slot {slot_id} does not exist",
                            slot.outcome_id
                        ))
                    })?;
                let amount = outcome.credit_value_cents;

                let record = disposition_records::ActiveModel {
                    slot_id: Set(slot_id),
                    kind: Set(DispositionKind::ConvertToCredit),
                    status: Set(DispositionStatus::Completed),
                    credited_amount: Set(Some(amount)),
                    requested_at: Set(Some(now)),
                    processed_at: Set(Some(now)),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .map_err(|e| map_duplicate_disposition(e, slot_id))?;

                self.credit_player(&txn, player_id, amount, Some(slot_id), "Prize credit conversion", now)
                    .await?;
                record
            }
        };

        txn.commit().await?;

        log::info!(
            "Disposition recorded: slot {slot_id} player {player_id} kind {kind}"
        );

        Ok(record.into())
    }

    /// 到期扫描 (Sweep)
    ///
    /// 候选集 = 已领取、期限已过且无处置记录的槽位; 记录的缺席
    /// 本身就是资格判定, 没有单独的 "已扫描" 标记可失步。
    /// 按玩家分组, 每个玩家一个事务: 逐槽位 ON CONFLICT DO NOTHING
    /// 插入转积分记录 (与人工处置竞争失败的槽位被自然跳过),
    /// 汇总金额做单次余额自增并写一条流水。
    /// 单个玩家失败只记日志并跳过, 不影响其他玩家; 重复执行安全。
    pub async fn sweep_expired(&self) -> AppResult<SweepSummary> {
        let now = Utc::now();

        let disposed = Query::select()
            .column(disposition_records::Column::SlotId)
            .from(disposition_records::Entity)
            .to_owned();
        let candidates = slots::Entity::find()
            .filter(slots::Column::ClaimedBy.is_not_null())
            .filter(slots::Column::DispositionDeadline.lt(now))
            .filter(Expr::col((slots::Entity, slots::Column::Id)).not_in_subquery(disposed))
            .all(&self.pool)
            .await?;

        if candidates.is_empty() {
            return Ok(SweepSummary::default());
        }

        let outcome_ids: Vec<i64> = candidates.iter().map(|s| s.outcome_id).collect();
        let outcome_rows = outcomes::Entity::find()
            .filter(outcomes::Column::Id.is_in(outcome_ids))
            .all(&self.pool)
            .await?;
        let value_by_id: HashMap<i64, i64> = outcome_rows
            .iter()
            .map(|o| (o.id, o.credit_value_cents))
            .collect();

        // 按玩家分组, 减少余额更新往返
        let mut by_player: BTreeMap<i64, Vec<&slots::Model>> = BTreeMap::new();
        for slot in &candidates {
            if let Some(player_id) = slot.claimed_by {
                by_player.entry(player_id).or_default().push(slot);
            }
        }

        let mut summary = SweepSummary::default();
        for (player_id, batch) in &by_player {
            match self
                .convert_expired_batch(*player_id, batch, &value_by_id, now)
                .await
            {
                Ok((swept, credited)) => {
                    if swept > 0 {
                        summary.players += 1;
                    }
                    summary.swept_slots += swept;
                    summary.credited_total_cents += credited;
                }
                Err(e) => {
                    log::error!(
                        "Sweep failed for player {player_id}, skipping: {e:?}"
                    );
                    summary.failed_players += 1;
                }
            }
        }

        Ok(summary)
    }

    /// 发货流程状态更新 (管理端)
    /// 仅 ship 记录有发货流程, 且必须按状态机顺序推进
    pub async fn update_fulfillment_status(
        &self,
        record_id: i64,
        new_status: DispositionStatus,
    ) -> AppResult<DispositionResponse> {
        let txn = self.pool.begin().await?;

        let record = disposition_records::Entity::find_by_id(record_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Disposition record {record_id} not found"))
            })?;
        if record.kind != DispositionKind::Ship {
            return Err(AppError::ValidationError(
                "Only ship dispositions have a fulfillment flow".to_string(),
            ));
        }
        if !record.status.can_transition_to(new_status) {
            return Err(AppError::ValidationError(format!(
                "Invalid fulfillment transition {} -> {}",
                record.status, new_status
            )));
        }

        let mut am = record.into_active_model();
        am.status = Set(new_status);
        if new_status == DispositionStatus::Completed {
            am.processed_at = Set(Some(Utc::now()));
        }
        let updated = am.update(&txn).await?;

        txn.commit().await?;
        Ok(updated.into())
    }

    /// 玩家的待处置奖品 (已领取且无处置记录), 按期限升序
    pub async fn list_pending(&self, player_id: i64) -> AppResult<Vec<PendingPrizeResponse>> {
        let disposed = Query::select()
            .column(disposition_records::Column::SlotId)
            .from(disposition_records::Entity)
            .to_owned();
        let pending = slots::Entity::find()
            .filter(slots::Column::ClaimedBy.eq(player_id))
            .filter(Expr::col((slots::Entity, slots::Column::Id)).not_in_subquery(disposed))
            .order_by_asc(slots::Column::DispositionDeadline)
            .all(&self.pool)
            .await?;

        let outcome_ids: Vec<i64> = pending.iter().map(|s| s.outcome_id).collect();
        let outcome_rows = outcomes::Entity::find()
            .filter(outcomes::Column::Id.is_in(outcome_ids))
            .all(&self.pool)
            .await?;
        let by_id: HashMap<i64, &outcomes::Model> =
            outcome_rows.iter().map(|o| (o.id, o)).collect();

        let mut items = Vec::with_capacity(pending.len());
        for slot in &pending {
            let outcome = by_id.get(&slot.outcome_id).ok_or_else(|| {
                AppError::InternalError(format!(
                    "Outcome {} bound to slot {} does not exist",
                    slot.outcome_id, slot.id
                ))
            })?;
            items.push(PendingPrizeResponse {
                slot_id: slot.id,
                offering_id: slot.offering_id,
                tier: outcome.tier.clone(),
                name: outcome.name.clone(),
                credit_value_cents: outcome.credit_value_cents,
                claimed_at: slot.claimed_at,
                disposition_deadline: slot.disposition_deadline,
            });
        }
        Ok(items)
    }

    /// 玩家的处置记录 (分页, 倒序)
    pub async fn list_records(
        &self,
        player_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<DispositionResponse>> {
        let slot_ids: Vec<i64> = slots::Entity::find()
            .filter(slots::Column::ClaimedBy.eq(player_id))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();

        let base_query = disposition_records::Entity::find()
            .filter(disposition_records::Column::SlotId.is_in(slot_ids));
        let total = base_query.clone().count(&self.pool).await? as i64;

        let items_models = base_query
            .order_by(disposition_records::Column::RequestedAt, Order::Desc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;
        let items: Vec<DispositionResponse> =
            items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(
            items,
            params.page.unwrap_or(1),
            params.page_size.unwrap_or(20),
            total,
        ))
    }

    // -----------------------------
    // 内部辅助方法
    // -----------------------------

    /// 单个玩家的过期槽位批量转积分 (一个事务)
    async fn convert_expired_batch(
        &self,
        player_id: i64,
        batch: &[&slots::Model],
        value_by_id: &HashMap<i64, i64>,
        now: DateTime<Utc>,
    ) -> AppResult<(i64, i64)> {
        let txn = self.pool.begin().await?;

        let mut swept = 0i64;
        let mut credited = 0i64;
        for slot in batch {
            let amount = value_by_id.get(&slot.outcome_id).copied().ok_or_else(|| {
                AppError::InternalError(format!(
                    "Outcome {} bound to slot {} does not exist",
                    slot.outcome_id, slot.id
                ))
            })?;

            // ON CONFLICT DO NOTHING: 与人工处置竞争失败时跳过该槽位
            let insert = Query::insert()
                .into_table(disposition_records::Entity)
                .columns([
                    disposition_records::Column::SlotId,
                    disposition_records::Column::Kind,
                    disposition_records::Column::Status,
                    disposition_records::Column::CreditedAmount,
                    disposition_records::Column::RequestedAt,
                    disposition_records::Column::ProcessedAt,
                ])
                .values_panic([
                    slot.id.into(),
                    DispositionKind::ConvertToCredit.to_string().into(),
                    DispositionStatus::Completed.to_string().into(),
                    amount.into(),
                    now.into(),
                    now.into(),
                ])
                .on_conflict(
                    OnConflict::column(disposition_records::Column::SlotId)
                        .do_nothing()
                        .to_owned(),
                )
                .to_owned();
            let (sql, values) = insert.build(PostgresQueryBuilder);
            let stmt = sea_orm::Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Postgres,
                sql,
                values,
            );
            let res = txn.execute(stmt).await?;
            if res.rows_affected() == 0 {
                log::info!("Slot {} already disposed, skipped by sweep", slot.id);
                continue;
            }
            swept += 1;
            credited += amount;
        }

        if swept > 0 {
            self.credit_player(
                &txn,
                player_id,
                credited,
                None,
                &format!("Expired prize auto conversion ({swept} slots)"),
                now,
            )
            .await?;
        }

        txn.commit().await?;
        Ok((swept, credited))
    }

    /// 余额自增 + 流水 (同一事务内调用)
    /// 自增必须是单条条件表达式更新, 不做读-加-写
    async fn credit_player(
        &self,
        txn: &DatabaseTransaction,
        player_id: i64,
        amount: i64,
        related_slot_id: Option<i64>,
        description: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.ensure_player(txn, player_id).await?;

        players::Entity::update_many()
            .col_expr(
                players::Column::CreditBalance,
                Expr::col(players::Column::CreditBalance).add(amount),
            )
            .col_expr(players::Column::UpdatedAt, Expr::value(now))
            .filter(players::Column::Id.eq(player_id))
            .exec(txn)
            .await?;

        let balance_after = players::Entity::find_by_id(player_id)
            .one(txn)
            .await?
            .map(|p| p.credit_balance)
            .ok_or_else(|| {
                AppError::InternalError(format!("Player {player_id} disappeared mid-credit"))
            })?;

        credit_transactions::ActiveModel {
            player_id: Set(player_id),
            amount: Set(amount),
            balance_after: Set(balance_after),
            related_slot_id: Set(related_slot_id),
            description: Set(Some(description.to_string())),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        Ok(())
    }

    /// 确保玩家余额行存在 (不存在则以0余额插入, 已存在不影响)
    async fn ensure_player(&self, txn: &DatabaseTransaction, player_id: i64) -> AppResult<()> {
        let insert = Query::insert()
            .into_table(players::Entity)
            .columns([players::Column::Id, players::Column::CreditBalance])
            .values_panic([player_id.into(), 0i64.into()])
            .on_conflict(
                OnConflict::column(players::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();
        let (sql, values) = insert.build(PostgresQueryBuilder);
        let stmt =
            sea_orm::Statement::from_sql_and_values(sea_orm::DatabaseBackend::Postgres, sql, values);
        txn.execute(stmt).await?;
        Ok(())
    }
}

/// slot_id 唯一键冲突说明并发方已先完成处置
fn map_duplicate_disposition(err: sea_orm::DbErr, slot_id: i64) -> AppError {
    let msg = err.to_string();
    if msg.contains("duplicate key") || msg.contains("unique constraint") {
        AppError::AlreadyDisposed(slot_id)
    } else {
        AppError::DatabaseError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_maps_to_already_disposed() {
        let err = sea_orm::DbErr::Custom(
            "duplicate key value violates unique constraint \"idx_disposition_records_slot_unique\""
                .to_string(),
        );
        assert!(matches!(
            map_duplicate_disposition(err, 7),
            AppError::AlreadyDisposed(7)
        ));
    }

    #[test]
    fn test_other_db_errors_pass_through() {
        let err = sea_orm::DbErr::Custom("connection reset".to_string());
        assert!(matches!(
            map_duplicate_disposition(err, 7),
            AppError::DatabaseError(_)
        ));
    }
}
