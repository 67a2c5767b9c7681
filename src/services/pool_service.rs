use crate::entities::{offering_entity as offerings, outcome_entity as outcomes, slot_entity as slots};
use crate::error::{AppError, AppResult};
use crate::models::{
    GenerateSlotsRequest, GenerateSlotsResponse, RenumberResponse, SlotMoveResponse,
};
use chrono::Utc;
use rand::Rng;
use rand::seq::SliceRandom;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::collections::{BTreeMap, BTreeSet, HashSet};

#[derive(Clone)]
pub struct PoolService {
    pool: DatabaseConnection,
}

/// 规划阶段的槽位视图 (编号级联计算用)
#[derive(Debug, Clone, Copy)]
struct SlotView {
    id: i64,
    number: i32,
    claimed: bool,
}

/// 一次编号变更
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotMove {
    pub slot_id: i64,
    pub new_number: i32,
}

impl PoolService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 生成奖池 (Generate)
    ///
    /// 逻辑:
    /// 1. 校验分布与保留编号
    /// 2. 仅 draft 状态允许 (线上商品的奖池不可改动)
    /// 3. 按权重构建奖品多重集并洗牌
    /// 4. 在 [1, total_slots] 中排除保留编号后随机排列剩余编号
    /// 5. 同一事务内删除非保留槽位、批量插入新槽位、重置计数
    pub async fn generate(
        &self,
        offering_id: i64,
        req: GenerateSlotsRequest,
    ) -> AppResult<GenerateSlotsResponse> {
        if req.distribution.is_empty() {
            return Err(AppError::ValidationError(
                "Outcome distribution must not be empty".to_string(),
            ));
        }
        if req.distribution.iter().any(|d| d.weight <= 0) {
            return Err(AppError::ValidationError(
                "Distribution weights must be positive".to_string(),
            ));
        }
        let distinct: HashSet<i64> = req.distribution.iter().map(|d| d.outcome_id).collect();
        if distinct.len() != req.distribution.len() {
            return Err(AppError::ValidationError(
                "Distribution contains duplicate outcome ids".to_string(),
            ));
        }
        if req.total_slots < req.distribution.len() as i32 {
            return Err(AppError::ValidationError(format!(
                "total_slots {} is less than the number of distinct outcomes {}",
                req.total_slots,
                req.distribution.len()
            )));
        }
        let locked: HashSet<i32> = req.locked_slot_numbers.iter().copied().collect();
        if locked.len() != req.locked_slot_numbers.len() {
            return Err(AppError::ValidationError(
                "Locked slot numbers contain duplicates".to_string(),
            ));
        }
        if req.total_slots < locked.len() as i32 {
            return Err(AppError::ValidationError(format!(
                "total_slots {} is less than the number of locked slots {}",
                req.total_slots,
                locked.len()
            )));
        }
        if let Some(n) = locked.iter().find(|n| **n < 1 || **n > req.total_slots) {
            return Err(AppError::ValidationError(format!(
                "Locked slot number {n} is outside [1, {}]",
                req.total_slots
            )));
        }

        let txn = self.pool.begin().await?;

        let offering = offerings::Entity::find_by_id(offering_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Offering {offering_id} not found")))?;
        if !offering.allows_regeneration() {
            return Err(AppError::RegenerationNotAllowed(format!(
                "offering {} status is {}, pool generation is only allowed in draft",
                offering_id, offering.status
            )));
        }

        // 分布中的奖品必须属于该商品
        let outcome_ids: Vec<i64> = req.distribution.iter().map(|d| d.outcome_id).collect();
        let known = outcomes::Entity::find()
            .filter(outcomes::Column::OfferingId.eq(offering_id))
            .filter(outcomes::Column::Id.is_in(outcome_ids))
            .all(&txn)
            .await?;
        if known.len() != req.distribution.len() {
            return Err(AppError::ValidationError(
                "Distribution references an outcome that does not belong to this offering"
                    .to_string(),
            ));
        }

        let existing = slots::Entity::find()
            .filter(slots::Column::OfferingId.eq(offering_id))
            .all(&txn)
            .await?;
        if existing.iter().any(|s| s.is_claimed()) {
            return Err(AppError::RegenerationNotAllowed(format!(
                "offering {offering_id} has claimed slots"
            )));
        }
        let locked_existing = existing
            .iter()
            .filter(|s| locked.contains(&s.slot_number))
            .count();
        if locked_existing != locked.len() {
            return Err(AppError::ValidationError(
                "A locked slot number has no existing slot".to_string(),
            ));
        }

        let dist: Vec<(i64, i32)> = req
            .distribution
            .iter()
            .map(|d| (d.outcome_id, d.weight))
            .collect();
        let mut rng = rand::thread_rng();
        let outcome_pool = build_outcome_multiset(&dist, req.total_slots as usize, &mut rng);
        let numbers = free_slot_numbers(req.total_slots, &locked, &mut rng);
        let generated = numbers.len() as i32;

        // 删除非保留槽位
        let mut delete = slots::Entity::delete_many()
            .filter(slots::Column::OfferingId.eq(offering_id));
        if !locked.is_empty() {
            delete = delete.filter(
                slots::Column::SlotNumber.is_not_in(locked.iter().copied().collect::<Vec<i32>>()),
            );
        }
        delete.exec(&txn).await?;

        // 新槽位: 随机编号 x 洗牌后的奖品序列
        let new_slots: Vec<slots::ActiveModel> = numbers
            .iter()
            .zip(outcome_pool.iter())
            .map(|(number, outcome_id)| slots::ActiveModel {
                offering_id: Set(offering_id),
                slot_number: Set(*number),
                outcome_id: Set(*outcome_id),
                claimed_by: Set(None),
                claimed_at: Set(None),
                disposition_deadline: Set(None),
                ..Default::default()
            })
            .collect();
        if !new_slots.is_empty() {
            slots::Entity::insert_many(new_slots).exec(&txn).await?;
        }

        // 重置计数 (draft 阶段无领取, remaining == total)
        let total_slots = req.total_slots;
        let mut am = offering.into_active_model();
        am.total_slots = Set(total_slots);
        am.remaining_slots = Set(total_slots);
        am.updated_at = Set(Some(Utc::now()));
        am.update(&txn).await?;

        txn.commit().await?;

        Ok(GenerateSlotsResponse {
            offering_id,
            total_slots,
            generated,
            locked: locked.len() as i32,
        })
    }

    /// 槽位重新编号 (ordered 模式的人工排序)
    ///
    /// 目标编号被未领取槽位占用时, 被挤走的槽位移动到其上方的
    /// 下一个空闲编号 (无空闲时回绕到最小空闲编号); 所有变更在
    /// 同一事务内按 "被挤走者在前" 的顺序落库, 保证唯一索引不冲突
    pub async fn renumber(&self, slot_id: i64, new_number: i32) -> AppResult<RenumberResponse> {
        let txn = self.pool.begin().await?;

        let slot = slots::Entity::find_by_id(slot_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Slot {slot_id} not found")))?;
        let offering = offerings::Entity::find_by_id(slot.offering_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Offering {} not found", slot.offering_id))
            })?;
        if !offering.allows_regeneration() {
            return Err(AppError::RegenerationNotAllowed(format!(
                "offering {} status is {}, manual reordering is only allowed in draft",
                offering.id, offering.status
            )));
        }

        let all = slots::Entity::find()
            .filter(slots::Column::OfferingId.eq(offering.id))
            .order_by_asc(slots::Column::SlotNumber)
            .all(&txn)
            .await?;
        let views: Vec<SlotView> = all
            .iter()
            .map(|s| SlotView {
                id: s.id,
                number: s.slot_number,
                claimed: s.is_claimed(),
            })
            .collect();

        let moves = plan_renumber(&views, slot_id, new_number, offering.total_slots)?;

        // 被挤走的槽位先停到临时负编号再归位:
        // 回绕时其目标编号可能正是移动者尚未腾出的旧编号,
        // 直接更新会在事务中途触发唯一索引
        let now = Utc::now();
        let (displaced, mover) = moves.split_at(moves.len().saturating_sub(1));
        for mv in displaced {
            self.apply_move(&txn, mv.slot_id, -mv.new_number, now).await?;
        }
        for mv in mover {
            self.apply_move(&txn, mv.slot_id, mv.new_number, now).await?;
        }
        for mv in displaced {
            self.apply_move(&txn, mv.slot_id, mv.new_number, now).await?;
        }

        txn.commit().await?;

        Ok(RenumberResponse {
            moves: moves
                .into_iter()
                .map(|mv| SlotMoveResponse {
                    slot_id: mv.slot_id,
                    new_number: mv.new_number,
                })
                .collect(),
        })
    }

    async fn apply_move(
        &self,
        txn: &sea_orm::DatabaseTransaction,
        slot_id: i64,
        number: i32,
        now: chrono::DateTime<Utc>,
    ) -> AppResult<()> {
        let res = slots::Entity::update_many()
            .col_expr(slots::Column::SlotNumber, Expr::value(number))
            .col_expr(slots::Column::UpdatedAt, Expr::value(now))
            .filter(slots::Column::Id.eq(slot_id))
            .exec(txn)
            .await?;
        if res.rows_affected != 1 {
            return Err(AppError::ConcurrencyConflict(format!(
                "slot {slot_id} changed during renumber"
            )));
        }
        Ok(())
    }
}

/// 构建奖品多重集: 每个奖品至少一个, 余量按权重随机,
/// 最后 Fisher-Yates 洗牌。调用方保证分布非空且权重为正。
fn build_outcome_multiset<R: Rng>(
    distribution: &[(i64, i32)],
    total_slots: usize,
    rng: &mut R,
) -> Vec<i64> {
    let mut pool: Vec<i64> = distribution.iter().map(|(id, _)| *id).collect();
    let total_weight: i64 = distribution.iter().map(|(_, w)| *w as i64).sum();

    while pool.len() < total_slots {
        let mut pick = rng.gen_range(0..total_weight);
        for (id, weight) in distribution {
            pick -= *weight as i64;
            if pick < 0 {
                pool.push(*id);
                break;
            }
        }
    }

    pool.shuffle(rng);
    pool
}

/// [1, total_slots] 中排除保留编号后的随机排列
fn free_slot_numbers<R: Rng>(total_slots: i32, locked: &HashSet<i32>, rng: &mut R) -> Vec<i32> {
    let mut numbers: Vec<i32> = (1..=total_slots).filter(|n| !locked.contains(n)).collect();
    numbers.shuffle(rng);
    numbers
}

/// 编号级联规划 (纯函数)
///
/// 不变量: 执行完全部 moves 后, 槽位编号仍是原编号集合的一个排列。
/// 被挤走的未领取槽位移动到目标编号上方的下一个空闲编号, 无空闲
/// 时回绕到最小空闲编号 (移动者腾出的旧编号保证空闲编号存在)。
/// 已领取槽位不可移动, 目标编号被已领取槽位占用时报错。
fn plan_renumber(
    slots: &[SlotView],
    slot_id: i64,
    new_number: i32,
    total_slots: i32,
) -> AppResult<Vec<SlotMove>> {
    let mover = slots
        .iter()
        .find(|s| s.id == slot_id)
        .ok_or_else(|| AppError::NotFound(format!("Slot {slot_id} not found")))?;
    if mover.claimed {
        return Err(AppError::ValidationError(format!(
            "Slot {slot_id} is already claimed and cannot be renumbered"
        )));
    }
    if new_number < 1 || new_number > total_slots {
        return Err(AppError::ValidationError(format!(
            "Slot number {new_number} is outside [1, {total_slots}]"
        )));
    }
    if mover.number == new_number {
        return Ok(Vec::new());
    }

    let occupied: BTreeMap<i32, &SlotView> = slots
        .iter()
        .filter(|s| s.id != slot_id)
        .map(|s| (s.number, s))
        .collect();
    let free: BTreeSet<i32> = (1..=total_slots)
        .filter(|n| !occupied.contains_key(n))
        .collect();

    let mut moves = Vec::new();
    if let Some(displaced) = occupied.get(&new_number) {
        if displaced.claimed {
            return Err(AppError::ValidationError(format!(
                "Slot number {new_number} is held by a claimed slot"
            )));
        }
        let target = free
            .range((new_number + 1)..)
            .next()
            .or_else(|| free.iter().next())
            .copied()
            .ok_or_else(|| {
                AppError::InternalError("No free slot number available for cascade".to_string())
            })?;
        moves.push(SlotMove {
            slot_id: displaced.id,
            new_number: target,
        });
    }
    moves.push(SlotMove {
        slot_id,
        new_number,
    });

    Ok(moves)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(id: i64, number: i32, claimed: bool) -> SlotView {
        SlotView {
            id,
            number,
            claimed,
        }
    }

    #[test]
    fn test_multiset_has_exact_size_and_every_outcome() {
        let mut rng = rand::thread_rng();
        let dist = vec![(1i64, 1), (2, 2), (3, 7)];
        let pool = build_outcome_multiset(&dist, 10, &mut rng);
        assert_eq!(pool.len(), 10);
        for (id, _) in &dist {
            assert!(pool.contains(id), "outcome {id} missing from pool");
        }
        assert!(pool.iter().all(|id| dist.iter().any(|(d, _)| d == id)));
    }

    #[test]
    fn test_multiset_single_outcome_fills_pool() {
        let mut rng = rand::thread_rng();
        let pool = build_outcome_multiset(&[(7i64, 100)], 25, &mut rng);
        assert_eq!(pool.len(), 25);
        assert!(pool.iter().all(|id| *id == 7));
    }

    #[test]
    fn test_multiset_size_equals_outcome_count() {
        // total == 分布大小时每个奖品恰好一个
        let mut rng = rand::thread_rng();
        let dist = vec![(1i64, 5), (2, 5), (3, 5)];
        let mut pool = build_outcome_multiset(&dist, 3, &mut rng);
        pool.sort_unstable();
        assert_eq!(pool, vec![1, 2, 3]);
    }

    #[test]
    fn test_free_numbers_form_permutation_without_locked() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let total = rng.gen_range(1..40);
            let mut locked = HashSet::new();
            for n in 1..=total {
                if rng.gen_range(0..4) == 0 {
                    locked.insert(n);
                }
            }
            let numbers = free_slot_numbers(total, &locked, &mut rng);
            let mut seen: Vec<i32> = numbers.clone();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), numbers.len(), "duplicate slot number generated");
            assert_eq!(numbers.len() as i32, total - locked.len() as i32);
            for n in &numbers {
                assert!(*n >= 1 && *n <= total);
                assert!(!locked.contains(n));
            }
        }
    }

    #[test]
    fn test_renumber_without_conflict_is_single_move() {
        let slots = vec![view(1, 1, false), view(2, 3, false)];
        let moves = plan_renumber(&slots, 1, 2, 3).unwrap();
        assert_eq!(
            moves,
            vec![SlotMove {
                slot_id: 1,
                new_number: 2
            }]
        );
    }

    #[test]
    fn test_renumber_same_number_is_noop() {
        let slots = vec![view(1, 1, false)];
        assert!(plan_renumber(&slots, 1, 1, 3).unwrap().is_empty());
    }

    #[test]
    fn test_renumber_conflict_cascades_upward() {
        // 1号想去2号, 2号被挤到上方空闲的4号
        let slots = vec![view(1, 1, false), view(2, 2, false), view(3, 3, false)];
        let moves = plan_renumber(&slots, 1, 2, 4).unwrap();
        assert_eq!(
            moves,
            vec![
                SlotMove {
                    slot_id: 2,
                    new_number: 4
                },
                SlotMove {
                    slot_id: 1,
                    new_number: 2
                },
            ]
        );
    }

    #[test]
    fn test_renumber_conflict_wraps_to_lowest_free() {
        // 目标编号上方无空闲时, 被挤走的槽位回绕到最小空闲编号
        let slots = vec![view(1, 2, false), view(2, 4, false), view(3, 5, false)];
        let moves = plan_renumber(&slots, 1, 4, 5).unwrap();
        assert_eq!(
            moves,
            vec![
                SlotMove {
                    slot_id: 2,
                    new_number: 1
                },
                SlotMove {
                    slot_id: 1,
                    new_number: 4
                },
            ]
        );
    }

    #[test]
    fn test_renumber_full_pool_cycle() {
        // 无任何空闲编号时, 被挤走的槽位落到移动者腾出的编号上
        let slots = vec![view(1, 1, false), view(2, 2, false), view(3, 3, false)];
        let moves = plan_renumber(&slots, 3, 1, 3).unwrap();
        assert_eq!(
            moves,
            vec![
                SlotMove {
                    slot_id: 1,
                    new_number: 3
                },
                SlotMove {
                    slot_id: 3,
                    new_number: 1
                },
            ]
        );
    }

    #[test]
    fn test_renumber_preserves_permutation() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let total = rng.gen_range(2..20);
            let slots: Vec<SlotView> = (1..=total)
                .map(|n| view(n as i64, n, false))
                .collect();
            let slot_id = rng.gen_range(1..=total) as i64;
            let new_number = rng.gen_range(1..=total);
            let moves = plan_renumber(&slots, slot_id, new_number, total).unwrap();

            let mut numbers: BTreeMap<i64, i32> =
                slots.iter().map(|s| (s.id, s.number)).collect();
            for mv in &moves {
                numbers.insert(mv.slot_id, mv.new_number);
            }
            let mut final_numbers: Vec<i32> = numbers.values().copied().collect();
            final_numbers.sort_unstable();
            let expected: Vec<i32> = (1..=total).collect();
            assert_eq!(final_numbers, expected, "numbering is not a permutation");
        }
    }

    #[test]
    fn test_renumber_rejects_claimed_mover_and_target() {
        let slots = vec![view(1, 1, true), view(2, 2, false)];
        assert!(matches!(
            plan_renumber(&slots, 1, 2, 2),
            Err(AppError::ValidationError(_))
        ));

        let slots = vec![view(1, 1, false), view(2, 2, true)];
        assert!(matches!(
            plan_renumber(&slots, 1, 2, 2),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_renumber_rejects_out_of_range() {
        let slots = vec![view(1, 1, false)];
        assert!(matches!(
            plan_renumber(&slots, 1, 0, 3),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            plan_renumber(&slots, 1, 4, 3),
            Err(AppError::ValidationError(_))
        ));
    }
}
