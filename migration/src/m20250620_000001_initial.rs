use sea_orm_migration::prelude::*;

/// Offerings (ガチャ商品 / 抽选配置)
#[derive(DeriveIden)]
enum Offerings {
    Table,
    Id,
    Name,
    PriceCents,
    TotalSlots,
    RemainingSlots,
    Status,
    DrawMode,
    CreatedAt,
    UpdatedAt,
}

/// Outcomes (奖品定义: 等级 / 面值 / 权重, 由后台目录管理维护)
#[derive(DeriveIden)]
enum Outcomes {
    Table,
    Id,
    OfferingId,
    Tier,
    Name,
    CreditValueCents,
    Weight,
    CreatedAt,
    UpdatedAt,
}

/// Slots (奖池槽位, 每个槽位绑定一个奖品)
#[derive(DeriveIden)]
enum Slots {
    Table,
    Id,
    OfferingId,
    SlotNumber,
    OutcomeId,
    ClaimedBy,
    ClaimedAt,
    DispositionDeadline,
    CreatedAt,
    UpdatedAt,
}

/// Players (玩家积分余额, 身份由外部认证系统提供)
#[derive(DeriveIden)]
enum Players {
    Table,
    Id,
    CreditBalance,
    CreatedAt,
    UpdatedAt,
}

/// Credit Transactions (积分流水)
#[derive(DeriveIden)]
enum CreditTransactions {
    Table,
    Id,
    PlayerId,
    Amount,
    BalanceAfter,
    RelatedSlotId,
    Description,
    CreatedAt,
}

/// Draw Records (抽选历史记录, draw_ref 聚合同一次 allocate 的所有槽位)
#[derive(DeriveIden)]
enum DrawRecords {
    Table,
    Id,
    DrawRef,
    OfferingId,
    PlayerId,
    SlotId,
    OutcomeTier,
    OutcomeName,
    CreditValueCents,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 状态与模式使用文本枚举:
/// - offerings.status: draft / active / sold_out / archived
/// - offerings.draw_mode: random / ordered
///
/// slot_number 在 (offering_id, slot_number) 上唯一, 保证槽位编号构成
/// [1, total_slots] 的一个排列。
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 商品表
        manager
            .create_table(
                Table::create()
                    .table(Offerings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Offerings::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Offerings::Name)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Offerings::PriceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Offerings::TotalSlots)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Offerings::RemainingSlots)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Offerings::Status)
                            .string_len(32)
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(Offerings::DrawMode)
                            .string_len(32)
                            .not_null()
                            .default("random"),
                    )
                    .col(
                        ColumnDef::new(Offerings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Offerings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 奖品表
        manager
            .create_table(
                Table::create()
                    .table(Outcomes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Outcomes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Outcomes::OfferingId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Outcomes::Tier).string_len(32).not_null())
                    .col(ColumnDef::new(Outcomes::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Outcomes::CreditValueCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Outcomes::Weight)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Outcomes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Outcomes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_outcomes_offering")
                    .table(Outcomes::Table)
                    .col(Outcomes::OfferingId)
                    .to_owned(),
            )
            .await?;

        // 槽位表
        manager
            .create_table(
                Table::create()
                    .table(Slots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Slots::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Slots::OfferingId).big_integer().not_null())
                    .col(ColumnDef::new(Slots::SlotNumber).integer().not_null())
                    .col(ColumnDef::new(Slots::OutcomeId).big_integer().not_null())
                    .col(ColumnDef::new(Slots::ClaimedBy).big_integer().null())
                    .col(
                        ColumnDef::new(Slots::ClaimedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Slots::DispositionDeadline)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Slots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Slots::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 槽位编号唯一 (排列不变量依赖此索引)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_slots_offering_number_unique")
                    .table(Slots::Table)
                    .col(Slots::OfferingId)
                    .col(Slots::SlotNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 未领取槽位查询索引 (抽选选择路径)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_slots_offering_claimed")
                    .table(Slots::Table)
                    .col(Slots::OfferingId)
                    .col(Slots::ClaimedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Slots::Table)
                    .add_foreign_key(
                        TableForeignKey::new()
                            .name("fk_slots_outcome")
                            .from_tbl(Slots::Table)
                            .from_col(Slots::OutcomeId)
                            .to_tbl(Outcomes::Table)
                            .to_col(Outcomes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 玩家余额表 (id 由外部认证系统分配, 非自增)
        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Players::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Players::CreditBalance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Players::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Players::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // 积分流水表
        manager
            .create_table(
                Table::create()
                    .table(CreditTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CreditTransactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CreditTransactions::PlayerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditTransactions::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditTransactions::BalanceAfter)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CreditTransactions::RelatedSlotId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CreditTransactions::Description)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CreditTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_credit_transactions_player")
                    .table(CreditTransactions::Table)
                    .col(CreditTransactions::PlayerId)
                    .to_owned(),
            )
            .await?;

        // 抽选历史表
        manager
            .create_table(
                Table::create()
                    .table(DrawRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DrawRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DrawRecords::DrawRef)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DrawRecords::OfferingId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DrawRecords::PlayerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DrawRecords::SlotId).big_integer().not_null())
                    .col(
                        ColumnDef::new(DrawRecords::OutcomeTier)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DrawRecords::OutcomeName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DrawRecords::CreditValueCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DrawRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_draw_records_player")
                    .table(DrawRecords::Table)
                    .col(DrawRecords::PlayerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_draw_records_draw_ref")
                    .table(DrawRecords::Table)
                    .col(DrawRecords::DrawRef)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序: 历史 -> 流水 -> 玩家 -> 槽位 -> 奖品 -> 商品
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(DrawRecords::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(CreditTransactions::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Players::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Slots::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Outcomes::Table).to_owned())
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(Offerings::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
