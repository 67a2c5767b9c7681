use sea_orm_migration::prelude::*;

/// Disposition Records (奖品处置记录: 发货或转积分)
#[derive(DeriveIden)]
enum DispositionRecords {
    Table,
    Id,
    SlotId,
    Kind,
    Status,
    CreditedAmount,
    RequestedAt,
    ProcessedAt,
}

#[derive(DeriveIden)]
enum Slots {
    Table,
    DispositionDeadline,
    ClaimedBy,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 每个槽位最多一条处置记录, slot_id 唯一索引是并发下
/// "至多处置一次" 的最终防线; 到期扫描依赖 deadline 索引。
/// - kind: ship / convert_to_credit
/// - status: pending / processing / shipped / completed
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DispositionRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DispositionRecords::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DispositionRecords::SlotId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DispositionRecords::Kind)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DispositionRecords::Status)
                            .string_len(32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(DispositionRecords::CreditedAmount)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(DispositionRecords::RequestedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(DispositionRecords::ProcessedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // slot_id 唯一 (至多一条处置记录)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_disposition_records_slot_unique")
                    .table(DispositionRecords::Table)
                    .col(DispositionRecords::SlotId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 到期扫描索引 (claimed + 过期未处置)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_slots_deadline")
                    .table(Slots::Table)
                    .col(Slots::ClaimedBy)
                    .col(Slots::DispositionDeadline)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .if_exists()
                    .name("idx_slots_deadline")
                    .table(Slots::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(DispositionRecords::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
