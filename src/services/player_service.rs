use crate::entities::{
    credit_transaction_entity as credit_transactions, draw_record_entity as draw_records,
    player_entity as players,
};
use crate::error::AppResult;
use crate::models::{
    BalanceResponse, CreditTransactionResponse, DrawRecordPageResponse, DrawRecordResponse,
    PaginatedResponse, PaginationParams,
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

#[derive(Clone)]
pub struct PlayerService {
    pool: DatabaseConnection,
}

impl PlayerService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 玩家余额 (无记录视作0, 首次积分变动时才落库)
    pub async fn get_balance(&self, player_id: i64) -> AppResult<BalanceResponse> {
        let balance = players::Entity::find_by_id(player_id)
            .one(&self.pool)
            .await?
            .map(|p| p.credit_balance)
            .unwrap_or(0);
        Ok(BalanceResponse {
            player_id,
            credit_balance: balance,
        })
    }

    /// 积分流水 (分页, 倒序)
    pub async fn list_credit_transactions(
        &self,
        player_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<CreditTransactionResponse>> {
        let base_query = credit_transactions::Entity::find()
            .filter(credit_transactions::Column::PlayerId.eq(player_id));
        let total = base_query.clone().count(&self.pool).await? as i64;

        let items_models = base_query
            .order_by(credit_transactions::Column::CreatedAt, Order::Desc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;
        let items: Vec<CreditTransactionResponse> =
            items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(
            items,
            params.page.unwrap_or(1),
            params.page_size.unwrap_or(20),
            total,
        ))
    }

    /// 抽选历史 (分页, 倒序)
    pub async fn list_draw_records(
        &self,
        player_id: i64,
        params: &PaginationParams,
    ) -> AppResult<DrawRecordPageResponse> {
        let base_query =
            draw_records::Entity::find().filter(draw_records::Column::PlayerId.eq(player_id));
        let total = base_query.clone().count(&self.pool).await? as i64;

        let items_models = base_query
            .order_by(draw_records::Column::CreatedAt, Order::Desc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;
        let items: Vec<DrawRecordResponse> =
            items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(
            items,
            params.page.unwrap_or(1),
            params.page_size.unwrap_or(20),
            total,
        ))
    }
}
