use crate::entities::{OfferingStatus, offering_entity as offerings, slot_entity as slots};
use crate::error::{AppError, AppResult};
use crate::models::{
    OfferingQuery, OfferingResponse, PaginatedResponse, PaginationParams, SlotResponse,
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

#[derive(Clone)]
pub struct OfferingService {
    pool: DatabaseConnection,
}

impl OfferingService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 商品列表 (分页)
    /// 缺省只展示可见商品 (active / sold_out), 管理端可按状态过滤
    pub async fn list_offerings(
        &self,
        query: &OfferingQuery,
    ) -> AppResult<PaginatedResponse<OfferingResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);

        let base_query = match &query.status {
            Some(status) => offerings::Entity::find()
                .filter(offerings::Column::Status.eq(status.clone())),
            None => offerings::Entity::find().filter(
                offerings::Column::Status
                    .is_in([OfferingStatus::Active, OfferingStatus::SoldOut]),
            ),
        };

        let total = base_query.clone().count(&self.pool).await? as i64;
        let items_models = base_query
            .order_by_asc(offerings::Column::Id)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;
        let items: Vec<OfferingResponse> = items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(
            items,
            params.page.unwrap_or(1),
            params.page_size.unwrap_or(20),
            total,
        ))
    }

    /// 商品详情 (含实时剩余数)
    pub async fn get_offering(&self, offering_id: i64) -> AppResult<OfferingResponse> {
        let offering = offerings::Entity::find_by_id(offering_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Offering {offering_id} not found")))?;
        Ok(offering.into())
    }

    /// 奖池巡检 (管理端, 按编号排序分页)
    pub async fn list_slots(
        &self,
        offering_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<SlotResponse>> {
        // 商品必须存在
        offerings::Entity::find_by_id(offering_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Offering {offering_id} not found")))?;

        let base_query =
            slots::Entity::find().filter(slots::Column::OfferingId.eq(offering_id));
        let total = base_query.clone().count(&self.pool).await? as i64;

        let items_models = base_query
            .order_by_asc(slots::Column::SlotNumber)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;
        let items: Vec<SlotResponse> = items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(
            items,
            params.page.unwrap_or(1),
            params.page_size.unwrap_or(20),
            total,
        ))
    }
}
