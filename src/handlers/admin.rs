use crate::models::*;
use crate::services::{DispositionService, OfferingService, PoolService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/admin/offerings/{id}/slots/generate",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "商品ID")
    ),
    request_body = GenerateSlotsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "奖池生成成功", body = GenerateSlotsResponse),
        (status = 400, description = "分布或保留编号不合法"),
        (status = 409, description = "商品已上线, 禁止重新生成")
    )
)]
/// 生成/重新生成奖池 (仅 draft 状态):
/// 保留编号对应的槽位不被改动, 其余槽位整体删除重建
pub async fn generate_slots(
    service: web::Data<PoolService>,
    path: web::Path<i64>,
    body: web::Json<GenerateSlotsRequest>,
) -> Result<HttpResponse> {
    let offering_id = path.into_inner();
    match service.generate(offering_id, body.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": result }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/slots/{id}/renumber",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "槽位ID")
    ),
    request_body = RenumberRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "编号调整成功", body = RenumberResponse),
        (status = 400, description = "编号不合法或槽位已领取"),
        (status = 409, description = "商品已上线, 禁止调整")
    )
)]
/// 槽位重新编号 (ordered 模式的人工排序):
/// 目标编号被占用时被挤走的槽位级联移动到下一个空闲编号
pub async fn renumber_slot(
    service: web::Data<PoolService>,
    path: web::Path<i64>,
    body: web::Json<RenumberRequest>,
) -> Result<HttpResponse> {
    let slot_id = path.into_inner();
    match service.renumber(slot_id, body.new_number).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": result }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/offerings/{id}/slots",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "商品ID"),
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("page_size" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取槽位列表成功", body = PaginatedResponse<SlotResponse>),
        (status = 404, description = "商品不存在")
    )
)]
/// 奖池巡检 (按编号排序分页)
pub async fn list_slots(
    offering_service: web::Data<OfferingService>,
    path: web::Path<i64>,
    query: web::Query<SlotQuery>,
) -> Result<HttpResponse> {
    let offering_id = path.into_inner();
    let q = query.into_inner();
    let params = PaginationParams::new(q.page, q.page_size);
    match offering_service.list_slots(offering_id, &params).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/disposition-records/{id}/status",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "处置记录ID")
    ),
    request_body = UpdateFulfillmentRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "状态更新成功", body = DispositionResponse),
        (status = 400, description = "非法的状态流转"),
        (status = 404, description = "记录不存在")
    )
)]
/// 发货状态推进 (pending -> processing -> shipped -> completed)
pub async fn update_fulfillment_status(
    service: web::Data<DispositionService>,
    path: web::Path<i64>,
    body: web::Json<UpdateFulfillmentRequest>,
) -> Result<HttpResponse> {
    let record_id = path.into_inner();
    match service
        .update_fulfillment_status(record_id, body.status)
        .await
    {
        Ok(record) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": record }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/sweep",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "到期扫描完成", body = SweepSummary)
    )
)]
/// 手动触发到期扫描 (与定时任务同一代码路径, 幂等)
pub async fn trigger_sweep(service: web::Data<DispositionService>) -> Result<HttpResponse> {
    match service.sweep_expired().await {
        Ok(summary) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": summary }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route(
                "/offerings/{id}/slots/generate",
                web::post().to(generate_slots),
            )
            .route("/offerings/{id}/slots", web::get().to(list_slots))
            .route("/slots/{id}/renumber", web::post().to(renumber_slot))
            .route(
                "/disposition-records/{id}/status",
                web::put().to(update_fulfillment_status),
            )
            .route("/sweep", web::post().to(trigger_sweep)),
    );
}
