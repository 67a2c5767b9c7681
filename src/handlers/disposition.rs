use crate::models::*;
use crate::services::DispositionService;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

/// 从请求扩展中获取玩家ID（中间件在鉴权后注入）
fn get_player_id_from_request(req: &HttpRequest) -> Option<i64> {
    req.extensions().get::<i64>().copied()
}

#[utoipa::path(
    get,
    path = "/prizes/pending",
    tag = "disposition",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取待处置奖品成功", body = [PendingPrizeResponse]),
        (status = 401, description = "未授权")
    )
)]
/// 待处置奖品列表 (已领取且尚未选择发货或转积分)
pub async fn get_pending(
    service: web::Data<DispositionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let player_id = get_player_id_from_request(&req).unwrap_or(0);
    match service.list_pending(player_id).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/prizes/{slot_id}/disposition",
    tag = "disposition",
    params(
        ("slot_id" = i64, Path, description = "槽位ID")
    ),
    request_body = DispositionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "处置成功", body = DispositionResponse),
        (status = 400, description = "处置期限已过"),
        (status = 401, description = "未授权"),
        (status = 409, description = "该奖品已处置")
    )
)]
/// 处置奖品:
/// - ship: 创建待发货记录
/// - convert_to_credit: 同一事务内创建记录并增加积分余额
pub async fn record_disposition(
    service: web::Data<DispositionService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<DispositionRequest>,
) -> Result<HttpResponse> {
    let player_id = get_player_id_from_request(&req).unwrap_or(0);
    let slot_id = path.into_inner();
    match service
        .record_disposition(player_id, slot_id, body.into_inner().kind)
        .await
    {
        Ok(record) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": record }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/prizes/dispositions",
    tag = "disposition",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("page_size" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取处置记录成功", body = PaginatedResponse<DispositionResponse>),
        (status = 401, description = "未授权")
    )
)]
/// 处置记录 (分页, 倒序)
pub async fn get_records(
    service: web::Data<DispositionService>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let player_id = get_player_id_from_request(&req).unwrap_or(0);
    match service.list_records(player_id, &query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn disposition_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/prizes")
            .route("/pending", web::get().to(get_pending))
            .route("/dispositions", web::get().to(get_records))
            .route("/{slot_id}/disposition", web::post().to(record_disposition)),
    );
}
