use crate::models::*;
use crate::services::PlayerService;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

/// 从请求扩展中获取玩家ID（中间件在鉴权后注入）
fn get_player_id_from_request(req: &HttpRequest) -> Option<i64> {
    req.extensions().get::<i64>().copied()
}

#[utoipa::path(
    get,
    path = "/player/balance",
    tag = "player",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取余额成功", body = BalanceResponse),
        (status = 401, description = "未授权")
    )
)]
/// 积分余额 (从未有积分变动的玩家返回0)
pub async fn get_balance(
    service: web::Data<PlayerService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let player_id = get_player_id_from_request(&req).unwrap_or(0);
    match service.get_balance(player_id).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/player/credit-transactions",
    tag = "player",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("page_size" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取积分流水成功", body = PaginatedResponse<CreditTransactionResponse>),
        (status = 401, description = "未授权")
    )
)]
/// 积分流水 (分页, 倒序)
pub async fn get_credit_transactions(
    service: web::Data<PlayerService>,
    req: HttpRequest,
    query: web::Query<CreditTransactionQuery>,
) -> Result<HttpResponse> {
    let player_id = get_player_id_from_request(&req).unwrap_or(0);
    let q = query.into_inner();
    let params = PaginationParams::new(q.page, q.page_size);
    match service.list_credit_transactions(player_id, &params).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/player/draws",
    tag = "player",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("page_size" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取抽选历史成功", body = PaginatedResponse<DrawRecordResponse>),
        (status = 401, description = "未授权")
    )
)]
/// 抽选历史 (分页, 倒序)
pub async fn get_draw_records(
    service: web::Data<PlayerService>,
    req: HttpRequest,
    query: web::Query<DrawRecordQuery>,
) -> Result<HttpResponse> {
    let player_id = get_player_id_from_request(&req).unwrap_or(0);
    let q = query.into_inner();
    let params = PaginationParams::new(q.page, q.page_size);
    match service.list_draw_records(player_id, &params).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn player_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/player")
            .route("/balance", web::get().to(get_balance))
            .route("/credit-transactions", web::get().to(get_credit_transactions))
            .route("/draws", web::get().to(get_draw_records)),
    );
}
