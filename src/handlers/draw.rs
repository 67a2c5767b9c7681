use crate::models::*;
use crate::services::DrawService;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

/// 从请求扩展中获取玩家ID（中间件在鉴权后注入）
fn get_player_id_from_request(req: &HttpRequest) -> Option<i64> {
    req.extensions().get::<i64>().copied()
}

#[utoipa::path(
    post,
    path = "/offerings/{id}/draws",
    tag = "draw",
    params(
        ("id" = i64, Path, description = "商品ID")
    ),
    request_body = AllocateRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "抽选成功", body = DrawResponse),
        (status = 401, description = "未授权"),
        (status = 409, description = "剩余槽位不足或商品不可抽选")
    )
)]
/// 抽选 (Allocate):
/// 1. 条件扣减剩余槽位数 (状态 active 且剩余充足才生效)
/// 2. 按抽选模式选择未领取槽位并原子领取
/// 3. 写抽选历史并返回奖品列表
/// 库存不足与商品不可抽选返回专门的错误码, 不自动重试
pub async fn allocate(
    service: web::Data<DrawService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<AllocateRequest>,
) -> Result<HttpResponse> {
    let player_id = get_player_id_from_request(&req).unwrap_or(0);
    let offering_id = path.into_inner();
    match service
        .allocate(offering_id, player_id, body.count)
        .await
    {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": result }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn draw_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/offerings/{id}/draws", web::post().to(allocate));
}
