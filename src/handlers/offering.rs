use crate::models::*;
use crate::services::OfferingService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/offerings",
    tag = "offering",
    params(
        ("status" = Option<String>, Query, description = "状态过滤 (缺省 active + sold_out)"),
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("page_size" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    responses(
        (status = 200, description = "获取商品列表成功", body = PaginatedResponse<OfferingResponse>)
    )
)]
/// 商品列表 (分页)
pub async fn list_offerings(
    service: web::Data<OfferingService>,
    query: web::Query<OfferingQuery>,
) -> Result<HttpResponse> {
    match service.list_offerings(&query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/offerings/{id}",
    tag = "offering",
    params(
        ("id" = i64, Path, description = "商品ID")
    ),
    responses(
        (status = 200, description = "获取商品详情成功", body = OfferingResponse),
        (status = 404, description = "商品不存在")
    )
)]
/// 商品详情 (含实时剩余槽位数)
pub async fn get_offering(
    service: web::Data<OfferingService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.get_offering(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn offering_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/offerings")
            .route("", web::get().to(list_offerings))
            .route("/{id}", web::get().to(get_offering)),
    );
}
