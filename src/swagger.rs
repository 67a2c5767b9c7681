use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{DispositionKind, DispositionStatus, DrawMode, OfferingStatus};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::offering::list_offerings,
        handlers::offering::get_offering,
        handlers::draw::allocate,
        handlers::disposition::get_pending,
        handlers::disposition::record_disposition,
        handlers::disposition::get_records,
        handlers::player::get_balance,
        handlers::player::get_credit_transactions,
        handlers::player::get_draw_records,
        handlers::admin::generate_slots,
        handlers::admin::renumber_slot,
        handlers::admin::list_slots,
        handlers::admin::update_fulfillment_status,
        handlers::admin::trigger_sweep,
    ),
    components(
        schemas(
            OfferingStatus,
            DrawMode,
            DispositionKind,
            DispositionStatus,
            OfferingQuery,
            OfferingResponse,
            DistributionEntry,
            GenerateSlotsRequest,
            GenerateSlotsResponse,
            RenumberRequest,
            SlotMoveResponse,
            RenumberResponse,
            SlotQuery,
            SlotResponse,
            AllocateRequest,
            DrawnOutcome,
            DrawResponse,
            DrawRecordQuery,
            DrawRecordResponse,
            DispositionRequest,
            DispositionResponse,
            PendingPrizeResponse,
            UpdateFulfillmentRequest,
            SweepSummary,
            BalanceResponse,
            CreditTransactionQuery,
            CreditTransactionResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "offering", description = "Offering catalog API"),
        (name = "draw", description = "Draw allocation API"),
        (name = "disposition", description = "Prize disposition API"),
        (name = "player", description = "Player balance and history API"),
        (name = "admin", description = "Pool administration API"),
    ),
    info(
        title = "Oripa Backend API",
        version = "1.0.0",
        description = "Slot inventory and draw consistency engine REST API documentation",
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
