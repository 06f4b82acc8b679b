//! App Router

use salvo::{
    Router,
    catcher::Catcher,
    oapi::{OpenApi, swagger_ui::SwaggerUi},
    prelude::*,
    trailing_slash::remove_slash,
};

use crate::{coupons, healthcheck, observability, redemptions, tenancy};

/// Routes that act on a tenant's ledger.
fn ledger_router() -> Router {
    Router::new()
        .hoop(tenancy::middleware::handler)
        .push(
            Router::with_path("coupons")
                .post(coupons::create::handler)
                .push(
                    Router::with_path("{coupon}")
                        .get(coupons::get::handler)
                        .push(Router::with_path("codes").get(coupons::codes::handler))
                        .push(Router::with_path("codes.csv").get(coupons::export::handler))
                        .push(Router::with_path("assign").post(coupons::assign::handler))
                        .push(Router::with_path("revoke").post(coupons::revoke::handler))
                        .push(Router::with_path("remind").post(coupons::remind::handler)),
                ),
        )
        .push(Router::with_path("vouchers/{code}/redeem").post(redemptions::redeem::handler))
}

/// Every route, plus the OpenAPI document and Swagger UI.
pub(crate) fn app_router(metrics_enabled: bool) -> Router {
    let mut router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(observability::request_logging)
        .hoop(remove_slash())
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(ledger_router());

    if metrics_enabled {
        router = router.push(Router::with_path("metrics").get(observability::metrics_handler));
    }

    let doc = OpenApi::new("Vouchers API", env!("CARGO_PKG_VERSION")).merge_router(&router);

    router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("swagger-ui"))
}

/// Service wrapping `router` with the default error catcher.
pub(crate) fn service(router: Router) -> Service {
    Service::new(router).catcher(Catcher::default())
}
