//! Balance replenishment handler.

use std::net::{IpAddr, Ipv4Addr};

use actix_web::{HttpRequest, HttpResponse, post, web};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::domain::{Error, Notification};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/balance/replenish`.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReplenishRequest {
    pub sum: Decimal,
}

/// Best-effort client address for the purchase audit trail.
fn client_ip(req: &HttpRequest) -> IpAddr {
    let forwarded = req.connection_info().realip_remote_addr().and_then(|addr| {
        addr.parse().ok().or_else(|| {
            // The address may still carry a port suffix.
            addr.rsplit_once(':')
                .and_then(|(host, _)| host.parse().ok())
        })
    });
    forwarded
        .or_else(|| req.peer_addr().map(|addr| addr.ip()))
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Credit the logged-in user's balance.
#[utoipa::path(
    post,
    path = "/api/v1/balance/replenish",
    request_body = ReplenishRequest,
    responses(
        (status = 200, description = "Balance credited"),
        (status = 400, description = "Non-positive sum", body = Error),
        (status = 401, description = "Not logged in", body = Error),
    ),
    tags = ["balance"],
    operation_id = "replenishBalance"
)]
#[post("/balance/replenish")]
pub async fn replenish(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    payload: web::Json<ReplenishRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let purchase = state
        .replenishment
        .create(payload.sum, &user_id, client_ip(&req))
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "purchase_id": purchase.id,
        "sum": purchase.sum,
        "notifications": [Notification::success("Your balance has been topped up.")],
    })))
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn client_ip_prefers_the_forwarded_address() {
        let req = TestRequest::default()
            .insert_header(("x-forwarded-for", "203.0.113.7"))
            .to_http_request();
        assert_eq!(client_ip(&req), "203.0.113.7".parse::<IpAddr>().expect("ip"));
    }

    #[test]
    fn client_ip_falls_back_to_unspecified() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(client_ip(&req), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }
}
