//! Cancel a submitted shipment with the carrier.

use shipgate_core::{OrderId, ResultEnvelope};
use tracing::{info, instrument};

use super::{ActionContext, ActionError, CANCEL_FAILED};
use crate::carrier::Carrier;
use crate::store::OrderRepository;
use crate::validate;

/// Ask the carrier to cancel the shipment of a submitted order.
///
/// The stored order keeps its shipment code; cancellation shows up later as
/// a carrier status event.
///
/// # Errors
///
/// Returns `ActionError` for validation, store and carrier failures.
#[instrument(skip(ctx), fields(shop_id = %ctx.shop.id))]
pub async fn cancel<S, C>(
    ctx: &ActionContext<'_, S, C>,
    order_id: &OrderId,
) -> Result<ResultEnvelope, ActionError>
where
    S: OrderRepository,
    C: Carrier,
{
    let order = validate::order_found(ctx.store.find_order(order_id, &ctx.shop.id).await?)?;
    let label = validate::check_submitted(&order)?;

    ctx.carrier
        .cancel_shipment(&ctx.shop.config.carrier_auth_token, label)
        .await
        .and_then(|reply| reply.lenient())
        .map_err(ActionError::carrier(CANCEL_FAILED))?;

    info!(label = %label, "Carrier shipment cancelled");
    Ok(ResultEnvelope::success("cancel partner order success", ""))
}
