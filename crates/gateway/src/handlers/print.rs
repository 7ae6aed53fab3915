//! Fetch the shipping label of a submitted order.

use base64::Engine as _;
use base64::prelude::BASE64_STANDARD;
use shipgate_core::{OrderId, ResultEnvelope};
use tracing::instrument;

use super::{ActionContext, ActionError, PRINT_FAILED};
use crate::carrier::Carrier;
use crate::store::OrderRepository;
use crate::validate;

/// Fetch the shipping label of a submitted order.
///
/// `dataA` carries the raw label document, base64 encoded.
///
/// # Errors
///
/// Returns `ActionError` for validation, store and transport failures.
#[instrument(skip(ctx), fields(shop_id = %ctx.shop.id))]
pub async fn print<S, C>(
    ctx: &ActionContext<'_, S, C>,
    order_id: &OrderId,
) -> Result<ResultEnvelope, ActionError>
where
    S: OrderRepository,
    C: Carrier,
{
    let order = validate::order_found(ctx.store.find_order(order_id, &ctx.shop.id).await?)?;
    let label = validate::check_submitted(&order)?;

    let reply = ctx
        .carrier
        .fetch_label(&ctx.shop.config.carrier_auth_token, label)
        .await
        .map_err(ActionError::carrier(PRINT_FAILED))?;
    // A label is a document, not an envelope; only an explicit refusal fails.
    reply.lenient().map_err(ActionError::carrier(PRINT_FAILED))?;

    Ok(ResultEnvelope::success(BASE64_STANDARD.encode(reply.body()), ""))
}
