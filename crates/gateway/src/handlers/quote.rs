//! Quote the carrier fee for an order payload.

use shipgate_core::{Order, ResultEnvelope};
use tracing::{debug, instrument};

use super::{ActionContext, ActionError, QUOTE_FAILED};
use crate::carrier::{Carrier, FeeQuery};
use crate::validate;

/// Quote the shipping fee for an order described inline in `params`.
///
/// Nothing is read from or written to the store. `dataA` is the fee in the
/// carrier's currency unit.
///
/// # Errors
///
/// Returns `ActionError` for an unparseable payload, validation failures and
/// carrier failures.
#[instrument(skip_all, fields(shop_id = %ctx.shop.id))]
pub async fn quote<S, C>(
    ctx: &ActionContext<'_, S, C>,
    params: &str,
) -> Result<ResultEnvelope, ActionError>
where
    C: Carrier,
{
    let order: Order = serde_json::from_str(params).map_err(ActionError::Payload)?;
    validate::check_quotable(&order)?;

    let query = FeeQuery::new(&ctx.shop.config, &order);
    debug!(weight = query.weight, "Requesting fee quote");

    let response = ctx
        .carrier
        .quote_fee(&ctx.shop.config.carrier_auth_token, &query)
        .await
        .and_then(|reply| reply.lenient())
        .map_err(ActionError::carrier(QUOTE_FAILED))?;

    Ok(ResultEnvelope::success(response.fee.fee.to_string(), ""))
}
