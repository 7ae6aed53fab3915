//! Submit a stored order to the carrier.

use shipgate_core::{OrderId, ResultEnvelope, ShipmentLabel};
use tracing::{error, info, instrument, warn};

use super::{ActionContext, ActionError, SUBMIT_FAILED};
use crate::carrier::{Carrier, Product, ShipmentRequest};
use crate::store::OrderRepository;
use crate::validate;

/// Validate the order, create the shipment and persist the carrier label.
///
/// This is the only action that mutates an order, so the carrier reply is
/// read strictly: an unparseable body fails the submission.
///
/// # Errors
///
/// Returns `ActionError` for validation, store and carrier failures.
#[instrument(skip(ctx), fields(shop_id = %ctx.shop.id))]
pub async fn submit<S, C>(
    ctx: &ActionContext<'_, S, C>,
    order_id: &OrderId,
) -> Result<ResultEnvelope, ActionError>
where
    S: OrderRepository,
    C: Carrier,
{
    let shop = ctx.shop;
    let mut order = validate::order_found(ctx.store.find_order(order_id, &shop.id).await?)?;
    validate::check_submittable(&order)?;

    let customer = ctx
        .store
        .find_customer_by_phone(&order.phone, &shop.id)
        .await?
        .unwrap_or_default();
    validate::check_recipient(&customer, &order)?;

    let products = order
        .items
        .iter()
        .map(|item| {
            let name = ctx.titles.decode(&item.title).unwrap_or_else(|| {
                warn!(title = %item.title, "Could not decode item title");
                String::new()
            });
            Product::new(name, item.quantity)
        })
        .collect();
    let request = ShipmentRequest::new(&shop.name, &shop.config, &customer, &order, products);

    let response = ctx
        .carrier
        .create_shipment(&shop.config.carrier_auth_token, &request)
        .await
        .and_then(|reply| reply.strict())
        .map_err(ActionError::carrier(SUBMIT_FAILED))?;

    let fee = response.order.fee.parse::<i64>().unwrap_or_else(|_| {
        warn!(fee = %response.order.fee, "Carrier fee is not an integer, storing 0");
        0
    });
    if response.order.label.is_empty() {
        warn!("Carrier accepted the shipment without a label");
    }
    let label = ShipmentLabel::new(response.order.label);
    order.mark_submitted(label.clone(), fee);

    if let Err(e) = ctx.store.save_order(&shop.id, &order).await {
        // The carrier holds a shipment the store does not know about.
        error!(label = %label, error = %e, "Submitted order could not be saved");
        return Err(e.into());
    }

    let info = serde_json::to_string(&order).map_err(ActionError::Encode)?;
    info!(label = %label, fee, "Order submitted to carrier");

    Ok(ResultEnvelope::success("success", info))
}
