//! Rebuild the status log of a shipment from stored webhook events.

use base64::Engine as _;
use base64::prelude::BASE64_STANDARD;
use shipgate_core::{ResultEnvelope, ShipmentLabel, WebhookEvent, status_text};
use tracing::{instrument, warn};

use super::{ActionContext, ActionError};
use crate::store::WebhookEventLog;

/// Rebuild the status history of a shipment from recorded carrier callbacks.
///
/// `dataB` is a JSON array of `{"time", "log"}` records in the order the
/// events were recorded. It is assembled as text so each record carries the
/// event time exactly as formatted.
///
/// # Errors
///
/// Returns `ActionError::Store` if the event log cannot be read.
#[instrument(skip_all, fields(shop_id = %ctx.shop.id, label = %label))]
pub async fn view_log<S, C>(
    ctx: &ActionContext<'_, S, C>,
    label: &str,
) -> Result<ResultEnvelope, ActionError>
where
    S: WebhookEventLog,
{
    let events = ctx
        .store
        .events_for_label(&ShipmentLabel::new(label))
        .await?;
    let records: Vec<String> = events.iter().filter_map(log_record).collect();

    Ok(ResultEnvelope::success(
        "success",
        format!("[{}]", records.join(",")),
    ))
}

/// One `{"time","log"}` record, or `None` for events without a status.
fn log_record(event: &WebhookEvent) -> Option<String> {
    let update = match event.status_update() {
        Ok(update) => update,
        Err(e) => {
            warn!(label = %event.label, error = %e, "Skipping undecodable webhook payload");
            return None;
        }
    };
    if update.status_id.is_empty() {
        return None;
    }

    let text = status_text(&update.status_id).unwrap_or_default();
    let log = BASE64_STANDARD.encode(format!("{text} - {}", update.reason));
    // Both values are free of characters that need JSON escaping.
    Some(format!(
        r#"{{"time":"{}","log":"{log}"}}"#,
        event.log_time()
    ))
}
