use chrono::{TimeZone, Utc};
use tracing::warn;

use crate::telegram::TelegramClient;
use crate::types::{Side, TrackerEvent};

/// Render one event into the Markdown block sent to the chat.
pub fn render(event: &TrackerEvent) -> String {
    match event {
        TrackerEvent::FillObserved { wallet, fill } => {
            let icon = match fill.side {
                Side::Buy => "🟢",
                Side::Sell => "🔴",
            };
            let market = if fill.is_perp() { "PERP" } else { "SPOT" };
            format!(
                "👤 `{wallet}`\n{icon} *{market} {direction}* `{coin}`\nPrice: {px} USDC\nSize: {sz}\nTime: {time}",
                direction = direction(fill.side),
                coin = fill.coin,
                px = fill.px,
                sz = fill.sz,
                time = format_time(fill.time),
            )
        }
        TrackerEvent::OrderPlaced { wallet, order } => {
            let market = if order.is_perp() { "PERP" } else { "SPOT" };
            format!(
                "👤 `{wallet}`\n📥 *{market} {direction} Order PLACED*\nSize: {sz}\nPrice: {px} USDC",
                direction = direction(order.side),
                sz = order.sz,
                px = order.px,
            )
        }
        TrackerEvent::OrderCancelled { wallet, oid } => {
            format!("👤 `{wallet}`\n❌ *Order CANCELLED*\nOID: `{oid}`")
        }
    }
}

fn direction(side: Side) -> &'static str {
    match side {
        Side::Buy => "BUY",
        Side::Sell => "SELL",
    }
}

/// Venue timestamps are unix milliseconds; out-of-range values fall back
/// to the raw number.
fn format_time(millis: i64) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => millis.to_string(),
    }
}

/// Renders events and hands them to the chat delivery sink.
pub struct Notifier {
    telegram: TelegramClient,
    chat_id: String,
}

impl Notifier {
    pub fn new(telegram: TelegramClient, chat_id: impl Into<String>) -> Self {
        Self {
            telegram,
            chat_id: chat_id.into(),
        }
    }

    /// Deliver one event to the configured chat.
    ///
    /// Delivery failures are logged and reported to the caller; they never
    /// roll back observation state, so a dropped message stays dropped
    /// rather than blocking the loop or re-firing later.
    pub async fn notify(&self, event: &TrackerEvent) -> bool {
        let text = render(event);
        match self.telegram.send_message(&self.chat_id, &text, true).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to deliver notification: {e:#}");
                false
            }
        }
    }
}
