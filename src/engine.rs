use std::collections::HashSet;

use tracing::debug;

use crate::state::ObservationStore;
use crate::types::{Fill, OpenOrder, TrackerEvent};

/// Detect fills not yet notified for this wallet.
///
/// Each unseen fill is marked seen immediately, not after the batch, so a
/// later delivery failure cannot cause earlier fills in the same batch to
/// be re-emitted on the next cycle. Fills without an id cannot be
/// deduplicated and are skipped.
pub fn detect_fill_events(
    store: &mut ObservationStore,
    wallet: &str,
    fills: &[Fill],
) -> Vec<TrackerEvent> {
    let mut events = Vec::new();
    for fill in fills {
        let Some(fill_id) = fill.fill_id.as_deref() else {
            debug!("Skipping id-less fill for {wallet} ({})", fill.coin);
            continue;
        };
        if store.has_seen_fill(wallet, fill_id) {
            continue;
        }
        store.mark_seen(wallet, fill_id);
        events.push(TrackerEvent::FillObserved {
            wallet: wallet.to_string(),
            fill: fill.clone(),
        });
    }
    events
}

/// Diff the open-order set against the previous cycle and commit it.
///
/// Emits `OrderPlaced` for ids present now but absent before, in venue
/// order, and `OrderCancelled` for ids absent now but present before, in
/// ascending oid order. The commit is unconditional: state must advance
/// every cycle or closed orders would be re-reported as cancelled forever.
pub fn detect_order_events(
    store: &mut ObservationStore,
    wallet: &str,
    orders: &[OpenOrder],
) -> Vec<TrackerEvent> {
    let current: HashSet<u64> = orders.iter().map(|o| o.oid).collect();
    let (new_ids, closed_ids) = store.diff_open_orders(wallet, &current);

    let mut events = Vec::new();
    let mut pending_new = new_ids;
    for order in orders {
        if pending_new.remove(&order.oid) {
            events.push(TrackerEvent::OrderPlaced {
                wallet: wallet.to_string(),
                order: order.clone(),
            });
        }
    }

    let mut closed: Vec<u64> = closed_ids.into_iter().collect();
    closed.sort_unstable();
    for oid in closed {
        events.push(TrackerEvent::OrderCancelled {
            wallet: wallet.to_string(),
            oid,
        });
    }

    store.commit_open_orders(wallet, current);
    events
}
