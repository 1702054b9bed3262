use std::collections::{HashMap, HashSet};

/// Per-wallet record of already-notified fills and currently open orders.
#[derive(Debug, Default)]
struct WalletState {
    seen_fills: HashSet<String>,
    open_orders: HashSet<u64>,
}

/// In-memory observation state for every tracked wallet. The single source
/// of truth for deduplication.
///
/// `seen_fills` only grows for the lifetime of the process and is not
/// persisted; `open_orders` always equals the id set returned by the most
/// recent successful open-orders query, replaced wholesale by
/// `commit_open_orders`, never merged.
#[derive(Debug, Default)]
pub struct ObservationStore {
    wallets: HashMap<String, WalletState>,
}

impl ObservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_seen_fill(&self, wallet: &str, fill_id: &str) -> bool {
        self.wallets
            .get(wallet)
            .is_some_and(|w| w.seen_fills.contains(fill_id))
    }

    pub fn mark_seen(&mut self, wallet: &str, fill_id: &str) {
        self.wallets
            .entry(wallet.to_string())
            .or_default()
            .seen_fills
            .insert(fill_id.to_string());
    }

    /// Split the current open-order id set against the last committed one,
    /// returning `(newly opened, newly closed)`.
    ///
    /// Must be called before `commit_open_orders` within a cycle; the
    /// commit overwrites the set this diff reads.
    pub fn diff_open_orders(
        &self,
        wallet: &str,
        current: &HashSet<u64>,
    ) -> (HashSet<u64>, HashSet<u64>) {
        let empty = HashSet::new();
        let previous = self
            .wallets
            .get(wallet)
            .map(|w| &w.open_orders)
            .unwrap_or(&empty);
        let new_ids = current.difference(previous).copied().collect();
        let closed_ids = previous.difference(current).copied().collect();
        (new_ids, closed_ids)
    }

    /// Replace the stored open-order set for a wallet.
    pub fn commit_open_orders(&mut self, wallet: &str, current: HashSet<u64>) {
        self.wallets
            .entry(wallet.to_string())
            .or_default()
            .open_orders = current;
    }
}
