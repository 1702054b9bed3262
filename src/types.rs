use serde::{Deserialize, Deserializer};

/// Trade direction as reported by the venue.
///
/// The info API encodes side as a string; any value other than `"Buy"`
/// counts as a sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl<'de> Deserialize<'de> for Side {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(if raw == "Buy" { Side::Buy } else { Side::Sell })
    }
}

/// A trade fill from the venue's fill-history query. Immutable once
/// observed; identity is `fill_id`, scoped per wallet.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    /// Venue-assigned identifier. Occasionally absent; id-less fills
    /// cannot be deduplicated and are never notified.
    #[serde(default)]
    pub fill_id: Option<String>,
    pub side: Side,
    pub coin: String,
    pub px: String,
    pub sz: String,
    /// Fill time in unix milliseconds.
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub crossed: bool,
}

impl Fill {
    /// Perp/spot classification. `crossed` is the only market-type signal
    /// the fill payload carries, so spot fills that crossed the book will
    /// be mislabeled.
    pub fn is_perp(&self) -> bool {
        self.crossed
    }
}

/// A resting order from the venue's open-orders query. Only its presence
/// or absence between polls is tracked; an order that changes price or
/// size while keeping its oid counts as unchanged.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenOrder {
    pub oid: u64,
    pub side: Side,
    pub coin: String,
    pub px: String,
    pub sz: String,
    #[serde(default)]
    pub reduce_only: bool,
    #[serde(default)]
    pub is_position_tpsl: bool,
}

impl OpenOrder {
    /// Heuristic perp/spot classification. The info API has no unambiguous
    /// market-type field on orders, so any of three signals marks an order
    /// as perp: a position TP/SL flag, a PERP coin suffix, or reduce-only.
    /// A spot order with a reduce-only-like flag will be mislabeled.
    pub fn is_perp(&self) -> bool {
        self.is_position_tpsl || self.coin.ends_with("PERP") || self.reduce_only
    }
}

/// A notification-worthy change detected during one poll cycle. Produced
/// and consumed within the same cycle, never stored.
#[derive(Debug, Clone)]
pub enum TrackerEvent {
    FillObserved { wallet: String, fill: Fill },
    OrderPlaced { wallet: String, order: OpenOrder },
    OrderCancelled { wallet: String, oid: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fill_deserializes_from_venue_payload() {
        let fill: Fill = serde_json::from_value(json!({
            "fillId": "f1",
            "side": "Buy",
            "coin": "ETH",
            "px": "3120.5",
            "sz": "0.25",
            "time": 1717000000000i64,
            "crossed": true
        }))
        .expect("valid fill JSON");
        assert_eq!(fill.fill_id.as_deref(), Some("f1"));
        assert_eq!(fill.side, Side::Buy);
        assert_eq!(fill.coin, "ETH");
        assert!(fill.is_perp());
    }

    #[test]
    fn fill_tolerates_missing_optional_fields() {
        let fill: Fill = serde_json::from_value(json!({
            "side": "Sell",
            "coin": "PURR",
            "px": "0.18",
            "sz": "500"
        }))
        .expect("valid fill JSON");
        assert!(fill.fill_id.is_none());
        assert_eq!(fill.side, Side::Sell);
        assert!(!fill.is_perp());
    }

    #[test]
    fn unknown_side_string_counts_as_sell() {
        let fill: Fill = serde_json::from_value(json!({
            "side": "A",
            "coin": "ETH",
            "px": "1",
            "sz": "1"
        }))
        .expect("valid fill JSON");
        assert_eq!(fill.side, Side::Sell);
    }

    #[test]
    fn order_deserializes_from_venue_payload() {
        let order: OpenOrder = serde_json::from_value(json!({
            "oid": 42u64,
            "side": "Buy",
            "coin": "BTC",
            "px": "64000",
            "sz": "0.1"
        }))
        .expect("valid order JSON");
        assert_eq!(order.oid, 42);
        assert!(!order.reduce_only);
        assert!(!order.is_perp());
    }

    // ── perp/spot heuristic ────────────────────────────────────────

    fn bare_order(coin: &str) -> OpenOrder {
        OpenOrder {
            oid: 1,
            side: Side::Buy,
            coin: coin.to_string(),
            px: "1".to_string(),
            sz: "1".to_string(),
            reduce_only: false,
            is_position_tpsl: false,
        }
    }

    #[test]
    fn order_perp_via_coin_suffix() {
        assert!(bare_order("ETHPERP").is_perp());
        assert!(!bare_order("ETH").is_perp());
    }

    #[test]
    fn order_perp_via_reduce_only() {
        let mut order = bare_order("ETH");
        order.reduce_only = true;
        assert!(order.is_perp());
    }

    #[test]
    fn order_perp_via_tpsl_flag() {
        let mut order = bare_order("ETH");
        order.is_position_tpsl = true;
        assert!(order.is_perp());
    }
}
