//! Live activity feed.
//!
//! A background task that periodically tells every connected client that a
//! random shopper just bought a random product. Purely cosmetic: nothing is
//! bought and no state changes.

use std::sync::Arc;
use std::time::Duration;

use aether_core::{Activity, Product};
use chrono::{Local, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use super::Gateway;

/// Display names the feed picks shoppers from.
pub const DISPLAY_NAMES: [&str; 6] = ["Alex", "Sarah_99", "Jordan", "Neo", "Trinity", "Guest_4021"];

/// Build an activity event for a random product and shopper.
///
/// Returns `None` when there are no products to pick from.
pub fn compose<R: Rng + ?Sized>(products: &[Product], rng: &mut R) -> Option<Activity> {
    let product = products.choose(rng)?;
    let shopper = DISPLAY_NAMES.choose(rng)?;

    Some(Activity {
        id: Utc::now().timestamp_millis().to_string(),
        message: format!("{shopper} just secured a {}", product.name),
        time: Local::now().format("%-I:%M:%S %p").to_string(),
    })
}

/// Spawn the feed. The first event goes out one full `period` after start.
pub fn spawn(gateway: Arc<Gateway>, period: Duration) -> JoinHandle<()> {
    info!(period_secs = period.as_secs_f64(), "Starting live activity feed");
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            tick(&gateway);
        }
    })
}

/// Run one feed step. Returns how many clients the event reached, if one
/// was sent.
pub fn tick(gateway: &Gateway) -> Option<usize> {
    if gateway.hub().client_count() == 0 {
        return None;
    }

    let products = match gateway.catalog().snapshot() {
        Ok(products) => products,
        Err(e) => {
            warn!(error = %e, "Skipping activity event, catalog unreadable");
            return None;
        }
    };

    let activity = compose(&products, &mut rand::rng())?;
    match gateway.broadcast_activity(activity) {
        Ok(delivered) => {
            debug!(delivered, "Live activity broadcast");
            Some(delivered)
        }
        Err(e) => {
            warn!(error = %e, "Failed to broadcast live activity");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use aether_core::{Price, ProductId};
    use axum::extract::ws::Message;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::catalog::{InMemoryCatalog, default_products};

    #[test]
    fn test_compose_uses_known_names() {
        let products = default_products();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let activity = compose(&products, &mut rng).unwrap();
            let (shopper, rest) = activity.message.split_once(" just secured a ").unwrap();
            assert!(DISPLAY_NAMES.contains(&shopper));
            assert!(products.iter().any(|p| p.name == rest));
            assert!(activity.time.ends_with("AM") || activity.time.ends_with("PM"));
            assert!(activity.id.parse::<i64>().is_ok());
        }
    }

    #[test]
    fn test_compose_empty_catalog() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(compose(&[], &mut rng).is_none());
    }

    #[test]
    fn test_compose_single_product() {
        let products = vec![Product {
            id: ProductId::new("9"),
            name: "Solo".to_string(),
            price: Price::default(),
            stock: 1,
            image: String::new(),
            category: String::new(),
        }];
        let mut rng = StdRng::seed_from_u64(1);
        let activity = compose(&products, &mut rng).unwrap();
        assert!(activity.message.ends_with("just secured a Solo"));
    }

    #[test]
    fn test_tick_without_clients_sends_nothing() {
        let gateway = Gateway::new(Arc::new(InMemoryCatalog::default()), 8);
        assert_eq!(tick(&gateway), None);
    }

    #[test]
    fn test_tick_with_empty_catalog_sends_nothing() {
        let gateway = Gateway::new(Arc::new(InMemoryCatalog::new(Vec::new())), 8);
        let (_id, mut rx) = gateway.connect().unwrap();
        rx.try_recv().unwrap();

        assert_eq!(tick(&gateway), None);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_tick_broadcasts_to_all_clients() {
        let gateway = Gateway::new(Arc::new(InMemoryCatalog::default()), 8);
        let (_a, mut rx_a) = gateway.connect().unwrap();
        let (_b, mut rx_b) = gateway.connect().unwrap();
        rx_a.try_recv().unwrap();
        rx_b.try_recv().unwrap();

        assert_eq!(tick(&gateway), Some(2));

        for rx in [&mut rx_a, &mut rx_b] {
            let Message::Text(text) = rx.try_recv().unwrap() else {
                panic!("expected a text frame");
            };
            let value: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
            assert_eq!(value["event"], "live_activity");
            assert!(value["data"]["message"].is_string());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_feed_waits_one_period_before_first_event() {
        let gateway = Arc::new(Gateway::new(Arc::new(InMemoryCatalog::default()), 8));
        let (_id, mut rx) = gateway.connect().unwrap();
        rx.recv().await.unwrap();

        let feed = spawn(Arc::clone(&gateway), Duration::from_secs(6));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_ok());

        feed.abort();
    }
}
