//! Connection lifecycle flows: disconnect, reconnect, auto-resubscribe.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use console_bus::{BusClient, InMemoryBus, Payload};
    use console_stream::{MessageStreamApi, MessageStreamService, StreamConfig};

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(150)).await;
    }

    fn service(bus: &Arc<InMemoryBus>) -> MessageStreamService {
        crate::init_test_logging();
        let service =
            MessageStreamService::new(bus.clone(), StreamConfig::default()).expect("valid config");
        service.start();
        service
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_resubscribes_configured_topics() {
        let bus = Arc::new(InMemoryBus::new());
        let svc = service(&bus);

        // Never subscribed: zero live subscriptions
        assert!(!svc.snapshot().subscribed);

        bus.set_connected(false);
        assert!(!svc.snapshot().connection_ready);

        bus.set_connected(true);
        settle().await;

        let snap = svc.snapshot();
        assert!(snap.connection_ready);
        assert!(snap.subscribed);
        assert_eq!(bus.subscription_count(), 1);

        // The recovered subscription ingests (catch-all default topic)
        bus.publish("fleet/edge-9/status", Payload::from("back"))
            .await
            .unwrap();
        settle().await;
        assert_eq!(svc.snapshot().buffered, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_with_live_subscriptions_does_not_duplicate() {
        let bus = Arc::new(InMemoryBus::new());
        let svc = service(&bus);
        svc.subscribe_to_all_topics().await;
        assert_eq!(bus.subscription_count(), 1);

        bus.set_connected(false);
        bus.set_connected(true);
        settle().await;

        // Manager already held a live handle, so the reconnect policy
        // left it alone
        assert_eq!(bus.subscription_count(), 1);

        bus.publish("fleet/edge-1/status", Payload::from("m"))
            .await
            .unwrap();
        settle().await;
        assert_eq!(svc.snapshot().buffered, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_surfaces_as_state_not_error() {
        let bus = Arc::new(InMemoryBus::new());
        let svc = service(&bus);
        svc.subscribe_to_all_topics().await;

        bus.set_connected(false);

        let snap = svc.snapshot();
        assert!(!snap.connection_ready);
        // Subscriptions are not proactively torn down on disconnect
        assert!(snap.subscribed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe_all_then_reconnect_recovers() {
        let bus = Arc::new(InMemoryBus::new());
        let svc = service(&bus);
        svc.subscribe_to_all_topics().await;

        let released = svc.unsubscribe_from_all_topics().await;
        assert_eq!(released, 1);
        assert!(!svc.snapshot().subscribed);

        // A reconnect cycle restores the configured topic set
        bus.set_connected(false);
        bus.set_connected(true);
        settle().await;

        assert!(svc.snapshot().subscribed);
        assert_eq!(bus.subscription_count(), 1);
    }
}
