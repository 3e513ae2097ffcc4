//! End-to-end ingestion flow: publish on the bus, observe through the
//! paginated snapshot.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use console_bus::{BusClient, InMemoryBus, Payload};
    use console_stream::{
        extract_payload, MessageStreamApi, MessageStreamService, StreamConfig,
    };
    use serde_json::json;

    fn config(capacity: usize, page_size: usize) -> StreamConfig {
        StreamConfig {
            buffer_capacity: capacity,
            page_size,
            ..StreamConfig::default()
        }
    }

    async fn started_service(
        bus: &Arc<InMemoryBus>,
        capacity: usize,
        page_size: usize,
    ) -> MessageStreamService {
        crate::init_test_logging();
        let service = MessageStreamService::new(bus.clone(), config(capacity, page_size))
            .expect("valid config");
        service.start();
        let outcome = service.subscribe_to_all_topics().await;
        assert!(outcome.any_succeeded());
        service
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(150)).await;
    }

    fn page_tags(service: &MessageStreamService) -> Vec<String> {
        service
            .snapshot()
            .records
            .iter()
            .map(|r| r.payload.raw_string())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_five_page_size_two_scenario() {
        let bus = Arc::new(InMemoryBus::new());
        let service = started_service(&bus, 5, 2).await;

        for tag in ["A", "B", "C", "D", "E", "F"] {
            bus.publish("fleet/edge-1/event", Payload::from(tag))
                .await
                .unwrap();
        }
        settle().await;

        // A (the oldest) was evicted; newest first
        let snap = service.snapshot();
        assert_eq!(snap.buffered, 5);
        assert_eq!(snap.total_pages, 3);
        assert_eq!(page_tags(&service), vec!["F", "E"]);

        service.go_to_page(3).unwrap();
        assert_eq!(page_tags(&service), vec!["B"]);

        service.clear_messages();
        let snap = service.snapshot();
        assert_eq!(snap.buffered, 0);
        assert_eq!(snap.total_pages, 1);
        assert_eq!(snap.current_page, 1);
        assert!(snap.records.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_topic_filter_limits_ingestion() {
        let bus = Arc::new(InMemoryBus::new());
        let service = MessageStreamService::new(
            bus.clone(),
            StreamConfig {
                topics: vec!["fleet/+/alarm".to_string()],
                ..config(10, 5)
            },
        )
        .expect("valid config");
        service.start();
        service.subscribe_to_all_topics().await;

        bus.publish("fleet/edge-1/alarm", Payload::from("door"))
            .await
            .unwrap();
        bus.publish("fleet/edge-1/metric", Payload::from("22.5"))
            .await
            .unwrap();
        settle().await;

        let snap = service.snapshot();
        assert_eq!(snap.buffered, 1);
        assert_eq!(snap.records[0].topic, "fleet/edge-1/alarm");
    }

    #[tokio::test(start_paused = true)]
    async fn test_records_capture_topic_and_summary() {
        let bus = Arc::new(InMemoryBus::new());
        let service = started_service(&bus, 10, 5).await;

        bus.publish(
            "fleet/edge-3/telemetry",
            Payload::from(json!({
                "type": "telemetry",
                "data": {"volts": 12.4, "amps": 0.7},
                "id": "m-17",
            })),
        )
        .await
        .unwrap();
        settle().await;

        let snap = service.snapshot();
        let record = &snap.records[0];
        assert_eq!(record.topic, "fleet/edge-3/telemetry");
        assert!(record.id.contains('-'));

        let summary = extract_payload(&record.payload, 150);
        assert_eq!(summary, "type: telemetry, data: {amps, volts}, id: m-17");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sustained_burst_stays_bounded() {
        let bus = Arc::new(InMemoryBus::new());
        let service = started_service(&bus, 30, 10).await;

        for wave in 0..4 {
            for i in 0..25 {
                bus.publish(
                    "fleet/edge-1/metric",
                    Payload::from(format!("{wave}-{i}")),
                )
                .await
                .unwrap();
            }
            settle().await;
            assert!(service.snapshot().buffered <= 30);
        }

        // Only the most recent wave survives
        let snap = service.snapshot();
        assert_eq!(snap.buffered, 30);
        assert_eq!(snap.records[0].payload.raw_string(), "3-24");
    }
}
