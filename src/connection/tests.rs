//! Tests for the connection layer
//!
//! These drive a real driver task through a `ChannelTransport`, the same way
//! a wireless stack would.

use std::time::Duration;

use futures::StreamExt;

use super::*;
use crate::config::LinkConfig;
use crate::protocol::PayloadLayout;
use crate::test_utils::{PayloadBuilder, frame_stream, live_data_frame, notifications};
use crate::transport::channel;
use crate::types::{DecodeDiagnostic, LinkStatus, UpdateRate};
use crate::LinkError;

fn speed_frame(mm_s: i32) -> Vec<u8> {
    live_data_frame(&PayloadBuilder::new().i32(48, mm_s).build())
}

#[tokio::test]
async fn records_arrive_in_order_across_notifications() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let (tx, transport) = channel(64);
    let connection = LinkConnection::attach(transport, &LinkConfig::default()).unwrap();
    let records = connection.records();

    for chunk in notifications(&frame_stream(5), 20) {
        tx.send(chunk).await.unwrap();
    }
    drop(tx);

    let times: Vec<u32> = records.map(|r| r.utc_time).collect().await;
    assert_eq!(times, vec![0, 1, 2, 3, 4]);
    assert_eq!(connection.stats().records, 5);
}

#[tokio::test]
async fn diagnostics_report_resync() {
    let (tx, transport) = channel(8);
    let connection = LinkConnection::attach(transport, &LinkConfig::default()).unwrap();
    let diagnostics = connection.diagnostics();

    let mut bytes = vec![0x01, 0x02, 0x03];
    bytes.extend(speed_frame(1000));
    tx.send(bytes).await.unwrap();
    drop(tx);

    let diags: Vec<DecodeDiagnostic> = diagnostics.collect().await;
    assert_eq!(diags, vec![DecodeDiagnostic::GarbageSkipped { discarded: 3 }]);
}

#[tokio::test]
async fn later_event_streams_start_at_subscription() {
    let (tx, transport) = channel(8);
    let connection = LinkConnection::attach(transport, &LinkConfig::default()).unwrap();
    let mut first = connection.records();

    tx.send(speed_frame(1000)).await.unwrap();
    assert!(first.next().await.is_some());

    let second = connection.records();
    tx.send(speed_frame(2000)).await.unwrap();
    drop(tx);

    let later: Vec<_> = second.collect().await;
    assert_eq!(later.len(), 1);
    assert!((later[0].speed_mph - 2.0 * 2.23694).abs() < 1e-9);
}

#[tokio::test]
async fn latest_and_status_follow_the_stream() {
    let (tx, transport) = channel(8);
    let connection = LinkConnection::attach(transport, &LinkConfig::default()).unwrap();
    assert_eq!(connection.status(), LinkStatus::Connecting);
    assert!(connection.latest().is_none());

    let mut updates = connection.subscribe(UpdateRate::Native);
    tx.send(speed_frame(10_000)).await.unwrap();

    let record = updates.next().await.unwrap();
    assert!((record.speed_mph - 22.3694).abs() < 1e-9);
    assert_eq!(connection.status(), LinkStatus::Streaming);
    assert_eq!(connection.latest().unwrap().utc_time, record.utc_time);

    drop(tx);
    assert_eq!(connection.closed().await, LinkStatus::Disconnected { reason: "transport closed".into() });
}

#[tokio::test(start_paused = true)]
async fn throttled_subscription_skips_intermediate_records() {
    let (tx, transport) = channel(64);
    let connection = LinkConnection::attach(transport, &LinkConfig::default()).unwrap();
    let mut throttled = connection.subscribe(UpdateRate::Max(5));

    tx.send(speed_frame(1000)).await.unwrap();
    let first = throttled.next().await.unwrap();
    assert!((first.speed_mph - 2.23694).abs() < 1e-9);

    // Three records inside one 200ms window: only the last survives
    tx.send([speed_frame(2000), speed_frame(3000), speed_frame(4000)].concat()).await.unwrap();
    let next = throttled.next().await.unwrap();
    assert!((next.speed_mph - 4.0 * 2.23694).abs() < 1e-9);
}

#[tokio::test]
async fn status_updates_end_with_disconnect() {
    let (_tx, transport) = channel(8);
    let connection = LinkConnection::attach(transport, &LinkConfig::default()).unwrap();

    connection.close();

    let last = connection
        .status_updates()
        .skip_while(|s| futures::future::ready(!s.is_disconnected()))
        .next()
        .await;
    assert_eq!(last, Some(LinkStatus::Disconnected { reason: "cancelled".into() }));
}

#[tokio::test]
async fn dropping_connection_stops_driver() {
    let (tx, transport) = channel(8);
    let connection = LinkConnection::attach(transport, &LinkConfig::default()).unwrap();
    drop(connection);

    tokio::time::timeout(Duration::from_secs(1), tx.closed())
        .await
        .expect("driver should release the transport");
    assert!(matches!(tx.send(vec![0xB5]).await, Err(LinkError::ChannelClosed)));
}

#[tokio::test]
async fn invalid_config_is_rejected_at_attach() {
    let (_tx, transport) = channel(8);
    let config = LinkConfig {
        custom_layout: Some(PayloadLayout { heading: 80, ..PayloadLayout::mini() }),
        ..LinkConfig::default()
    };
    assert!(matches!(LinkConnection::attach(transport, &config), Err(LinkError::Layout { .. })));
}

#[tokio::test]
async fn legacy_config_decodes_legacy_frames() {
    let (tx, transport) = channel(8);
    let config = LinkConfig::from_yaml_str("layout: legacy").unwrap();
    let connection = LinkConnection::attach(transport, &config).unwrap();
    let records = connection.records();

    tx.send(live_data_frame(&PayloadBuilder::new().i32(56, 2_000_000).build())).await.unwrap();
    drop(tx);

    let records: Vec<_> = records.collect().await;
    assert!((records[0].accel.x - 2.0).abs() < 1e-9);
    assert_eq!(records[0].fix, None);
}

#[tokio::test(start_paused = true)]
async fn wait_for_record_times_out_then_succeeds() {
    let (tx, transport) = channel(8);
    let connection = LinkConnection::attach(transport, &LinkConfig::default()).unwrap();

    let err = connection.wait_for_record(Duration::from_millis(200)).await.unwrap_err();
    assert!(matches!(err, LinkError::Timeout { .. }));
    assert!(err.is_retryable());

    tx.send(speed_frame(500)).await.unwrap();
    let record = connection.wait_for_record(Duration::from_secs(1)).await.unwrap();
    assert!(record.is_moving());

    drop(tx);
    connection.closed().await;
    // Already decoded, so no wait
    assert!(connection.wait_for_record(Duration::ZERO).await.is_ok());
}

#[tokio::test]
async fn wait_for_record_fails_when_link_ends_empty() {
    let (tx, transport) = channel(8);
    let connection = LinkConnection::attach(transport, &LinkConfig::default()).unwrap();
    drop(tx);

    let err = connection.wait_for_record(Duration::from_secs(5)).await.unwrap_err();
    assert!(matches!(err, LinkError::ChannelClosed));
}
