//! End-to-end discovery scenarios over loopback UDP.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use lantern_core::wire::{encode, DeviceRecord};
use lantern_services::discovery::{announce_loop, sweep_loop};

use crate::*;

const WINDOW: Duration = Duration::from_secs(5);

fn alpha() -> DeviceRecord {
    DeviceRecord {
        hostname: "alpha".to_string(),
        platform: "linux".to_string(),
        free_memory_mb: 512,
    }
}

#[tokio::test]
async fn record_appears_in_snapshot_under_sender_address() -> Result<()> {
    let (table, port) = start_listener()?;
    let (socket, sender_addr) = sender_socket()?;

    send_to_listener(&socket, port, &encode(&alpha())?)?;

    assert!(
        wait_until(|| !table.snapshot(WINDOW).is_empty(), Duration::from_secs(2)).await,
        "record never showed up in the snapshot"
    );

    let snap = table.snapshot(WINDOW);
    assert_eq!(snap.len(), 1);
    assert_eq!(snap[0].addr, sender_addr.ip());
    assert_eq!(snap[0].hostname, "alpha");
    assert_eq!(snap[0].platform, "linux");
    assert_eq!(snap[0].free_memory_mb, 512);
    Ok(())
}

#[tokio::test]
async fn embedded_ip_address_is_never_trusted() -> Result<()> {
    let (table, port) = start_listener()?;
    let (socket, sender_addr) = sender_socket()?;

    // An older node includes ipAddress in the payload — and here it lies.
    let payload = serde_json::json!({
        "ipAddress": "10.9.9.9",
        "hostname": "trickster",
        "platform": "linux",
        "freeMemoryMb": 64,
        "lastUpdate": 1700000000000u64,
    });
    send_to_listener(&socket, port, payload.to_string().as_bytes())?;

    assert!(
        wait_until(|| !table.snapshot(WINDOW).is_empty(), Duration::from_secs(2)).await
    );

    let snap = table.snapshot(WINDOW);
    assert_eq!(snap.len(), 1);
    assert_eq!(
        snap[0].addr,
        sender_addr.ip(),
        "entry address must be the transport source, not the payload claim"
    );
    assert_ne!(snap[0].addr.to_string(), "10.9.9.9");
    assert_eq!(snap[0].hostname, "trickster");
    Ok(())
}

#[tokio::test]
async fn malformed_datagram_is_dropped_and_listener_survives() -> Result<()> {
    let (table, port) = start_listener()?;
    let (socket, sender_addr) = sender_socket()?;

    send_to_listener(&socket, port, b"\x00\xffdefinitely not json")?;
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(table.is_empty(), "malformed datagram must not create an entry");

    // The listener is still alive: a well-formed record from the same
    // address upserts normally.
    send_to_listener(&socket, port, &encode(&alpha())?)?;
    assert!(
        wait_until(|| !table.snapshot(WINDOW).is_empty(), Duration::from_secs(2)).await,
        "listener stopped processing after a malformed datagram"
    );
    assert_eq!(table.snapshot(WINDOW)[0].addr, sender_addr.ip());
    Ok(())
}

#[tokio::test]
async fn later_record_from_same_address_wins() -> Result<()> {
    let (table, port) = start_listener()?;
    let (socket, _) = sender_socket()?;

    send_to_listener(&socket, port, &encode(&alpha())?)?;
    assert!(
        wait_until(|| !table.snapshot(WINDOW).is_empty(), Duration::from_secs(2)).await
    );

    let second = DeviceRecord {
        hostname: "alpha-renamed".to_string(),
        platform: "darwin".to_string(),
        free_memory_mb: 2048,
    };
    send_to_listener(&socket, port, &encode(&second)?)?;

    assert!(
        wait_until(
            || table
                .snapshot(WINDOW)
                .first()
                .is_some_and(|e| e.hostname == "alpha-renamed"),
            Duration::from_secs(2)
        )
        .await,
        "second record never replaced the first"
    );

    let snap = table.snapshot(WINDOW);
    assert_eq!(snap.len(), 1, "same sender must stay a single entry");
    assert_eq!(snap[0].platform, "darwin");
    assert_eq!(snap[0].free_memory_mb, 2048);
    Ok(())
}

#[tokio::test]
async fn silent_neighbour_leaves_the_snapshot() -> Result<()> {
    let (table, port) = start_listener()?;
    let (socket, _) = sender_socket()?;

    send_to_listener(&socket, port, &encode(&alpha())?)?;
    assert!(
        wait_until(|| !table.snapshot(WINDOW).is_empty(), Duration::from_secs(2)).await
    );

    // No further datagrams. Once the (short) window passes, the snapshot is
    // empty while the entry itself still exists until swept.
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(table.snapshot(Duration::from_millis(300)).is_empty());
    assert_eq!(table.len(), 1);
    Ok(())
}

#[tokio::test]
async fn sweep_task_eventually_deletes_dead_entries() -> Result<()> {
    let (table, port) = start_listener()?;
    let (socket, _) = sender_socket()?;

    send_to_listener(&socket, port, &encode(&alpha())?)?;
    assert!(
        wait_until(|| !table.is_empty(), Duration::from_secs(2)).await
    );

    // Tick interval and threshold are both configurable; a short pair makes
    // the delete observable without a long wait.
    tokio::spawn(sweep_loop(
        table.clone(),
        Duration::from_millis(100),
        Duration::from_millis(200),
    ));

    assert!(
        wait_until(|| table.is_empty(), Duration::from_secs(2)).await,
        "sweep never deleted the dead entry"
    );
    Ok(())
}

#[tokio::test]
async fn announcer_publishes_live_metrics() -> Result<()> {
    let (table, port) = start_listener()?;

    let metrics = Arc::new(FakeMetrics {
        hostname: "fake-host",
        platform: "testos",
        free_bytes: 512 * 1024 * 1024,
    });

    let dest = format!("127.0.0.1:{port}").parse()?;
    tokio::spawn(announce_loop(metrics, dest, Duration::from_millis(50)));

    assert!(
        wait_until(|| !table.snapshot(WINDOW).is_empty(), Duration::from_secs(2)).await,
        "announcement never reached the listener"
    );

    let snap = table.snapshot(WINDOW);
    assert_eq!(snap[0].hostname, "fake-host");
    assert_eq!(snap[0].platform, "testos");
    assert_eq!(snap[0].free_memory_mb, 512, "bytes must be converted to MB");
    Ok(())
}
