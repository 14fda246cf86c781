mod common;

use common::FakeProber;
use netmonitor::collector::reachability::{ReachabilityCollector, target_list};
use netmonitor::collector::{self, Collector};
use netmonitor::models::ProbeMethod;
use netmonitor::probe::{ProbeError, probe_host, tcp_ping};
use netmonitor::store::Store;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const PORTS: [u16; 4] = [80, 443, 53, 22];

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[tokio::test]
async fn icmp_success_skips_tcp() {
    let prober = FakeProber::new(Some(ms(7)), &[(80, ms(1))]);
    let outcome = probe_host(&prober, "8.8.8.8", &PORTS).await;

    assert!(outcome.success());
    assert_eq!(outcome.latency, Some(ms(7)));
    assert_eq!(outcome.method, ProbeMethod::Icmp);
    assert!(outcome.error.is_none());
    assert_eq!(prober.calls(), vec!["icmp 8.8.8.8"]);
}

#[tokio::test]
async fn tcp_fallback_stops_at_first_open_port() {
    let prober = FakeProber::new(None, &[(443, ms(15)), (53, ms(2))]);
    let outcome = probe_host(&prober, "1.1.1.1", &PORTS).await;

    assert!(outcome.success());
    assert_eq!(outcome.latency, Some(ms(15)));
    assert_eq!(outcome.method, ProbeMethod::Tcp(443));
    assert_eq!(outcome.method.to_string(), "TCP:443");
    assert!(matches!(outcome.error, Some(ProbeError::Timeout(_))));
    assert_eq!(
        prober.calls(),
        vec!["icmp 1.1.1.1", "tcp 1.1.1.1:80", "tcp 1.1.1.1:443"]
    );
}

#[tokio::test]
async fn all_methods_failing_reports_failed() {
    let prober = FakeProber::new(None, &[]);
    let outcome = probe_host(&prober, "10.9.9.9", &PORTS).await;

    assert!(!outcome.success());
    assert_eq!(outcome.latency, None);
    assert_eq!(outcome.method, ProbeMethod::Failed);
    assert!(matches!(outcome.error, Some(ProbeError::AllFailed)));
    assert_eq!(prober.calls().len(), 1 + PORTS.len());
    assert_eq!(prober.calls().last().unwrap(), "tcp 10.9.9.9:22");
}

#[tokio::test]
async fn empty_port_list_means_icmp_only() {
    let prober = FakeProber::new(None, &[(80, ms(1))]);
    let outcome = probe_host(&prober, "host", &[]).await;
    assert_eq!(outcome.method, ProbeMethod::Failed);
    assert_eq!(prober.calls(), vec!["icmp host"]);
}

#[tokio::test]
async fn collector_records_tcp_fallback_samples() {
    let store = Arc::new(Store::new());
    let prober = Arc::new(FakeProber::new(None, &[(443, ms(20))]));
    let collector = ReachabilityCollector::with_targets(
        store.clone(),
        prober.clone(),
        vec!["8.8.8.8".into()],
        PORTS.to_vec(),
    );

    for _ in 0..3 {
        collector.collect().await;
    }

    let stats = store.snapshot_pings().remove("8.8.8.8").unwrap();
    assert_eq!(stats.total_pings, 3);
    assert_eq!(stats.failed_pings, 0);
    assert_eq!(stats.packet_loss, 0.0);
    assert_eq!(stats.avg_latency, ms(20));
    assert!(stats.last_method.is_tcp());
    assert!(stats.history.iter().all(|p| p.success));
}

#[tokio::test]
async fn collector_records_failures_with_zero_latency() {
    let store = Arc::new(Store::new());
    let prober = Arc::new(FakeProber::new(None, &[]));
    let collector = ReachabilityCollector::with_targets(
        store.clone(),
        prober,
        vec!["192.0.2.1".into(), "127.0.0.1".into()],
        vec![80],
    );
    collector.collect().await;

    let pings = store.snapshot_pings();
    assert_eq!(pings.len(), 2);
    let stats = &pings["192.0.2.1"];
    assert_eq!(stats.packet_loss, 100.0);
    assert_eq!(stats.last_method, ProbeMethod::Failed);
    assert_eq!(stats.history[0].latency, Duration::ZERO);
    assert!(!stats.history[0].success);
}

#[tokio::test]
async fn collector_probes_targets_in_order() {
    let store = Arc::new(Store::new());
    let prober = Arc::new(FakeProber::new(Some(ms(1)), &[]));
    let targets = target_list(
        &["8.8.8.8".into(), "1.1.1.1".into()],
        Some(Ipv4Addr::new(192, 168, 1, 1)),
    );
    let collector =
        ReachabilityCollector::with_targets(store.clone(), prober.clone(), targets, vec![]);
    assert_eq!(collector.name(), "reachability");
    collector.collect().await;

    assert_eq!(
        prober.calls(),
        vec!["icmp 192.168.1.1", "icmp 8.8.8.8", "icmp 1.1.1.1"]
    );
    assert_eq!(store.snapshot_pings()["192.168.1.1"].last_method, ProbeMethod::Icmp);
}

#[test]
fn target_list_puts_gateway_first_and_drops_duplicates() {
    let configured: Vec<String> = vec![
        "8.8.8.8".into(),
        " 1.1.1.1 ".into(),
        "192.168.1.1".into(),
        "8.8.8.8".into(),
    ];
    let targets = target_list(&configured, Some(Ipv4Addr::new(192, 168, 1, 1)));
    assert_eq!(targets, vec!["192.168.1.1", "8.8.8.8", "1.1.1.1"]);

    let without_gateway = target_list(&configured, None);
    assert_eq!(without_gateway, vec!["8.8.8.8", "1.1.1.1", "192.168.1.1"]);
}

#[tokio::test(start_paused = true)]
async fn spawned_collector_ticks_immediately_and_stops_on_shutdown() {
    let store = Arc::new(Store::new());
    let prober = Arc::new(FakeProber::new(Some(ms(4)), &[]));
    let reachability = ReachabilityCollector::with_targets(
        store.clone(),
        prober.clone(),
        vec!["8.8.8.8".into()],
        vec![],
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = collector::spawn(reachability, 60_000, shutdown_rx);

    tokio::time::sleep(Duration::from_secs(1)).await;
    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();

    assert_eq!(store.snapshot_pings()["8.8.8.8"].total_pings, 1);
    assert_eq!(prober.calls().len(), 1);
}

#[tokio::test]
async fn tcp_ping_measures_connect_to_listening_port() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let rtt = tcp_ping("127.0.0.1", port, Duration::from_secs(2))
        .await
        .unwrap();
    assert!(rtt < Duration::from_secs(2));
}

#[tokio::test]
async fn tcp_ping_to_closed_port_is_an_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = tcp_ping("127.0.0.1", port, Duration::from_secs(2))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ProbeError::Connect { .. } | ProbeError::ConnectTimeout(_)
    ));
}
