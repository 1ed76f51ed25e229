// Network baseline tests: first-sample zeros, deltas, clamping on counter reset

use hoststats::sysinfo_repo::{NetCounters, NetworkBaseline, SysinfoRepo};
use std::sync::Arc;

fn counters(bytes_sent: u64, bytes_recv: u64, packets_sent: u64, packets_recv: u64) -> NetCounters {
    NetCounters {
        bytes_sent,
        bytes_recv,
        packets_sent,
        packets_recv,
    }
}

#[test]
fn first_sample_reports_zero_deltas_and_raw_totals() {
    let baseline = NetworkBaseline::new();
    assert!(baseline.current().is_none());

    let stats = baseline.advance(counters(1000, 2000, 10, 20));
    assert_eq!(stats.bytes_sent, 0);
    assert_eq!(stats.bytes_received, 0);
    assert_eq!(stats.packets_sent, 0);
    assert_eq!(stats.packets_received, 0);
    assert_eq!(stats.total_bytes_sent, 1000);
    assert_eq!(stats.total_bytes_received, 2000);
    assert_eq!(stats.total_packets_sent, 10);
    assert_eq!(stats.total_packets_received, 20);
    assert_eq!(baseline.current(), Some(counters(1000, 2000, 10, 20)));
}

#[test]
fn second_sample_reports_difference() {
    let baseline = NetworkBaseline::new();
    baseline.advance(counters(1000, 0, 0, 0));
    let stats = baseline.advance(counters(1500, 0, 0, 0));
    assert_eq!(stats.bytes_sent, 500);
}

#[test]
fn monotonic_sequence_yields_pairwise_differences() {
    let baseline = NetworkBaseline::new();
    let seq = [
        counters(0, 0, 0, 0),
        counters(100, 50, 2, 1),
        counters(100, 80, 5, 1),
        counters(1_000, 1_000, 50, 40),
    ];
    let mut prev: Option<NetCounters> = None;
    for c in seq {
        let stats = baseline.advance(c);
        let expected = prev.map_or(NetCounters::default(), |p| {
            counters(
                c.bytes_sent - p.bytes_sent,
                c.bytes_recv - p.bytes_recv,
                c.packets_sent - p.packets_sent,
                c.packets_recv - p.packets_recv,
            )
        });
        assert_eq!(stats.bytes_sent, expected.bytes_sent);
        assert_eq!(stats.bytes_received, expected.bytes_recv);
        assert_eq!(stats.packets_sent, expected.packets_sent);
        assert_eq!(stats.packets_received, expected.packets_recv);
        prev = Some(c);
    }
}

#[test]
fn counter_reset_clamps_to_zero_per_counter() {
    let baseline = NetworkBaseline::new();
    baseline.advance(counters(5000, 5000, 50, 50));

    // bytes_sent and packets_recv went backwards; the other two advanced.
    let stats = baseline.advance(counters(100, 5600, 70, 10));
    assert_eq!(stats.bytes_sent, 0);
    assert_eq!(stats.bytes_received, 600);
    assert_eq!(stats.packets_sent, 20);
    assert_eq!(stats.packets_received, 0);

    // Baseline is the raw value even when clamped.
    assert_eq!(baseline.current(), Some(counters(100, 5600, 70, 10)));
    let stats = baseline.advance(counters(300, 5600, 70, 15));
    assert_eq!(stats.bytes_sent, 200);
    assert_eq!(stats.packets_received, 5);
}

#[test]
fn concurrent_advances_never_lose_the_last_value() {
    let baseline = Arc::new(NetworkBaseline::new());
    let handles: Vec<_> = (1..=8u64)
        .map(|i| {
            let baseline = baseline.clone();
            std::thread::spawn(move || {
                for j in 0..100u64 {
                    let v = i * 1_000 + j;
                    let stats = baseline.advance(counters(v, v, v, v));
                    assert!(stats.bytes_sent <= v);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    let last = baseline.current().unwrap();
    assert_eq!(last.bytes_sent, last.bytes_recv);
    assert_eq!(last.packets_sent, last.packets_recv);
}

#[tokio::test]
async fn real_samples_start_from_zero_then_track_baseline() {
    let Ok(repo) = SysinfoRepo::new() else {
        return; // Skip when the host cannot be sampled
    };
    let baseline = Arc::new(NetworkBaseline::new());

    let Ok(first) = repo.sample(&baseline).await else {
        return;
    };
    assert_eq!(first.network_stats.bytes_sent, 0);
    assert_eq!(first.network_stats.bytes_received, 0);
    assert_eq!(
        baseline.current().map(|c| c.bytes_sent),
        Some(first.network_stats.total_bytes_sent)
    );

    let second = repo.sample(&baseline).await.unwrap();
    let expected = second
        .network_stats
        .total_bytes_sent
        .saturating_sub(first.network_stats.total_bytes_sent);
    assert_eq!(second.network_stats.bytes_sent, expected);
    assert!(!second.cpu.is_empty());
    assert!((0.0..=100.0).contains(&second.cpu_percent));
    assert!(second.process_memory_absolute > 0.0);
}
