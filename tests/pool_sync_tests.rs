//! Pool sync service: coalescing, staleness, error retention and polling.

use std::sync::Arc;
use std::time::Duration;

use oddsync::application::cache::SyncState;
use oddsync::application::sync::{PoolSyncConfig, PoolSyncService};
use oddsync::domain::{MarketFallback, MarketId, Microunits, OddsResult};
use oddsync::error::SyncErrorKind;
use oddsync::port::outbound::ledger::PoolReader;
use oddsync::testkit::config::{pool_sync, pool_sync_manual};
use oddsync::testkit::domain::pool_reading;
use oddsync::testkit::ledger::ScriptedPoolReader;

fn service(reader: &Arc<ScriptedPoolReader>, config: PoolSyncConfig) -> PoolSyncService {
    PoolSyncService::new(Arc::clone(reader) as Arc<dyn PoolReader>, config)
}

/// Let every runnable task finish. Under paused time the clock only
/// advances once the runtime is idle.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[tokio::test(start_paused = true)]
async fn concurrent_refreshes_share_one_fetch() {
    let reader = Arc::new(ScriptedPoolReader::new());
    let id = MarketId::new("m1");
    reader.set_pool(pool_reading("m1", 700, 300));
    let gate = reader.hold(&id);
    let service = service(&reader, pool_sync_manual());

    let release = async {
        settle().await;
        gate.add_permits(1);
    };
    let (first, second, ()) = tokio::join!(service.refresh(&id), service.refresh(&id), release);

    assert_eq!(reader.calls(&id), 1);
    assert_eq!(first, second);
    assert_eq!(first.state(), SyncState::Ready);
    assert_eq!(first.request_generation, 1);
}

#[tokio::test(start_paused = true)]
async fn refresh_while_polling_joins_poll() {
    let reader = Arc::new(ScriptedPoolReader::new());
    let id = MarketId::new("m1");
    reader.set_pool(pool_reading("m1", 1, 3));
    let gate = reader.hold(&id);
    let service = service(&reader, pool_sync_manual());

    let _watch = service.observe(id.clone(), MarketFallback::default());
    settle().await;
    assert_eq!(reader.calls(&id), 1);
    assert!(service.get_pool(&id).is_loading);

    gate.add_permits(1);
    let entry = service.refresh(&id).await;

    assert_eq!(reader.calls(&id), 1);
    assert_eq!(entry.data.unwrap().odds(), OddsResult::from_yes(25));
}

#[tokio::test(start_paused = true)]
async fn stale_response_for_previous_market_is_discarded() {
    let reader = Arc::new(ScriptedPoolReader::new());
    let m1 = MarketId::new("m1");
    let m2 = MarketId::new("m2");
    reader.set_pool(pool_reading("m1", 900, 100));
    reader.set_pool(pool_reading("m2", 200, 800));
    let gate = reader.hold(&m1);
    let service = service(&reader, pool_sync_manual());

    // M1's first poll is held in flight
    let watch_m1 = service.observe(m1.clone(), MarketFallback::titled("First"));
    settle().await;
    assert_eq!(reader.calls(&m1), 1);

    // The caller moves on to M2
    drop(watch_m1);
    let watch_m2 = service.observe(m2.clone(), MarketFallback::titled("Second"));
    let m2_entry = watch_m2.refresh().await;
    assert_eq!(m2_entry.state(), SyncState::Ready);

    // M1's response finally arrives
    gate.add_permits(1);
    settle().await;

    let m1_entry = service.get_pool(&m1);
    assert!(m1_entry.data.is_none());
    assert!(!m1_entry.is_loading);
    assert!(m1_entry.error.is_none());
    assert_eq!(m1_entry.request_generation, 2);

    assert_eq!(service.get_pool(&m2).data, m2_entry.data);
    assert_eq!(service.market_view(&m2).odds, OddsResult::from_yes(20));
    assert_eq!(service.market_view(&m2).title, "Second");
}

#[tokio::test(start_paused = true)]
async fn invalidate_supersedes_in_flight_fetch() {
    let reader = Arc::new(ScriptedPoolReader::new());
    let id = MarketId::new("m1");
    reader.set_pool(pool_reading("m1", 1, 1));
    let gate = reader.hold(&id);
    let service = service(&reader, pool_sync_manual());

    let release = async {
        settle().await;
        reader.set_pool(pool_reading("m1", 3, 1));
        gate.add_permits(2);
    };
    let (_, invalidated, ()) = tokio::join!(
        service.refresh(&id),
        async {
            settle().await;
            service.invalidate(&id).await
        },
        release,
    );

    assert_eq!(reader.calls(&id), 2);
    assert_eq!(invalidated.request_generation, 3);
    assert_eq!(invalidated.state(), SyncState::Ready);
    assert_eq!(invalidated.data.unwrap().odds(), OddsResult::from_yes(75));
}

#[tokio::test]
async fn failure_keeps_last_good_pool_until_next_success() {
    let reader = Arc::new(ScriptedPoolReader::new());
    let id = MarketId::new("m1");
    reader.set_pool(pool_reading("m1", 700, 300));
    let service = service(&reader, pool_sync_manual());

    let good = service.refresh(&id).await;
    assert_eq!(good.state(), SyncState::Ready);
    let first_pool = good.data.clone().unwrap();

    reader.fail_next(&id, "connection reset");
    let failed = service.refresh(&id).await;
    assert_eq!(failed.state(), SyncState::Error);
    assert!(failed.is_stale());
    assert_eq!(failed.error.as_ref().unwrap().kind, SyncErrorKind::Network);
    assert_eq!(failed.data.as_ref(), Some(&first_pool));

    reader.set_pool(pool_reading("m1", 500, 500));
    let recovered = service.refresh(&id).await;
    assert_eq!(recovered.state(), SyncState::Ready);
    assert!(recovered.error.is_none());
    assert_eq!(recovered.data.unwrap().odds(), OddsResult::EVEN);
}

#[tokio::test]
async fn entries_never_lose_data_while_recovering() {
    let reader = Arc::new(ScriptedPoolReader::new());
    let id = MarketId::new("m1");
    reader.set_pool(pool_reading("m1", 700, 300));
    let service = service(&reader, pool_sync_manual());
    service.refresh(&id).await;

    let mut updates = service.subscribe();
    reader.fail_next(&id, "timeout");
    service.refresh(&id).await;
    reader.set_pool(pool_reading("m1", 100, 300));
    service.refresh(&id).await;

    let mut states = Vec::new();
    while let Ok(update) = updates.try_recv() {
        states.push(update.state);
    }
    assert_eq!(
        states,
        vec![
            SyncState::Loading,
            SyncState::Error,
            SyncState::Loading,
            SyncState::Ready
        ]
    );
    assert!(service.get_pool(&id).data.is_some());
}

#[tokio::test]
async fn inconsistent_snapshot_is_rejected() {
    let reader = Arc::new(ScriptedPoolReader::new());
    let id = MarketId::new("m1");
    reader.set_pool(pool_reading("m1", 10, 10));
    let service = service(&reader, pool_sync_manual());
    service.refresh(&id).await;

    let mut broken = pool_reading("m1", 10, 10);
    broken.total_staked = 25;
    reader.set_pool(broken);
    let entry = service.refresh(&id).await;

    assert_eq!(
        entry.error.as_ref().unwrap().kind,
        SyncErrorKind::InconsistentData
    );
    assert_eq!(entry.data.unwrap().total_staked(), Microunits::new(20));

    let mut unknown = pool_reading("m1", 10, 10);
    unknown.status = "cancelled".into();
    reader.set_pool(unknown);
    let entry = service.refresh(&id).await;
    assert_eq!(
        entry.error.unwrap().kind,
        SyncErrorKind::InconsistentData
    );
}

#[tokio::test]
async fn markets_are_independent() {
    let reader = Arc::new(ScriptedPoolReader::new());
    let good = MarketId::new("good");
    let bad = MarketId::new("bad");
    reader.set_pool(pool_reading("good", 3, 1));
    reader.fail_next(&bad, "boom");
    let service = service(&reader, pool_sync_manual());

    let bad_entry = service.refresh(&bad).await;
    let good_entry = service.refresh(&good).await;

    assert_eq!(bad_entry.state(), SyncState::Error);
    assert_eq!(good_entry.state(), SyncState::Ready);
    assert_eq!(service.get_pool(&MarketId::new("other")).state(), SyncState::Idle);
}

#[tokio::test(start_paused = true)]
async fn observed_market_is_polled_at_fixed_interval() {
    let reader = Arc::new(ScriptedPoolReader::new());
    let id = MarketId::new("m1");
    reader.set_pool(pool_reading("m1", 1, 1));
    let service = service(&reader, pool_sync(1_000));

    let watch = service.observe(id.clone(), MarketFallback::default());
    settle().await;
    assert_eq!(reader.calls(&id), 1);
    assert_eq!(watch.get().state(), SyncState::Ready);

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(reader.calls(&id), 2);

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(reader.calls(&id), 3);
}

#[tokio::test(start_paused = true)]
async fn polling_continues_after_failures() {
    let reader = Arc::new(ScriptedPoolReader::new());
    let id = MarketId::new("m1");
    reader.fail_next(&id, "down");
    reader.fail_next(&id, "still down");
    let service = service(&reader, pool_sync(1_000));

    let watch = service.observe(id.clone(), MarketFallback::default());
    settle().await;
    assert_eq!(watch.get().state(), SyncState::Error);

    reader.set_pool(pool_reading("m1", 1, 1));
    tokio::time::sleep(Duration::from_millis(2_500)).await;

    assert_eq!(reader.calls(&id), 3);
    assert_eq!(watch.get().state(), SyncState::Ready);
}

#[tokio::test(start_paused = true)]
async fn teardown_stops_polling() {
    let reader = Arc::new(ScriptedPoolReader::new());
    let id = MarketId::new("m1");
    reader.set_pool(pool_reading("m1", 1, 1));
    let service = service(&reader, pool_sync(1_000));

    let watch = service.observe(id.clone(), MarketFallback::default());
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(reader.calls(&id), 2);

    drop(watch);
    assert!(!service.is_observed(&id));
    tokio::time::sleep(Duration::from_millis(10_000)).await;

    assert_eq!(reader.calls(&id), 2);
    // The last good pool stays readable
    assert_eq!(service.get_pool(&id).state(), SyncState::Ready);
}

#[tokio::test(start_paused = true)]
async fn dropping_service_stops_polling() {
    let reader = Arc::new(ScriptedPoolReader::new());
    let id = MarketId::new("m1");
    reader.set_pool(pool_reading("m1", 1, 1));
    let service = service(&reader, pool_sync(1_000));

    let watch = service.observe(id.clone(), MarketFallback::default());
    settle().await;
    drop(service);
    tokio::time::sleep(Duration::from_millis(5_000)).await;

    assert_eq!(reader.calls(&id), 1);
    drop(watch);
}

#[tokio::test(start_paused = true)]
async fn view_merges_fallback_until_live_data() {
    let reader = Arc::new(ScriptedPoolReader::new());
    let id = MarketId::new("m1");
    reader.set_pool(pool_reading("m1", 2_540_000_000, 0));
    let gate = reader.hold(&id);
    let service = service(&reader, pool_sync_manual());

    let fallback = MarketFallback {
        default_volume: Microunits::new(5),
        default_traders: 9,
        ..MarketFallback::titled("Will it rain?")
    };
    let _watch = service.observe(id.clone(), fallback);

    let view = service.market_view(&id);
    assert!(!view.is_live_data);
    assert_eq!(view.odds, OddsResult::EVEN);
    assert_eq!(view.volume, Microunits::new(5));
    assert_eq!(view.traders, 9);

    gate.add_permits(1);
    settle().await;

    let view = service.market_view(&id);
    assert!(view.is_live_data);
    assert_eq!(view.title, "Will it rain?");
    assert_eq!(view.odds, OddsResult::from_yes(100));
    assert_eq!(view.volume, Microunits::new(2_540_000_000));
    assert_eq!(view.traders, 1);
}
