//! Fulfilment cycles over richer worlds, driven through manual triggers.

mod common;

use std::sync::Arc;
use std::time::Duration;

use autofulfill_core::clock::{Clock, ManualClock};
use autofulfill_core::config::AutofulfillConfig;
use autofulfill_core::gateway::{ColonyGateway, GatewayError, InMemoryColonyGateway, WorldSnapshot};
use autofulfill_core::models::{ItemStack, RequestState};
use autofulfill_core::notification::{MessageCategory, Observers};
use autofulfill_core::orchestration::{AutofulfillSystem, CycleStatus, SystemHandle, SystemPhase};

use common::{fast_config, wait_for_status, RecordingSink, ScriptedProbeGateway};

const SAMPLE_WORLD: &str = include_str!("../demos/world.json");

fn manual_config() -> AutofulfillConfig {
    let mut config = fast_config();
    config.timing.initial_poll_delay_ms = 600_000;
    config
}

async fn start(
    config: &AutofulfillConfig,
    gateway: Arc<dyn ColonyGateway>,
    clock: Arc<dyn Clock>,
) -> (SystemHandle, Arc<RecordingSink>) {
    let sink = RecordingSink::new("player");
    let observers = Arc::new(Observers::new());
    observers.register(sink.clone());

    let system = AutofulfillSystem::start(config, gateway, observers, clock);
    wait_for_status(system.main_loop(), Duration::from_secs(5), |s| {
        s.phase == SystemPhase::Ready
    })
    .await;
    (system, sink)
}

#[tokio::test]
async fn test_sample_world_cycle_outcomes() {
    let world = WorldSnapshot::from_json_str(SAMPLE_WORLD).unwrap();
    let gateway = Arc::new(InMemoryColonyGateway::new(world));
    let (mut system, sink) = start(&manual_config(), gateway.clone(), Arc::new(ManualClock::new())).await;

    let report = system.main_loop().trigger().await.unwrap();
    assert_eq!(report.status, CycleStatus::Completed);
    assert_eq!(report.colonies, 2);
    // Planks, cobblestone and the axe are delivered; the farm has nobody to
    // carry its seeds. Citizen-raised requests are never fulfilled.
    assert_eq!(report.outcomes.processed, 4);
    assert_eq!(report.outcomes.succeeded, 3);
    assert_eq!(report.outcomes.failed, 1);
    assert_eq!(report.outcomes.skipped, 0);

    assert_eq!(gateway.request_state(1, 1000), Some(RequestState::Resolved));
    assert_eq!(gateway.request_state(1, 1002), Some(RequestState::Resolved));
    assert_eq!(gateway.request_state(1, 1003), Some(RequestState::Created));
    assert_eq!(gateway.request_state(1, 2000), Some(RequestState::Pending));
    assert_eq!(gateway.request_state(2, 3000), Some(RequestState::Resolved));

    // Requested 200 cobblestone, one full stack is delivered.
    let cobble: u32 = gateway
        .inventory(1, 100)
        .iter()
        .filter(|s| s.item_id.ends_with("cobblestone"))
        .map(|s| s.count)
        .sum();
    assert_eq!(cobble, 64);

    assert_eq!(sink.count_containing("No citizen assigned for request"), 1);
    assert_eq!(sink.count_containing("Processed 2 colonies for autofulfill"), 1);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_sample_world_listing_includes_citizen_requests() {
    let world = WorldSnapshot::from_json_str(SAMPLE_WORLD).unwrap();
    let gateway = Arc::new(InMemoryColonyGateway::new(world));
    let (mut system, _sink) = start(&manual_config(), gateway, Arc::new(ManualClock::new())).await;

    let listing = system.main_loop().list_requests().await.unwrap();
    assert_eq!(listing.colonies.len(), 2);
    assert_eq!(listing.colonies[0].building_requests.len(), 3);
    assert_eq!(listing.colonies[0].citizen_requests.len(), 1);
    assert_eq!(listing.total(), 5);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_offline_surface_skips_cycle_quietly() {
    let gateway = Arc::new(InMemoryColonyGateway::new(WorldSnapshot::demo()));
    let (mut system, sink) = start(&manual_config(), gateway.clone(), Arc::new(ManualClock::new())).await;

    gateway.set_online(false);
    let report = system.main_loop().trigger().await.unwrap();

    // The gate probes first, so an offline surface reads as not ready.
    assert!(matches!(
        report.status,
        CycleStatus::NotReady(_) | CycleStatus::Skipped(_)
    ));
    assert_eq!(system.main_loop().stats().await.unwrap().processed, 0);
    assert_eq!(sink.count_containing("Autofulfill error"), 0);

    gateway.set_online(true);
    let report = system.main_loop().trigger().await.unwrap();
    assert_eq!(report.status, CycleStatus::Completed);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_full_inventory_fails_request_without_resolving() {
    let mut world = WorldSnapshot::demo();
    world.colonies[0].citizens[0].inventory_slots = 0;
    let gateway = Arc::new(InMemoryColonyGateway::new(world));
    let (mut system, sink) = start(&manual_config(), gateway.clone(), Arc::new(ManualClock::new())).await;

    let report = system.main_loop().trigger().await.unwrap();
    assert_eq!(report.outcomes.failed, 1);
    assert_eq!(report.outcomes.skipped, 1);
    assert_eq!(gateway.request_state(1, 1000), Some(RequestState::InProgress));
    assert_eq!(sink.count_containing("Could not add 32x"), 1);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_stats_broadcast_every_n_processed() {
    let mut config = manual_config();
    config.timing.stats_broadcast_every = 2;
    let gateway = Arc::new(InMemoryColonyGateway::new(WorldSnapshot::demo()));
    let (mut system, sink) = start(&config, gateway, Arc::new(ManualClock::new())).await;

    system.main_loop().trigger().await.unwrap();
    assert_eq!(
        sink.count_containing(
            "Autofulfill Stats: 2 processed, 1 successful (50.0%), 0 failed, 1 skipped"
        ),
        1
    );

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_session_window_resets_counters_and_throttle() {
    let mut config = manual_config();
    config.timing.stats_reset_interval_ms = 10_000;
    config.timing.max_messages_per_category = 1;
    let clock = ManualClock::new();
    let gateway = Arc::new(InMemoryColonyGateway::new(WorldSnapshot::demo()));
    let (mut system, sink) = start(&config, gateway, Arc::new(clock.clone())).await;

    system.main_loop().trigger().await.unwrap();
    clock.advance(Duration::from_secs(2));
    system.main_loop().trigger().await.unwrap();

    // Same window: counters accumulate and the budget of one holds.
    assert_eq!(system.main_loop().stats().await.unwrap().processed, 3);
    assert_eq!(sink.count_containing("Processed 1 colonies for autofulfill"), 1);

    clock.advance(Duration::from_secs(11));
    system.main_loop().trigger().await.unwrap();

    // Only the tool request is still open in the fresh window.
    assert_eq!(system.main_loop().stats().await.unwrap().processed, 1);
    assert_eq!(sink.count_containing("Processed 1 colonies for autofulfill"), 2);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_failed_insert_surfaces_detail() {
    let gateway = Arc::new(ScriptedProbeGateway::new(Vec::new()));
    let (mut system, sink) = start(&manual_config(), gateway.clone(), Arc::new(ManualClock::new())).await;

    gateway.fail_inserts(GatewayError::ShapeMismatch("inventory has no slots".to_string()));
    let report = system.main_loop().trigger().await.unwrap();

    assert_eq!(report.outcomes.failed, 1);
    assert_eq!(report.outcomes.skipped, 1);
    assert_eq!(
        sink.count_containing("Error fulfilling request: shape mismatch: inventory has no slots"),
        1
    );
    assert_eq!(gateway.inner().request_state(1, 1000), Some(RequestState::InProgress));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unavailable_insert_is_skipped_silently() {
    let gateway = Arc::new(ScriptedProbeGateway::new(Vec::new()));
    let (mut system, sink) = start(&manual_config(), gateway.clone(), Arc::new(ManualClock::new())).await;

    gateway.fail_inserts(GatewayError::Unavailable("citizen unloaded".to_string()));
    let report = system.main_loop().trigger().await.unwrap();

    assert_eq!(report.outcomes.failed, 0);
    assert_eq!(report.outcomes.skipped, 2);
    assert_eq!(sink.count_containing("Error fulfilling request"), 0);

    system.shutdown().await.unwrap();
}

/// One builder whose request list holds a case for every early exit of the
/// per-request rules.
const EDGE_WORLD: &str = r#"{
  "colonies": [
    {
      "id": 1,
      "name": "Riverside",
      "buildings": [
        {
          "id": 10,
          "kind": "BuildingBuilder",
          "assigned_citizens": [100],
          "requests": [
            {
              "id": 4001,
              "state": "IN_PROGRESS",
              "requestable": { "type": "deliverable", "count": 8 },
              "display_stacks": [{ "item_id": "item.minecraft.torch", "count": 1 }]
            },
            {
              "id": 4002,
              "state": "IN_PROGRESS",
              "requester": { "type": "citizen", "id": 100 },
              "requestable": { "type": "deliverable", "count": 8 },
              "display_stacks": [{ "item_id": "item.minecraft.torch", "count": 1 }]
            },
            {
              "id": 4003,
              "state": "IN_PROGRESS",
              "requester": { "type": "other", "id": "Postbox" },
              "requestable": { "type": "deliverable", "count": 8 },
              "display_stacks": [{ "item_id": "item.minecraft.torch", "count": 1 }]
            },
            {
              "id": 4004,
              "state": "IN_PROGRESS",
              "requester": { "type": "building", "id": 99 },
              "requestable": { "type": "deliverable", "count": 8 },
              "display_stacks": [{ "item_id": "item.minecraft.torch", "count": 1 }]
            },
            {
              "id": 4005,
              "state": "IN_PROGRESS",
              "requester": { "type": "building", "id": 10 },
              "requestable": { "type": "deliverable", "count": 8 },
              "display_stacks": [{ "item_id": "item.minecraft.torch", "count": 1 }]
            },
            {
              "id": 4006,
              "state": "IN_PROGRESS",
              "requester": { "type": "building", "id": 10 },
              "requestable": { "type": "deliverable", "count": 8 },
              "display_stacks": [{ "item_id": "item.minecraft.torch", "count": 1 }]
            },
            {
              "id": 4007,
              "state": "IN_PROGRESS",
              "requester": { "type": "building", "id": 10 },
              "requestable": { "type": "deliverable", "count": 8 },
              "display_stacks": []
            }
          ]
        }
      ],
      "citizens": [{ "id": 100, "name": "Ada Mason" }]
    }
  ]
}"#;

#[tokio::test]
async fn test_request_rules_skip_and_fail_without_delivering() {
    let world = WorldSnapshot::from_json_str(EDGE_WORLD).unwrap();
    let gateway = Arc::new(ScriptedProbeGateway::with_world(world, Vec::new()));
    gateway.fail_building_lookup(
        4005,
        GatewayError::ShapeMismatch("request has no requester field".to_string()),
    );
    gateway.fail_citizen_lookup(
        4006,
        GatewayError::ShapeMismatch("building has no citizen list".to_string()),
    );
    let (mut system, sink) = start(&manual_config(), gateway.clone(), Arc::new(ManualClock::new())).await;

    let report = system.main_loop().trigger().await.unwrap();

    // No requester, citizen requester, other requester and a missing building
    // are skipped. Two malformed lookups and the empty display list fail.
    assert_eq!(report.status, CycleStatus::Completed);
    assert_eq!(report.outcomes.processed, 7);
    assert_eq!(report.outcomes.succeeded, 0);
    assert_eq!(report.outcomes.skipped, 4);
    assert_eq!(report.outcomes.failed, 3);

    // Lookup failures stay in the logs; only the empty display list warns.
    assert_eq!(sink.count_containing(MessageCategory::Error.prefix()), 0);
    assert_eq!(sink.count_containing(MessageCategory::Warning.prefix()), 1);
    assert_eq!(sink.count_containing("No items found for request"), 1);

    for request in 4001..=4007 {
        assert_eq!(
            gateway.inner().request_state(1, request),
            Some(RequestState::InProgress),
            "request {request} must stay open"
        );
    }
    assert!(gateway.inner().inventory(1, 100).is_empty());

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_item_ending_in_air_is_not_treated_as_delivered() {
    let mut world = WorldSnapshot::demo();
    world.colonies[0].citizens[0].inventory_slots = 0;
    world.colonies[0].buildings[0].requests[0].display_stacks =
        vec![ItemStack::new("block.furniture.oak_chair", 1, 64)];
    let gateway = Arc::new(InMemoryColonyGateway::new(world));
    let (mut system, sink) = start(&manual_config(), gateway.clone(), Arc::new(ManualClock::new())).await;

    let report = system.main_loop().trigger().await.unwrap();

    assert_eq!(report.outcomes.succeeded, 0);
    assert_eq!(report.outcomes.failed, 1);
    assert_eq!(gateway.request_state(1, 1000), Some(RequestState::InProgress));
    assert_eq!(sink.count_containing("Could not add 32x"), 1);
    assert_eq!(sink.count_containing("Fulfilled"), 0);

    system.shutdown().await.unwrap();
}
