use super::*;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use shared::domain::{Priority, StakeholderKind};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn record(n: u8, status: ShipmentStatus) -> ShipmentRecord {
    ShipmentRecord {
        id: EntityId::new(format!("s-{n}")),
        cargo_id: format!("CARGO-{n:03}"),
        vessel_name: format!("Vessel {n}"),
        origin: "Durban".to_string(),
        destination: "Cape Town".to_string(),
        status,
        eta: NaiveDate::from_ymd_opt(2026, 9, 15).expect("valid date"),
        last_updated: base_time(),
        container_count: 10,
        weight_tons: 250,
        priority: Priority::Normal,
        notification_email: None,
        stakeholder_type: StakeholderKind::Shipping,
    }
}

#[test]
fn stats_count_every_record_as_active() {
    let records = vec![
        record(1, ShipmentStatus::Pending),
        record(2, ShipmentStatus::InTransit),
        record(3, ShipmentStatus::AtPort),
        record(4, ShipmentStatus::Delivered),
        record(5, ShipmentStatus::Delivered),
    ];

    let stats = stats(&records);
    assert_eq!(stats.active, 5);
    assert_eq!(stats.transit, 1);
    assert_eq!(stats.port, 1);
    assert_eq!(stats.delivered, 2);
}

#[test]
fn list_filter_matches_cargo_id_and_vessel_case_insensitively() {
    let mut tanker = record(2, ShipmentStatus::InTransit);
    tanker.vessel_name = "Ever Given".to_string();
    let records = vec![record(1, ShipmentStatus::InTransit), tanker];

    let by_cargo = list_view(&records, None, "cargo-001");
    assert_eq!(by_cargo.len(), 1);
    assert_eq!(by_cargo[0].record.cargo_id, "CARGO-001");

    let by_vessel = list_view(&records, None, "EVER");
    assert_eq!(by_vessel.len(), 1);
    assert_eq!(by_vessel[0].record.vessel_name, "Ever Given");

    assert!(list_view(&records, None, "zz-nonexistent").is_empty());
}

#[test]
fn empty_query_lists_everything_and_flags_the_selection() {
    let records = vec![
        record(1, ShipmentStatus::InTransit),
        record(2, ShipmentStatus::AtPort),
    ];
    let selected = EntityId::new("s-2".to_string());

    let items = list_view(&records, Some(&selected), "");
    assert_eq!(items.len(), 2);
    assert!(!items[0].is_selected);
    assert!(items[1].is_selected);
}

#[test]
fn timeline_shows_only_reached_stages() {
    let pending = detail_for(record(1, ShipmentStatus::Pending));
    assert_eq!(stage_kinds(&pending), vec![StageKind::Created]);
    assert_eq!(pending.next_stage, Some(StageKind::Departed));
    assert_eq!(
        pending.timeline[0].detail,
        base_time().format("%Y-%m-%d %H:%M").to_string()
    );

    let in_transit = detail_for(record(1, ShipmentStatus::InTransit));
    assert_eq!(
        stage_kinds(&in_transit),
        vec![StageKind::Created, StageKind::Departed]
    );
    assert_eq!(in_transit.timeline[1].label, "Departed Durban");
    assert_eq!(in_transit.timeline[1].detail, "In transit");
    assert_eq!(in_transit.next_stage, Some(StageKind::Arrived));

    let at_port = detail_for(record(1, ShipmentStatus::AtPort));
    assert_eq!(
        stage_kinds(&at_port),
        vec![StageKind::Created, StageKind::Departed, StageKind::Arrived]
    );
    assert_eq!(at_port.timeline[2].label, "Arrived at Cape Town");
    assert_eq!(at_port.timeline[2].detail, "At port");
    assert_eq!(at_port.next_stage, Some(StageKind::Delivered));

    let delivered = detail_for(record(1, ShipmentStatus::Delivered));
    assert_eq!(
        stage_kinds(&delivered),
        vec![
            StageKind::Created,
            StageKind::Departed,
            StageKind::Arrived,
            StageKind::Delivered,
        ]
    );
    assert_eq!(delivered.timeline[3].detail, "Completed successfully");
    assert_eq!(delivered.next_stage, None);
}

fn detail_for(record: ShipmentRecord) -> DetailView {
    let id = record.id.clone();
    detail_view(&[record], Some(&id)).expect("record is selected")
}

fn stage_kinds(detail: &DetailView) -> Vec<StageKind> {
    detail.timeline.iter().map(|stage| stage.kind).collect()
}

#[test]
fn detail_view_requires_a_resolvable_selection() {
    let records = vec![record(1, ShipmentStatus::InTransit)];
    let dangling = EntityId::new("s-9".to_string());

    assert!(detail_view(&records, None).is_none());
    assert!(detail_view(&records, Some(&dangling)).is_none());

    let selected = records[0].id.clone();
    let detail = detail_view(&records, Some(&selected)).expect("selection resolves");
    assert_eq!(detail.record.id, selected);
}

#[test]
fn activity_feed_keeps_the_newest_entries_first() {
    let records: Vec<ShipmentRecord> = (0..7)
        .map(|n| {
            let mut record = record(n, ShipmentStatus::InTransit);
            record.last_updated = base_time() + Duration::seconds(i64::from(n));
            record
        })
        .collect();

    let feed = activity_feed(&records, ACTIVITY_FEED_LIMIT);
    assert_eq!(feed.len(), 5);
    assert_eq!(feed[0].cargo_id, "CARGO-006");
    assert_eq!(feed[4].cargo_id, "CARGO-002");
}

#[test]
fn activity_feed_keeps_store_order_for_equal_timestamps() {
    let records = vec![
        record(1, ShipmentStatus::InTransit),
        record(2, ShipmentStatus::AtPort),
        record(3, ShipmentStatus::Delivered),
    ];

    let feed = activity_feed(&records, ACTIVITY_FEED_LIMIT);
    let cargo_ids: Vec<&str> = feed.iter().map(|entry| entry.cargo_id.as_str()).collect();
    assert_eq!(cargo_ids, vec!["CARGO-001", "CARGO-002", "CARGO-003"]);
}

#[test]
fn map_midpoint_interpolates_between_port_anchors() {
    let mut leg = record(1, ShipmentStatus::InTransit);
    leg.origin = "Durban".to_string();
    leg.destination = "Richards Bay".to_string();

    let markers = map_markers(&[leg], &FixedProgress(0.5));
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].position.left, 65.0);
    assert_eq!(markers[0].position.top, 32.5);
}

#[test]
fn map_skips_records_not_in_transit() {
    let records = vec![
        record(1, ShipmentStatus::Pending),
        record(2, ShipmentStatus::InTransit),
        record(3, ShipmentStatus::AtPort),
        record(4, ShipmentStatus::Delivered),
    ];

    let markers = map_markers(&records, &FixedProgress(0.5));
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].id, EntityId::new("s-2".to_string()));
}

#[test]
fn unknown_ports_anchor_at_map_center() {
    assert_eq!(port_position("Atlantis"), DEFAULT_PORT_POSITION);

    let mut leg = record(1, ShipmentStatus::InTransit);
    leg.origin = "Atlantis".to_string();
    leg.destination = "Lemuria".to_string();
    let markers = map_markers(&[leg], &FixedProgress(0.5));
    assert_eq!(markers[0].position, DEFAULT_PORT_POSITION);
}

#[test]
fn time_ago_buckets_by_elapsed_seconds() {
    let now = base_time();
    let ago = |seconds: i64| time_ago(now, now - Duration::seconds(seconds));

    assert_eq!(ago(0), "Just now");
    assert_eq!(ago(59), "Just now");
    assert_eq!(ago(60), "1m ago");
    assert_eq!(ago(3_599), "59m ago");
    assert_eq!(ago(3_600), "1h ago");
    assert_eq!(ago(86_399), "23h ago");
    assert_eq!(ago(86_400), "1d ago");
    assert_eq!(ago(200_000), "2d ago");

    // Clock skew: timestamps from the future read as fresh.
    assert_eq!(time_ago(now, now + Duration::seconds(30)), "Just now");
}
