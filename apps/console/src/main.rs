use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use branding::{BrandingOverrides, BrandingProvider, StaticBranding, TEXT_KEYS};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use dashboard_core::{
    views::{time_ago, RandomProgress},
    DeleteOutcome, NotificationHook, ShipmentDashboard,
};
use memstore::InMemoryDataBackend;
use shared::domain::{Priority, ShipmentDraft, ShipmentRecord, StakeholderKind};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
struct Args {
    /// Optional TOML file with branding overrides.
    #[arg(long)]
    branding: Option<PathBuf>,
}

/// Stand-in for the hosted email service; the engine already decides which
/// changes notify, this side only delivers.
struct LogNotifier;

#[async_trait]
impl NotificationHook for LogNotifier {
    async fn shipment_created(&self, record: ShipmentRecord) {
        let recipient = record
            .notification_email
            .unwrap_or_else(|| "stakeholder".to_string());
        info!(cargo_id = %record.cargo_id, %recipient, "email notification sent");
    }

    async fn status_changed(&self, record: ShipmentRecord) {
        if let Some(recipient) = record.notification_email {
            info!(
                cargo_id = %record.cargo_id,
                status = %record.status,
                %recipient,
                "status change notification sent"
            );
        }
    }
}

fn load_overrides(path: Option<&Path>) -> BrandingOverrides {
    let Some(path) = path else {
        return BrandingOverrides::default();
    };
    match fs::read_to_string(path) {
        Ok(raw) => match toml::from_str(&raw) {
            Ok(overrides) => overrides,
            Err(error) => {
                warn!(path = %path.display(), %error, "ignoring unparseable branding file");
                BrandingOverrides::default()
            }
        },
        Err(error) => {
            warn!(path = %path.display(), %error, "branding file unreadable");
            BrandingOverrides::default()
        }
    }
}

fn seed_drafts(eta: NaiveDate) -> Vec<ShipmentDraft> {
    vec![
        ShipmentDraft {
            cargo_id: "CARGO-7181".to_string(),
            vessel_name: "MSC Leandra".to_string(),
            origin: "Durban".to_string(),
            destination: "Richards Bay".to_string(),
            eta,
            container_count: 24,
            weight_tons: 460,
            priority: Priority::High,
            notification_email: Some("ops@kruz.com".to_string()),
        },
        ShipmentDraft {
            cargo_id: "CARGO-7204".to_string(),
            vessel_name: "Santa Ursula".to_string(),
            origin: "Cape Town".to_string(),
            destination: "Ngqura".to_string(),
            eta,
            container_count: 58,
            weight_tons: 1210,
            priority: Priority::Normal,
            notification_email: None,
        },
        ShipmentDraft {
            cargo_id: "CARGO-7220".to_string(),
            vessel_name: "Blue Horizon".to_string(),
            origin: "East London".to_string(),
            destination: "Durban".to_string(),
            eta,
            container_count: 12,
            weight_tons: 180,
            priority: Priority::Urgent,
            notification_email: Some("consignee@example.com".to_string()),
        },
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let provider = StaticBranding::new(load_overrides(args.branding.as_deref()));
    let config = provider.load().await?.resolve();
    println!("{} - {}", config.platform_name, config.tagline);
    println!(
        "Contact: {} | {} | {}",
        config.contact_email,
        config.contact_phone,
        config.whatsapp_link()
    );
    for key in TEXT_KEYS {
        debug!(key = %key, value = %config.value(key), "branding");
    }

    let backend = InMemoryDataBackend::new();
    let dashboard =
        ShipmentDashboard::new(backend, Arc::new(LogNotifier), Arc::new(RandomProgress));
    dashboard.attach().await?;

    let mut events = dashboard.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            debug!(?event, "dashboard event");
        }
    });

    let session = dashboard
        .login("ops@kruz.com", StakeholderKind::PortAuthority)
        .await?;
    println!(
        "Signed in as {} ({}, avatar '{}')",
        session.email, session.stakeholder, session.initial
    );

    let eta = NaiveDate::from_ymd_opt(2026, 9, 15).context("eta out of range")?;
    for draft in seed_drafts(eta) {
        dashboard.create_shipment(draft).await?;
    }

    let shipments = dashboard.shipments().await;
    let first = shipments.first().context("seeded shipments")?.clone();
    let last = shipments.last().context("seeded shipments")?.clone();

    dashboard.select(&first.id).await;
    if let Some(detail) = dashboard.detail_view().await {
        println!(
            "Tracking {} on {} ({} -> {}), status {}",
            detail.record.cargo_id,
            detail.record.vessel_name,
            detail.record.origin,
            detail.record.destination,
            detail.record.status
        );
        for stage in &detail.timeline {
            println!("  * {} - {}", stage.label, stage.detail);
        }
    }

    if let Some(status) = dashboard.advance_status(&first.id).await? {
        println!("{} advanced to {status}", first.cargo_id);
    }

    dashboard.search("7204").await;
    let hits = dashboard.list_view().await;
    println!("Search '7204' matched {} shipment(s)", hits.len());
    for item in &hits {
        println!(
            "  {} {} [{}]",
            item.record.cargo_id, item.record.vessel_name, item.record.status
        );
    }
    dashboard.search("").await;

    let pending = dashboard.delete_shipment(&last.id).await?;
    debug!(?pending, "first delete press");
    if pending == DeleteOutcome::ConfirmationPending {
        println!("Confirm removal of {} within 3s", last.cargo_id);
    }
    if let DeleteOutcome::Deleted { cargo_id } = dashboard.delete_shipment(&last.id).await? {
        println!("{cargo_id} removed");
    }

    let stats = dashboard.stats().await;
    println!(
        "Active {} | In Transit {} | At Port {} | Delivered {}",
        stats.active, stats.transit, stats.port, stats.delivered
    );

    let now = Utc::now();
    println!("Recent activity:");
    for entry in dashboard.activity_feed().await {
        println!(
            "  {} {} - {} ({})",
            entry.cargo_id,
            entry.vessel_name,
            entry.status,
            time_ago(now, entry.last_updated)
        );
    }

    println!("Vessels underway:");
    for marker in dashboard.map_markers().await {
        println!(
            "  {} at {:.1}%, {:.1}%",
            marker.vessel_name, marker.position.left, marker.position.top
        );
    }

    dashboard.logout().await;
    Ok(())
}
