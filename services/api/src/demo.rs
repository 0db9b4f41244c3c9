use crate::infra::InMemoryMarketplace;
use chrono::{DateTime, Utc};
use clap::Args;
use marketplace_admin::config::AppConfig;
use marketplace_admin::error::AppError;
use marketplace_admin::workflows::bulk::{
    BulkActionRequest, BulkOutcome, CategoryBulkRequest, ListingBulkRequest,
};
use marketplace_admin::workflows::console::{AdminConsole, QueueQuery};
use marketplace_admin::workflows::verification::{
    eligible_targets, AggregatedQueue, BusinessKind, EntityId, EntityKind, QueueRequest,
    SelectionSet, VerificationAction,
};
use serde_json::{json, Map};
use std::sync::Arc;

type DemoConsole = AdminConsole<InMemoryMarketplace, InMemoryMarketplace, InMemoryMarketplace>;

#[derive(Args, Debug, Default)]
pub(crate) struct QueueArgs {
    /// Restrict to one business kind (vendor or restaurant); both when omitted
    #[arg(long = "type")]
    pub(crate) kind: Option<String>,
    /// Lifecycle status filter (pending, approved, rejected)
    #[arg(long)]
    pub(crate) status: Option<String>,
    /// Case-insensitive name or id search
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Page number, starting at 1
    #[arg(long)]
    pub(crate) page: Option<String>,
    /// Page size per source (1-100)
    #[arg(long)]
    pub(crate) limit: Option<String>,
    /// Sort direction for createdAt (asc or desc)
    #[arg(long)]
    pub(crate) sort_order: Option<String>,
    /// Print the merged queue as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the listing and category portion of the demo.
    #[arg(long)]
    pub(crate) skip_catalog: bool,
}

fn demo_console(config: &AppConfig, now: DateTime<Utc>) -> (Arc<InMemoryMarketplace>, DemoConsole) {
    let marketplace = Arc::new(InMemoryMarketplace::seeded(now));
    let console = AdminConsole::with_queue_defaults(
        marketplace.clone(),
        marketplace.clone(),
        marketplace.clone(),
        config.queue,
    );
    (marketplace, console)
}

pub(crate) async fn run_queue(args: QueueArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let now = Utc::now();
    let (_, console) = demo_console(&config, now);

    let request = QueueQuery {
        kind: args.kind,
        status: args.status,
        search: args.search,
        page: args.page,
        limit: args.limit,
        sort_by: None,
        sort_order: args.sort_order,
    }
    .into_request(&console)?;
    let queue = console.queue(&request, now).await?;

    if args.json {
        match serde_json::to_string_pretty(&queue) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Queue payload unavailable: {err}"),
        }
    } else {
        render_queue(&queue);
    }
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let now = Utc::now();
    let (marketplace, console) = demo_console(&config, now);
    let request = QueueRequest::new(None, console.default_filters());

    println!("Marketplace verification demo");
    let queue = console.queue(&request, now).await?;
    render_queue(&queue);

    let mut selection = SelectionSet::new();
    selection.select_all(&queue.items);
    let eligible = eligible_targets(&queue.items, VerificationAction::Approve);
    println!(
        "\nSelected {} rows ({} still awaiting review)",
        selection.len(),
        eligible.len()
    );

    let vendor_targets: Vec<_> = selection
        .targets(Some(EntityKind::Vendor))
        .into_iter()
        .filter(|target| eligible.contains(target))
        .collect();
    println!("\nBulk approve vendors awaiting review");
    let outcome = console
        .bulk(&BulkActionRequest::verification(
            VerificationAction::Approve,
            vendor_targets,
            "documents verified during demo",
        ))
        .await?;
    render_outcome(&outcome);

    println!("\nReset the rejected restaurant so it can be reviewed again");
    match console
        .transition(
            BusinessKind::Restaurant,
            &EntityId::from("r-201"),
            VerificationAction::Reset,
            Some("license re-submitted"),
            now,
        )
        .await
    {
        Ok(receipt) => println!(
            "- {} moved {} -> {}",
            receipt.target, receipt.previous_state, receipt.resulting_state
        ),
        Err(err) => println!("- reset refused: {err}"),
    }

    println!("\nAttempt to approve an already verified vendor");
    if let Err(err) = console
        .transition(
            BusinessKind::Vendor,
            &EntityId::from("v-102"),
            VerificationAction::Approve,
            Some("double check"),
            now,
        )
        .await
    {
        println!("- refused: {err}");
    }

    if !args.skip_catalog {
        println!("\nCatalog bulk actions");
        let mut flag = Map::new();
        flag.insert("flagReason".to_string(), json!("pricing looks wrong"));
        let flagged = console
            .listing_bulk(ListingBulkRequest {
                action: "flag_listings".to_string(),
                listing_ids: vec![EntityId::from("l-300"), EntityId::from("l-999")],
                data: flag,
                reason: Some("spot check".to_string()),
            })
            .await?;
        render_outcome(&flagged);

        let deactivated = console
            .category_bulk(CategoryBulkRequest {
                action: "deactivate_categories".to_string(),
                category_ids: vec![EntityId::from("c-401")],
                data: Map::new(),
                reason: None,
            })
            .await?;
        render_outcome(&deactivated);

        if let Some(listing) = marketplace.listing("l-300") {
            println!(
                "- {} ({}) flagged: {}",
                listing.title,
                listing.status,
                listing.flag_reason.as_deref().unwrap_or("no")
            );
        }
        if let Some(category) = marketplace.category("c-401") {
            println!("- {} active: {}", category.name, category.active);
        }
    }

    println!("\nQueue after decisions");
    let refreshed = console.queue(&request, now).await?;
    render_queue(&refreshed);
    Ok(())
}

pub(crate) fn render_queue(queue: &AggregatedQueue) {
    println!(
        "{} pending | {} approved | {} rejected | {} total (page {} of {})",
        queue.stats.pending,
        queue.stats.approved,
        queue.stats.rejected,
        queue.stats.total,
        queue.pagination.page,
        queue.pagination.pages
    );
    if queue.items.is_empty() {
        println!("- queue is empty");
        return;
    }
    for item in &queue.items {
        println!(
            "- [{}] {} {} ({}): {}, waiting {} days, {}",
            item.classification.urgency.label(),
            item.kind,
            item.record.id,
            item.record.name,
            item.display_state(),
            item.classification.days_waiting,
            item.classification.lifecycle
        );
    }
}

fn render_outcome(outcome: &BulkOutcome) {
    let summary = outcome.summary();
    println!(
        "- {} requested, {} succeeded, {} failed",
        summary.requested, summary.succeeded, summary.failed
    );
    for failure in &outcome.failed {
        println!("  - {}: {}", failure.id, failure.error);
    }
}
