//! Seeds a Stockbook database with a small demo catalog and one committed
//! sale, going through the real service layer so the seeded data obeys every
//! rule the application enforces.
//!
//! ## Usage
//! ```text
//! seed [DB_PATH] [OWNER_ID]
//! ```
//! Defaults: `./stockbook.db`, owner `demo-owner`.

use tracing::info;
use tracing_subscriber::EnvFilter;

use stockbook_core::{Cart, IntakeRow};
use stockbook_db::{Database, DbConfig, LedgerService};

fn intake_row(name: &str, quantity: i64, buy: i64, sell: i64) -> IntakeRow {
    IntakeRow {
        name: name.to_string(),
        quantity,
        buy_price_cents: buy,
        sell_price_cents: sell,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let db_path = args.next().unwrap_or_else(|| "./stockbook.db".to_string());
    let owner_id = args.next().unwrap_or_else(|| "demo-owner".to_string());

    info!(path = %db_path, owner = %owner_id, "Seeding database");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let service = LedgerService::new(db);

    let rows = vec![
        intake_row("Widget", 24, 500, 800),
        intake_row("Gadget", 12, 100, 250),
        intake_row("Sprocket", 40, 75, 199),
        intake_row("Gizmo", 6, 1500, 2999),
    ];
    service.bulk_intake(&owner_id, &rows).await?;

    // One committed sale so the history view has something to show
    let widget = service
        .find_product_by_name(&owner_id, "Widget")
        .await?
        .ok_or("seeded product missing")?;
    let gadget = service
        .find_product_by_name(&owner_id, "Gadget")
        .await?
        .ok_or("seeded product missing")?;

    let mut cart = Cart::new();
    service.add_to_cart(&owner_id, &mut cart, &widget.id, 3).await?;
    service.add_to_cart(&owner_id, &mut cart, &gadget.id, 2).await?;
    let entry = service.commit_sale(&owner_id, "Ayşe", &cart).await?;
    cart.clear();

    let products = service.list_products(&owner_id).await?;
    let entries = service.list_entries(&owner_id).await?;

    let summary = serde_json::json!({
        "database": db_path,
        "owner_id": owner_id,
        "products": products.len(),
        "ledger_entries": entries.len(),
        "sample_entry": {
            "id": entry.id,
            "buyer": entry.buyer_name,
            "total": entry.total().to_string(),
            "profit": entry.profit().to_string(),
        },
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    info!("Seed complete");
    Ok(())
}
