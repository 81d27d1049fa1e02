//! # Seed Data Generator
//!
//! Populates a database file with demo clients, catalog items and
//! invoices for development.
//!
//! ## Usage
//! ```bash
//! # 30 invoices (default)
//! cargo run -p swiftbill-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p swiftbill-db --bin seed -- --invoices 200 --db ./data/swiftbill.db
//! ```
//!
//! Invoices go through `InvoiceDraft` and `create_numbered`, so every one
//! balances and the numbers run INV0001, INV0002, ... under the default
//! settings.

use std::env;
use swiftbill_core::{ClientInput, InvoiceDraft, ItemInput, Money};
use swiftbill_db::{Database, DbConfig};

const CLIENTS: &[(&str, &str, &str)] = &[
    ("Acme Traders", "1 Main St, Pune", "27AAACA1234A1Z5"),
    ("Bharat Steel Works", "Plot 14, MIDC, Nashik", "27AABCB2345B1Z6"),
    ("Coastal Exports", "Harbour Rd, Kochi", "32AACCC3456C1Z7"),
    ("Deccan Foods", "Banjara Hills, Hyderabad", "36AADCD4567D1Z8"),
    ("Eastern Logistics", "Salt Lake, Kolkata", "19AAECE5678E1Z9"),
];

/// (description, HSN, price in paise)
const ITEMS: &[(&str, &str, i64)] = &[
    ("MS Angle 40x40", "7216", 6_250_00),
    ("Hex Bolt M12", "7318", 18_50),
    ("Packing Crate", "4415", 950_00),
    ("Transport Charges", "9965", 1_500_00),
    ("Welding Rod 3.15mm", "8311", 425_00),
    ("Industrial Paint 20L", "3208", 4_800_00),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 30;
    let mut db_path = String::from("./swiftbill_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--invoices" | "-n" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(30);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("SwiftBill Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --invoices <N>  Number of invoices to create (default: 30)");
                println!("  -d, --db <PATH>     Database file path (default: ./swiftbill_dev.db)");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 SwiftBill Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Invoices: {}", count);
    println!();

    let db = Database::open(DbConfig::file(&db_path)).await?;
    println!("✓ Opened database");

    let stats = db.stats().await;
    if stats.clients > 0 || stats.invoices > 0 {
        println!(
            "⚠ Database already has {} clients and {} invoices",
            stats.clients, stats.invoices
        );
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut clients = Vec::with_capacity(CLIENTS.len());
    for (name, address, gstin) in CLIENTS {
        clients.push(
            db.clients()
                .add(ClientInput {
                    name: name.to_string(),
                    address: address.to_string(),
                    gstin: gstin.to_string(),
                })
                .await?,
        );
    }
    println!("✓ Added {} clients", clients.len());

    let mut items = Vec::with_capacity(ITEMS.len());
    for (description, hsn, paise) in ITEMS {
        items.push(
            db.items()
                .add(ItemInput {
                    description: description.to_string(),
                    hsn: hsn.to_string(),
                    unit_price: Money::from_paise(*paise),
                })
                .await?,
        );
    }
    println!("✓ Added {} items", items.len());

    println!();
    println!("Generating invoices...");
    let settings = db.settings().current();
    let start = std::time::Instant::now();

    for n in 0..count {
        // Spread over the twelve months of 2024
        let bill_date = format!("2024-{:02}-{:02}", n % 12 + 1, n % 28 + 1);
        let mut draft = InvoiceDraft::new("pending", bill_date, &settings);
        draft.set_client(&clients[n % clients.len()]);

        for k in 0..(n % 3 + 1) {
            let line = draft.add_item(&items[(n + k) % items.len()]);
            draft.set_quantity(line, ((n + k) % 5 + 1) as f64)?;
        }
        if n % 4 == 0 {
            draft.vehicle_number = Some(format!("MH12AB{:04}", 1000 + n));
        }

        let saved = db.invoices().create_numbered(draft.build()?).await?;
        if (n + 1) % 10 == 0 {
            println!("  {} ... {}", saved.invoice_no, saved.total_amount);
        }
    }

    let elapsed = start.elapsed();
    let metrics = db.metrics().load().await?;
    println!();
    println!("✓ Generated {} invoices in {:?}", count, elapsed);
    println!("  Revenue: {}", metrics.total_revenue);
    println!("  Average: {}", metrics.avg_invoice_value);
    println!("  Next number: {}", db.invoices().generate_number().await?);
    println!("  Blob size: {} bytes", db.stats().await.blob_bytes);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
