//! # Demo Shift
//!
//! Runs one complete shift against a real database and archive directory
//! for development.
//!
//! ## Usage
//! ```bash
//! # Default paths (./caja_dev.db, ./cierres)
//! cargo run -p caja-register --bin seed
//!
//! # Custom paths and location
//! cargo run -p caja-register --bin seed -- --db ./data/caja.db --archives ./data/cierres
//!
//! # Leave the shift open instead of closing it
//! cargo run -p caja-register --bin seed -- --keep-open
//! ```
//!
//! ## What It Records
//! - Two tickets, one split across debit and cash
//! - Two deliveries by the same courier (the second floor fee is waived)
//! - One expense, one shrinkage, one complimentary item
//! - Drawer and deposit denomination counts

use std::env;

use caja_core::entries::LegInput;
use caja_core::{CountPurpose, Money, SummaryValue};
use caja_register::commands::{cash, closing, delivery, report, sale, shift};
use caja_register::{init_tracing, RegisterConfig, Till};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./caja_dev.db");
    let mut archive_dir = String::from("./cierres");
    let mut location = String::from(caja_core::DEFAULT_LOCATION);
    let mut keep_open = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--archives" | "-a" => {
                if i + 1 < args.len() {
                    archive_dir = args[i + 1].clone();
                    i += 1;
                }
            }
            "--location" | "-l" => {
                if i + 1 < args.len() {
                    location = args[i + 1].clone();
                    i += 1;
                }
            }
            "--keep-open" => keep_open = true,
            "--help" | "-h" => {
                println!("Caja Demo Shift");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>         Database file path (default: ./caja_dev.db)");
                println!("  -a, --archives <DIR>    Archive directory (default: ./cierres)");
                println!("  -l, --location <NAME>   Location suffix for archive names");
                println!("      --keep-open         Do not close the shift at the end");
                println!("  -h, --help              Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Caja Demo Shift");
    println!("===============");
    println!("Database: {}", db_path);
    println!("Archives: {}", archive_dir);
    println!();

    let config = RegisterConfig::new(&db_path, &archive_dir).with_location(location);
    let till = Till::open(&config).await?;
    println!("✓ Till ready");

    let status = shift::open_shift(
        &till,
        shift::OpenShiftRequest {
            cashier: "Ana".into(),
            shift_label: "Mañana".into(),
            opening_float: Money::from_pesos(20_000),
        },
    )
    .await?;
    println!(
        "✓ Shift opened for {} ({})",
        status.params.cashier, status.params.shift_label
    );

    // Sales
    sale::record_sale(
        &till,
        sale::RecordSaleRequest {
            ticket_number: "101".into(),
            auth_code: "A1B2".into(),
            legs: vec![
                LegInput::new("debito", Money::from_pesos(8_500), Money::from_pesos(850)),
                LegInput::new("efectivo", Money::from_pesos(1_500), Money::zero()),
            ],
        },
    )
    .await?;
    sale::record_sale(
        &till,
        sale::RecordSaleRequest {
            ticket_number: "102".into(),
            auth_code: String::new(),
            legs: vec![LegInput::new(
                "efectivo",
                Money::from_pesos(4_200),
                Money::from_pesos(300),
            )],
        },
    )
    .await?;
    println!("✓ Sales recorded");

    // Deliveries
    for address in ["Los Aromos 120", "Av. Central 455"] {
        let recorded = delivery::record_delivery(
            &till,
            delivery::RecordDeliveryRequest {
                courier: "Pedro".into(),
                address: address.into(),
                amount: Money::from_pesos(2_500),
                floor_fee: Money::from_pesos(5_000),
            },
        )
        .await?;
        println!(
            "✓ Delivery #{} (floor fee {}{})",
            recorded.position,
            recorded.floor_fee,
            if recorded.floor_fee_waived { ", waived" } else { "" }
        );
    }

    // Cash outflows
    cash::record_expense(
        &till,
        cash::RecordExpenseRequest {
            reason: "Hielo".into(),
            amount: Money::from_pesos(3_000),
            receipt_ref: "B-5512".into(),
        },
    )
    .await?;
    cash::record_shrinkage(
        &till,
        cash::RecordShrinkageRequest {
            reason: "Vaso roto".into(),
            amount: Money::from_pesos(800),
        },
    )
    .await?;
    cash::record_complimentary(
        &till,
        cash::RecordComplimentaryRequest {
            amount: Money::from_pesos(1_200),
            reason: "Cumpleaños".into(),
        },
    )
    .await?;
    println!("✓ Expense, shrinkage and complimentary item recorded");

    // Denomination counts
    for (value, count, purpose) in [
        (10_000, 2, CountPurpose::Drawer),
        (1_000, 3, CountPurpose::Drawer),
        (20_000, 1, CountPurpose::Deposit),
    ] {
        cash::record_denomination(
            &till,
            cash::RecordDenominationRequest {
                value,
                count,
                purpose,
            },
        )
        .await?;
    }
    println!("✓ Denominations counted");

    // Live report
    println!();
    for section in report::current_sections(&till).await? {
        println!("{}", section.title);
        for row in &section.rows {
            let values: Vec<String> = row.values.iter().map(format_value).collect();
            println!("  {:<28} {}", row.label, values.join("  "));
        }
    }
    println!();

    if keep_open {
        println!("Shift left open.");
        return Ok(());
    }

    let closed = closing::close_shift(&till).await?;
    println!("✓ Shift closed");
    println!("  Archive: {}", closed.artifact_id);
    println!("  Total cash drawer: {}", closed.summary.total_cash_drawer);

    Ok(())
}

fn format_value(value: &SummaryValue) -> String {
    match value {
        SummaryValue::Currency(amount) => amount.to_string(),
        SummaryValue::Percentage(ratio) => ratio.to_string(),
        SummaryValue::Count(count) => format!("x{}", count),
    }
}
