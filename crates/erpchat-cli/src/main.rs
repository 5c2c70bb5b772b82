//! ERP Chat CLI - terminal chat client
//!
//! Talks to the assistant over a seeded in-memory data backend, which makes
//! it a self-contained demo of the tool-dispatch loop. Conversations persist
//! to the file store unless `--ephemeral` is given.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use erpchat_core::{
    ChatService, Config, ConfigManager, ConversationStore, FileStore, GenAiModel, MemoryBackend,
    MemoryStore,
};

#[derive(Parser)]
#[command(name = "erpchat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chat with your ERP data from the terminal", long_about = None)]
struct Cli {
    /// User the conversation belongs to
    #[arg(short, long, default_value = "Administrator")]
    user: String,

    /// Model to use (defaults to the configured model)
    #[arg(short, long)]
    model: Option<String>,

    /// Continue a specific session instead of the active one
    #[arg(short, long)]
    session: Option<String>,

    /// Keep the conversation in memory only
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config = ConfigManager::new()
        .map(|m| m.config().clone())
        .unwrap_or_else(|_| Config::default());

    let api_key = config.model.resolve_api_key()?;
    let model_name = cli.model.unwrap_or_else(|| config.model.model.clone());
    let model = Arc::new(
        GenAiModel::with_api_key(&api_key, Some(&model_name))
            .with_temperature(config.model.temperature),
    );

    let store: Arc<dyn ConversationStore> = if cli.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(FileStore::open(config.store.sessions_dir()).context("opening session store")?)
    };

    let backend = Arc::new(demo_backend());
    let service = ChatService::new(model, store, backend);

    println!("ERP Chat ({}) - type 'exit' to quit, 'clear' to reset the session", model_name);

    let stdin = io::stdin();
    let mut session_id = cli.session;
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match input {
            "exit" | "quit" => break,
            "clear" => {
                if let Some(id) = &session_id {
                    if service.clear_history(id) {
                        println!("History cleared.");
                    } else {
                        println!("Nothing to clear.");
                    }
                } else {
                    println!("No session yet.");
                }
                continue;
            }
            "sessions" => {
                for s in service.list_sessions(&cli.user) {
                    let marker = if s.is_active { "*" } else { " " };
                    println!("{} {}  {} ({} messages)", marker, s.id, s.label, s.message_count);
                }
                continue;
            }
            _ => {}
        }

        let response = service
            .send_message(&cli.user, input, session_id.as_deref())
            .await;
        session_id = Some(response.session_id.clone());

        println!("\n{}\n", response.message);
        if let Some(chart) = &response.chart_data {
            println!("[chart] {}", serde_json::to_string_pretty(chart)?);
        }
    }

    Ok(())
}

/// Small fixture so the assistant has something to query
fn demo_backend() -> MemoryBackend {
    let backend = MemoryBackend::new();

    for (name, customer_name, ctype, group, territory) in [
        ("CUST-0001", "Acme Corporation", "Company", "Commercial", "United States"),
        ("CUST-0002", "Globex Inc", "Company", "Commercial", "Germany"),
        ("CUST-0003", "Jane Smith", "Individual", "Retail", "United States"),
    ] {
        backend.insert_json(
            "Customer",
            json!({
                "name": name, "customer_name": customer_name, "customer_type": ctype,
                "customer_group": group, "territory": territory,
                "outstanding_amount": 12_500.0
            }),
        );
    }

    for (name, code, item_name, group, rate) in [
        ("ITEM-0001", "WIDGET-A", "Widget Type A", "Products", 49.0),
        ("ITEM-0002", "WIDGET-B", "Widget Type B", "Products", 79.0),
        ("ITEM-0003", "SVC-INSTALL", "Installation Service", "Services", 150.0),
    ] {
        backend.insert_json(
            "Item",
            json!({
                "name": name, "item_code": code, "item_name": item_name,
                "item_group": group, "stock_uom": "Nos", "standard_rate": rate
            }),
        );
    }

    for (name, customer, date, total, status) in [
        ("SO-00001", "Acme Corporation", "2026-08-01", 4_900.0, "To Deliver"),
        ("SO-00002", "Acme Corporation", "2026-08-12", 2_450.0, "Completed"),
        ("SO-00003", "Globex Inc", "2026-08-15", 7_900.0, "Draft"),
        ("SO-00004", "Jane Smith", "2026-08-20", 490.0, "Draft"),
    ] {
        backend.insert_json(
            "Sales Order",
            json!({
                "name": name, "customer": customer, "transaction_date": date,
                "grand_total": total, "status": status
            }),
        );
    }

    backend.insert_json(
        "Purchase Order",
        json!({
            "name": "PO-00001", "supplier": "Initech Supplies", "transaction_date": "2026-08-05",
            "grand_total": 3_200.0, "status": "To Receive"
        }),
    );

    for (warehouse, actual, reserved, projected) in
        [("Stores", 220.0, 40.0, 180.0), ("Finished Goods", 35.0, 0.0, 35.0)]
    {
        backend.insert_json(
            "Bin",
            json!({
                "name": format!("BIN-{}", warehouse), "item_code": "WIDGET-A",
                "warehouse": warehouse, "actual_qty": actual,
                "reserved_qty": reserved, "projected_qty": projected
            }),
        );
    }

    backend
}
