use anyhow::Result;
use clap::{Parser, Subcommand};
use parts_xref::config::Config;
use parts_xref::server::{start_server, AppState};
use parts_xref::types::{BrakePadGroup, SearchResponse, WiperGroup};
use parts_xref::{logging, metrics, LookupService};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "parts_xref")]
#[command(about = "Part-number cross-reference lookup for wiper blades and brake pads")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP lookup service
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Look up wiper equivalents, falling back to a prefix search
    Search {
        part_number: String,
        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },
    /// Look up wipers by the first three characters of a part number
    Prefix {
        part_number: String,
        #[arg(long)]
        json: bool,
    },
    /// Look up brake-pad equivalents
    BrakePads {
        part_number: String,
        #[arg(long)]
        json: bool,
    },
    /// Fetch the spreadsheet and report what each tab contributes
    Check,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_wipers(response: &SearchResponse<WiperGroup>) {
    println!("{}", response.message);
    for group in &response.results {
        println!("\n   📂 {}", group.section);
        println!("   📦 Main part: {}", group.main_part);
        println!("   🔗 All parts: {}", group.all_parts.join(", "));
    }
}

fn print_brake_pads(response: &SearchResponse<BrakePadGroup>) {
    println!("{}", response.message);
    for group in &response.results {
        println!("\n   📂 {}", group.section);
        println!("   📦 Main part:    {}", group.main_part);
        println!("   🔗 OE analogue:  {}", group.oe_analogue);
        println!("   🔗 Not original: {}", group.not_original);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init_logging();
    let config = Config::load()?;

    match cli.command {
        Commands::Serve { port } => {
            metrics::init_metrics();
            let service = LookupService::from_config(&config)?;
            info!(source = service.source_name(), "Lookup service ready");
            let state = AppState {
                service: Arc::new(service),
            };
            let port = port.unwrap_or(config.server.port);
            start_server(state, &config.server.static_dir, port)
                .await
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        Commands::Search { part_number, json } => {
            let service = LookupService::from_config(&config)?;
            let response = service.search(&part_number).await?;
            if json {
                print_json(&response)?;
            } else {
                print_wipers(&response);
            }
        }
        Commands::Prefix { part_number, json } => {
            let service = LookupService::from_config(&config)?;
            let response = service.search_prefix(&part_number).await?;
            if json {
                print_json(&response)?;
            } else {
                print_wipers(&response);
            }
        }
        Commands::BrakePads { part_number, json } => {
            let service = LookupService::from_config(&config)?;
            let response = service.search_brake_pads(&part_number).await?;
            if json {
                print_json(&response)?;
            } else {
                print_brake_pads(&response);
            }
        }
        Commands::Check => {
            let service = LookupService::from_config(&config)?;
            println!("🔍 Reading spreadsheet via {}", service.source_name());
            let summaries = service.inspect().await?;
            println!("📋 Tabs found: {}", summaries.len());
            for tab in &summaries {
                println!("\n📄 {}", tab.name);
                println!("   Rows:           {}", tab.rows);
                println!("   Wiper rows:     {}", tab.wiper_rows);
                println!("   Brake-pad rows: {}", tab.brake_pad_rows);
            }
            let wipers: usize = summaries.iter().map(|t| t.wiper_rows).sum();
            let pads: usize = summaries.iter().map(|t| t.brake_pad_rows).sum();
            println!("\n✅ {} wiper rows, {} brake-pad rows", wipers, pads);
        }
    }

    Ok(())
}
