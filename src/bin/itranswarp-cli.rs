use clap::{Parser, Subcommand};

use itranswarp::controllers;
use itranswarp::docs::ApiDocIndex;
use itranswarp::routing::{build_route_table, RouteTable};

#[derive(Parser)]
#[command(name = "itranswarp-cli")]
#[command(about = "Inspect the route table and API docs of the built-in modules", long_about = None)]
struct Cli {
    /// Log boot warnings (skipped routes, missing docs) to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every registered route as "VERB path  module"
    Routes,
    /// Print the API doc index as JSON
    ApiDocs {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter("itranswarp=info")
            .init();
    }

    let (table, docs) = boot();

    match cli.command {
        Commands::Routes => {
            for entry in table.entries() {
                println!("{:<5} {:<40} {}", entry.verb.as_str(), entry.path, entry.module);
            }
        }
        Commands::ApiDocs { pretty } => {
            let json = if pretty {
                serde_json::to_string_pretty(&docs)?
            } else {
                serde_json::to_string(&docs)?
            };
            println!("{json}");
        }
    }

    Ok(())
}

fn boot() -> (RouteTable, ApiDocIndex) {
    let loaded = controllers::registry().load_all();
    let mut docs = ApiDocIndex::new();
    let table = build_route_table(&loaded, &mut docs);
    (table, docs)
}
