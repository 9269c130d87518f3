use clap::Parser;
use perimetre::catalog::{Catalog, CatalogLoader, DataSource, Settlement};
use perimetre::export::write_csv;
use perimetre::search::{find_reference, render_table, search_within_radius, SearchHit};
use std::path::PathBuf;

/// Perimetre v0.4 - Commune Radius Search Engine
///
/// Finds every settlement within a radius of a reference commune and
/// ranks the result by ascending great-circle distance.
///
/// Examples:
///   perimetre Aubervilliers
///   perimetre --query 93300 --radius 5
///   perimetre Lyon --csv communes.csv --export communes_proches.csv
///   perimetre Paris --url https://example.org/communes.csv
///   perimetre --offline Marseille
///   perimetre --serve --port 8321 --access-key s3cret
#[derive(Parser)]
#[command(name = "perimetre", version, about, long_about = None)]
struct Cli {
    /// Settlement name or postal code (positional). Example: perimetre Aubervilliers
    #[arg(index = 1)]
    query_positional: Option<String>,

    /// Settlement name or postal code (named). Example: --query 93300
    #[arg(long)]
    query: Option<String>,

    /// Search radius in kilometers.
    #[arg(long, short = 'r', default_value_t = 10.0)]
    radius: f64,

    /// Local CSV data file (nom, code_postal, latitude, longitude).
    /// Takes precedence over --url.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Cloud-hosted CSV data file URL.
    #[arg(long)]
    url: Option<String>,

    /// Offline mode: only use cache and built-in data.
    #[arg(long)]
    offline: bool,

    /// Write the result rows to a CSV file.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Start the HTTP server instead of a one-shot search.
    #[arg(long)]
    serve: bool,

    /// Server bind host.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server bind port.
    #[arg(long, default_value_t = 8321)]
    port: u16,

    /// Shared access key gating the server API.
    /// Falls back to the PERIMETRE_ACCESS_KEY environment variable.
    #[arg(long)]
    access_key: Option<String>,
}

/// The machine-readable search result printed to stdout.
#[derive(serde::Serialize)]
struct SearchDocument<'a> {
    reference: &'a Settlement,
    radius_km: f64,
    count: usize,
    hits: &'a [SearchHit],
}

fn main() {
    let cli = Cli::parse();

    // ── Load the catalog ────────────────────────────────────────

    let source = data_source(&cli);
    let mut loader = CatalogLoader::new();
    if cli.offline {
        loader.set_offline(true);
    }

    let catalog: Catalog = loader.load(&source).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    eprintln!("  Catalog: {} settlements ({})", catalog.len(), catalog.source);

    // ── Server mode ─────────────────────────────────────────────

    if cli.serve {
        let access_key = cli
            .access_key
            .clone()
            .or_else(|| std::env::var("PERIMETRE_ACCESS_KEY").ok());

        let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("Error: Cannot start async runtime: {}", e);
            std::process::exit(1);
        });
        runtime.block_on(perimetre::server::start(
            &cli.host, cli.port, catalog, access_key,
        ));
        return;
    }

    // ── One-shot search ─────────────────────────────────────────

    let query = cli
        .query
        .clone()
        .or_else(|| cli.query_positional.clone())
        .unwrap_or_else(|| {
            eprintln!("Error: No settlement specified.");
            eprintln!();
            eprintln!("Usage:");
            eprintln!("  perimetre Aubervilliers");
            eprintln!("  perimetre --query 93300 --radius 5");
            eprintln!("  perimetre Lyon --csv communes.csv");
            eprintln!("  perimetre --serve --port 8321");
            std::process::exit(1);
        });

    let reference = find_reference(&catalog, &query).unwrap_or_else(|e| {
        eprintln!("Warning: {}", e);
        std::process::exit(1);
    });

    let hits = search_within_radius(&catalog, &reference, cli.radius).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    // Human-readable table to stderr
    eprint!("{}", render_table(reference.settlement, cli.radius, &hits));

    if let Some(ref path) = cli.export {
        write_csv(path, &hits).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        eprintln!("  Results written to {}", path.display());
    }

    // JSON to stdout
    let document = SearchDocument {
        reference: reference.settlement,
        radius_km: cli.radius,
        count: hits.len(),
        hits: &hits,
    };
    println!("{}", serde_json::to_string_pretty(&document).unwrap());
}

fn data_source(cli: &Cli) -> DataSource {
    if let Some(ref path) = cli.csv {
        return DataSource::CsvFile(path.clone());
    }
    if let Some(ref url) = cli.url {
        return DataSource::RemoteFile(url.clone());
    }
    DataSource::Api
}
