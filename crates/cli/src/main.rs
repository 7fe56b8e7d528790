use anyhow::{bail, Context, Result};
use catalog::{parse_filter_spec, FacetCatalog, Filter, FilterType};
use clap::{Parser, Subcommand};
use colored::Colorize;
use filter_store::{ActiveFilters, FilterStore, SessionFile};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Storefront Filters - active facet filters for product listings
#[derive(Parser)]
#[command(name = "storefront-filters")]
#[command(about = "Browse facets and manage the active filters of a listing session", long_about = None)]
struct Cli {
    /// Path to the facet catalog (JSON array of filters)
    #[arg(short, long, default_value = "data/facets.json")]
    catalog: PathBuf,

    /// File the active filters are persisted to between runs
    #[arg(short, long, default_value = ".storefront-filters.json")]
    session: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the selectable facets, grouped by type
    Facets {
        /// Only list facets of this type (e.g. varietal, pairing-note)
        #[arg(long = "type")]
        filter_type: Option<FilterType>,
    },

    /// Show the active filters
    Show,

    /// Toggle filters on or off, given as `type:name` or a catalog facet name
    Toggle {
        #[arg(required = true)]
        filters: Vec<String>,
    },

    /// Remove active filters by name
    Remove {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Remove every active filter
    Clear,

    /// Run concurrent toggles against one shared store
    Benchmark {
        /// Number of toggle operations to perform
        #[arg(long, default_value = "10000")]
        operations: usize,

        /// Number of concurrent tasks
        #[arg(long, default_value = "8")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Facets { filter_type } => handle_facets(&cli.catalog, filter_type)?,
        Commands::Show => handle_show(&cli.session)?,
        Commands::Toggle { filters } => handle_toggle(&cli.catalog, &cli.session, &filters)?,
        Commands::Remove { names } => handle_remove(&cli.session, &names)?,
        Commands::Clear => handle_clear(&cli.session)?,
        Commands::Benchmark {
            operations,
            concurrent,
        } => handle_benchmark(&cli.catalog, operations, concurrent).await?,
    }

    Ok(())
}

/// Handle the 'facets' command
fn handle_facets(catalog_path: &Path, only: Option<FilterType>) -> Result<()> {
    let catalog = FacetCatalog::load_from_file(catalog_path)
        .with_context(|| format!("Failed to load facet catalog {}", catalog_path.display()))?;

    let types: Vec<FilterType> = match only {
        Some(t) => vec![t],
        None => FilterType::ALL.to_vec(),
    };

    for filter_type in types {
        let facets = catalog.facets_by_type(filter_type);
        if facets.is_empty() {
            continue;
        }
        println!("{}", filter_type.to_string().bold().blue());
        for facet in facets {
            match facet.display_category_id {
                Some(id) => println!("  {} {} (category {})", "•".green(), facet.name, id),
                None => println!("  {} {}", "•".green(), facet.name),
            }
        }
    }
    Ok(())
}

/// Handle the 'show' command
fn handle_show(session_path: &Path) -> Result<()> {
    let store = open_session(session_path)?.1;
    print_filter_bar(&store.active_filters());
    Ok(())
}

/// Handle the 'toggle' command
fn handle_toggle(catalog_path: &Path, session_path: &Path, inputs: &[String]) -> Result<()> {
    let catalog = match FacetCatalog::load_from_file(catalog_path) {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            tracing::warn!("Facet catalog unavailable, using filters as given: {}", e);
            None
        }
    };

    // Resolve everything first so a typo leaves the session untouched
    let filters = inputs
        .iter()
        .map(|input| resolve_filter(catalog.as_ref(), input))
        .collect::<Result<Vec<_>>>()?;

    let (_session, store, _subs) = open_session_with_display(session_path)?;
    for filter in filters {
        let label = filter.to_string();
        if store.toggle_active_filter(filter) {
            println!("{} {}", "+".green(), label);
        } else {
            println!("{} {}", "-".red(), label);
        }
    }
    Ok(())
}

/// Handle the 'remove' command
fn handle_remove(session_path: &Path, names: &[String]) -> Result<()> {
    let (_session, store, _subs) = open_session_with_display(session_path)?;
    for name in names {
        if !store.remove_filter(name) {
            println!("{} {} is not active", "•".yellow(), name);
        }
    }
    Ok(())
}

/// Handle the 'clear' command
fn handle_clear(session_path: &Path) -> Result<()> {
    let (_session, store, _subs) = open_session_with_display(session_path)?;
    if !store.clear_all() {
        println!("No active filters");
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(catalog_path: &Path, operations: usize, concurrent: usize) -> Result<()> {
    if operations == 0 || concurrent == 0 {
        bail!("operations and concurrent must both be greater than zero");
    }

    let facets: Vec<Filter> = match FacetCatalog::load_from_file(catalog_path) {
        Ok(catalog) => FilterType::ALL
            .iter()
            .flat_map(|t| catalog.facets_by_type(*t))
            .cloned()
            .collect(),
        Err(_) => Vec::new(),
    };
    let facets = if facets.is_empty() {
        (0..32)
            .map(|i| Filter::new(format!("facet-{i}"), FilterType::ALL[i % FilterType::ALL.len()]))
            .collect()
    } else {
        facets
    };

    let store = FilterStore::new();
    let per_task = operations.div_ceil(concurrent);
    let start = Instant::now();

    let mut handles = vec![];
    for _ in 0..concurrent {
        let store = store.clone();
        let facets = facets.clone();
        let handle = tokio::spawn(async move {
            let mut timings = Vec::with_capacity(per_task);
            for _ in 0..per_task {
                let filter = facets[rand::random::<u32>() as usize % facets.len()].clone();
                let op_start = Instant::now();
                store.toggle_active_filter(filter);
                timings.push(op_start.elapsed());
            }
            timings
        });
        handles.push(handle);
    }

    let mut timings: Vec<Duration> = vec![];
    for handle in handles {
        timings.extend(handle.await?);
    }
    let wall_time = start.elapsed();

    timings.sort();
    let total: Duration = timings.iter().sum();
    let avg_latency = total / timings.len() as u32;
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = timings.len() as f64 / wall_time.as_secs_f64();

    println!("Benchmark results:");
    println!("Operations: {}", timings.len());
    println!("Total time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} operations/second", throughput);
    println!("Active filters at end: {}", store.active_filters().len());

    Ok(())
}

/// Turn user input into a filter.
///
/// `type:name` is parsed directly (and picks up catalog details when the
/// name is known); a bare name must exist in the catalog.
fn resolve_filter(catalog: Option<&FacetCatalog>, input: &str) -> Result<Filter> {
    if input.contains(':') {
        let parsed = parse_filter_spec(input)?;
        let known = catalog
            .and_then(|c| c.get(&parsed.name))
            .filter(|f| f.filter_type == parsed.filter_type);
        return Ok(known.cloned().unwrap_or(parsed));
    }

    catalog
        .and_then(|c| c.get(input.trim()))
        .cloned()
        .with_context(|| format!("Unknown facet '{}'; use <type>:<name> for facets outside the catalog", input))
}

fn open_session(session_path: &Path) -> Result<(SessionFile, FilterStore)> {
    let session = SessionFile::new(session_path);
    let store = session
        .restore()
        .with_context(|| format!("Failed to restore session {}", session_path.display()))?;
    Ok((session, store))
}

/// Open the session with the filter bar and persistence attached.
fn open_session_with_display(
    session_path: &Path,
) -> Result<(SessionFile, FilterStore, Vec<filter_store::Subscription>)> {
    let (session, store) = open_session(session_path)?;
    let subs = vec![
        session.attach(&store),
        store.subscribe(|active: &ActiveFilters| print_filter_bar(active)),
    ];
    Ok((session, store, subs))
}

/// Print one chip per active filter, in the order they were added
fn print_filter_bar(active: &ActiveFilters) {
    if active.is_empty() {
        println!("{}", "Active filters: none".dimmed());
        return;
    }
    let chips = active
        .iter()
        .map(|f| format!("[{} ×]", f.name).cyan().to_string())
        .collect::<Vec<_>>()
        .join(" ");
    println!("{} {}", "Active filters:".bold(), chips);
}
