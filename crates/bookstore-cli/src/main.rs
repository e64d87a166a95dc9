//! Bookstore CLI - runs the books catalog against a MongoDB server
//!
//! Usage:
//!   bookstore ping                         Check the server is reachable
//!   bookstore seed --drop                  Reload the sample books
//!   bookstore genre [NAME]                 Books in a genre (default: Fiction)
//!   bookstore after [YEAR]                 Books published after a year (default: 1950)
//!   bookstore author [NAME]                Books by an author (default: George Orwell)
//!   bookstore update-price                 Set the price of a title
//!   bookstore delete                       Delete a book by title
//!   bookstore in-stock-after [YEAR]        In-stock books published after a year
//!   bookstore summaries                    Title, author and price of every book
//!   bookstore sorted [--desc]              Books ordered by price
//!   bookstore page [N] [--size 5]          One page of books (zero-based)
//!   bookstore avg-price                    Average price per genre
//!   bookstore top-author                   Author with the most books
//!   bookstore decades                      Books per publication decade
//!   bookstore create-indexes               Title and author/year indexes
//!   bookstore indexes                      List index names
//!   bookstore explain title|author         Execution stats for indexed finds
//!   bookstore run-all                      Every operation above, in order
//!
//! Connection settings come from --config, MONGODB_URI / BOOKSTORE_DB /
//! BOOKSTORE_COLLECTION, and --uri / --database / --collection.

mod config;
mod output;

use anyhow::{Context, Result};
use bookstore_mongodb::{
    advanced, aggregation, crud, indexes, run_all, seed, Connection, Page, SortOrder,
    DEFAULT_PAGE_SIZE,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use config::{FileConfig, FlagOverrides};
use output::Printer;

#[derive(Parser)]
#[command(name = "bookstore")]
#[command(about = "MongoDB operations on the bookstore books collection", long_about = None)]
#[command(version)]
struct Cli {
    /// MongoDB connection string (overrides MONGODB_URI)
    #[arg(long, global = true)]
    uri: Option<String>,

    /// Database name (overrides BOOKSTORE_DB)
    #[arg(long, global = true)]
    database: Option<String>,

    /// Collection name (overrides BOOKSTORE_COLLECTION)
    #[arg(long, global = true)]
    collection: Option<String>,

    /// Path to a bookstore.toml file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the server answers
    Ping,

    /// Insert the sample books
    Seed {
        /// Drop the collection first
        #[arg(long)]
        drop: bool,
    },

    /// Find books in a genre
    Genre {
        #[arg(default_value = crud::DEFAULT_GENRE)]
        name: String,
    },

    /// Find books published after a year
    After {
        #[arg(default_value_t = crud::DEFAULT_PUBLISHED_AFTER, allow_negative_numbers = true)]
        year: i32,
    },

    /// Find books by an author
    Author {
        #[arg(default_value = crud::DEFAULT_AUTHOR)]
        name: String,
    },

    /// Update the price of a book
    UpdatePrice {
        #[arg(long, default_value = crud::DEFAULT_PRICE_UPDATE_TITLE)]
        title: String,

        #[arg(long, default_value_t = crud::DEFAULT_PRICE_UPDATE)]
        price: f64,
    },

    /// Delete a book by its title
    Delete {
        #[arg(long, default_value = crud::DEFAULT_DELETE_TITLE)]
        title: String,
    },

    /// Find in-stock books published after a year
    InStockAfter {
        #[arg(default_value_t = advanced::DEFAULT_IN_STOCK_AFTER, allow_negative_numbers = true)]
        year: i32,
    },

    /// Title, author and price of every book
    Summaries,

    /// Books sorted by price
    Sorted {
        /// `asc` for cheapest first, `desc` for most expensive first
        #[arg(long, default_value_t = SortOrder::Ascending)]
        order: SortOrder,
    },

    /// One page of books
    Page {
        /// Zero-based page number
        #[arg(default_value_t = 0)]
        number: u32,

        /// Books per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        size: u32,
    },

    /// Average price per genre
    AvgPrice,

    /// Author with the most books
    TopAuthor,

    /// Book counts per publication decade
    Decades,

    /// Create the title and author/published_year indexes
    CreateIndexes,

    /// List index names
    Indexes,

    /// Explain an indexed find with executionStats
    Explain {
        #[command(subcommand)]
        target: ExplainTarget,

        /// Also print the full explain document
        #[arg(short, long, global = true)]
        verbose: bool,
    },

    /// Run the whole catalog in order
    RunAll,
}

#[derive(Subcommand)]
enum ExplainTarget {
    /// find({ title })
    Title {
        #[arg(default_value = indexes::DEFAULT_EXPLAIN_TITLE)]
        title: String,
    },
    /// find({ author, published_year: { $gt: year } })
    Author {
        #[arg(default_value = indexes::DEFAULT_EXPLAIN_AUTHOR)]
        author: String,

        #[arg(default_value_t = indexes::DEFAULT_EXPLAIN_AFTER, allow_negative_numbers = true)]
        year: i32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    rt.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let file = cli.config.as_deref().map(FileConfig::load).transpose()?;
    let settings = config::resolve(
        file,
        |key| std::env::var(key).ok(),
        FlagOverrides {
            uri: cli.uri,
            database: cli.database,
            collection: cli.collection,
        },
    );
    debug!(
        database = %settings.database,
        collection = %settings.collection,
        "resolved configuration"
    );

    let conn = Connection::with_config(settings)
        .await
        .context("Failed to set up MongoDB client")?;
    let books = conn.books();
    let out = Printer::new(cli.json);

    match cli.command {
        Commands::Ping => {
            conn.ping().await?;
            out.value(
                &serde_json::json!({ "ok": 1, "database": conn.database_name() }),
                format!("ok ({})", conn.database_name()),
            )?;
        }
        Commands::Seed { drop } => {
            let inserted = seed::seed(&books, drop).await?;
            out.value(&inserted, format!("inserted {} books", inserted))?;
        }
        Commands::Genre { name } => {
            out.rows(&crud::find_by_genre(&books, &name).await?)?;
        }
        Commands::After { year } => {
            out.rows(&crud::find_published_after(&books, year).await?)?;
        }
        Commands::Author { name } => {
            out.rows(&crud::find_by_author(&books, &name).await?)?;
        }
        Commands::UpdatePrice { title, price } => {
            let outcome = crud::update_price(&books, &title, price).await?;
            out.value(
                &serde_json::json!({ "matched": outcome.matched, "modified": outcome.modified }),
                format!("matched {}, modified {}", outcome.matched, outcome.modified),
            )?;
        }
        Commands::Delete { title } => {
            let outcome = crud::delete_by_title(&books, &title).await?;
            out.value(
                &serde_json::json!({ "deleted": outcome.deleted }),
                format!("deleted {}", outcome.deleted),
            )?;
        }
        Commands::InStockAfter { year } => {
            out.rows(&advanced::find_in_stock_published_after(&books, year).await?)?;
        }
        Commands::Summaries => {
            out.rows(&advanced::list_summaries(&books).await?)?;
        }
        Commands::Sorted { order } => {
            out.rows(&advanced::sorted_by_price(&books, order).await?)?;
        }
        Commands::Page { number, size } => {
            let page = Page::new(number, size)?;
            out.rows(&advanced::page(&books, page).await?)?;
        }
        Commands::AvgPrice => {
            out.genre_averages(&aggregation::average_price_by_genre(&books).await?)?;
        }
        Commands::TopAuthor => {
            out.top_author(aggregation::top_author(&books).await?.as_ref())?;
        }
        Commands::Decades => {
            out.decades(&aggregation::count_by_decade(&books).await?)?;
        }
        Commands::CreateIndexes => {
            let names = vec![
                indexes::create_title_index(&books).await?,
                indexes::create_author_year_index(&books).await?,
            ];
            out.value(&names, names.join("\n"))?;
        }
        Commands::Indexes => {
            let names = indexes::list_indexes(&books).await?;
            out.value(&names, names.join("\n"))?;
        }
        Commands::Explain { target, verbose } => {
            let summary = match target {
                ExplainTarget::Title { title } => {
                    indexes::explain_find_by_title(&books, &title).await?
                }
                ExplainTarget::Author { author, year } => {
                    indexes::explain_find_by_author_after(&books, &author, year).await?
                }
            };
            out.explain(&summary, verbose)?;
        }
        Commands::RunAll => {
            out.report(&run_all(&books).await?)?;
        }
    }

    Ok(())
}

/// Initialize logging based on log level
fn init_logging(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .ok(); // Ignore error if already initialized

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_match_catalog() {
        let cli = Cli::parse_from(["bookstore", "update-price"]);
        match cli.command {
            Commands::UpdatePrice { title, price } => {
                assert_eq!(title, "The Great Gatsby");
                assert_eq!(price, 10.49);
            }
            _ => panic!("expected update-price"),
        }

        let cli = Cli::parse_from(["bookstore", "page", "1"]);
        match cli.command {
            Commands::Page { number, size } => assert_eq!((number, size), (1, 5)),
            _ => panic!("expected page"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "bookstore",
            "explain",
            "author",
            "--verbose",
            "--uri",
            "mongodb://db:27017",
            "--json",
        ]);
        assert_eq!(cli.uri.as_deref(), Some("mongodb://db:27017"));
        assert!(cli.json);
        match cli.command {
            Commands::Explain {
                target: ExplainTarget::Author { author, year },
                verbose,
            } => {
                assert_eq!(author, "George Orwell");
                assert_eq!(year, 1940);
                assert!(verbose);
            }
            _ => panic!("expected explain author"),
        }
    }

    #[test]
    fn test_sorted_order_flag() {
        let cli = Cli::parse_from(["bookstore", "sorted"]);
        assert!(matches!(cli.command, Commands::Sorted { order: SortOrder::Ascending }));

        let cli = Cli::parse_from(["bookstore", "sorted", "--order", "desc"]);
        assert!(matches!(cli.command, Commands::Sorted { order: SortOrder::Descending }));

        assert!(Cli::try_parse_from(["bookstore", "sorted", "--order", "sideways"]).is_err());
    }

    #[test]
    fn test_negative_years_parse() {
        let cli = Cli::parse_from(["bookstore", "after", "-5"]);
        assert!(matches!(cli.command, Commands::After { year: -5 }));

        let cli = Cli::parse_from(["bookstore", "in-stock-after", "-300"]);
        assert!(matches!(cli.command, Commands::InStockAfter { year: -300 }));

        let cli = Cli::parse_from(["bookstore", "explain", "author", "Homer", "-700"]);
        match cli.command {
            Commands::Explain {
                target: ExplainTarget::Author { author, year },
                ..
            } => assert_eq!((author.as_str(), year), ("Homer", -700)),
            _ => panic!("expected explain author"),
        }
    }

    #[test]
    fn test_zero_page_size_parses_but_is_rejected() {
        let cli = Cli::parse_from(["bookstore", "page", "--size", "0"]);
        if let Commands::Page { number, size } = cli.command {
            assert!(Page::new(number, size).is_err());
        } else {
            panic!("expected page");
        }
    }
}
