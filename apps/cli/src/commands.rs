//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bookadvisor_core::library;
use bookadvisor_core::pipeline::{SearchPipeline, SearchProgress, validate_query};
use bookadvisor_shared::{
    AppConfig, BookRecord, CatalogConfig, SaveMode, init_config, load_config, load_config_from,
};
use bookadvisor_storage::{ConsoleSink, LogNotifier, RecordSink, RecordStore};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// BookAdvisor: find books and keep a reading list.
#[derive(Parser)]
#[command(
    name = "bookadvisor",
    version,
    about = "Search an online book catalog and manage a local reading list.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Library file (overrides `library.path` from the config).
    #[arg(long, global = true, env = "BOOKADVISOR_LIBRARY")]
    pub library: Option<PathBuf>,

    /// Where saved books go: file or console (overrides `library.save_mode`).
    #[arg(long, global = true)]
    pub save_mode: Option<SaveMode>,

    /// Config file to use instead of ~/.bookadvisor/bookadvisor.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Search the catalog and optionally save one result.
    Search {
        /// Search terms.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Save the Nth result (1-based, 0 saves nothing).
        #[arg(short, long)]
        pick: Option<usize>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show every book in the library.
    List {
        /// Print the library as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Add a book by hand.
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        author: String,

        /// Cover image URL.
        #[arg(long)]
        cover: Option<String>,

        /// Publication year or date.
        #[arg(long)]
        year: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Remove the Nth book (1-based, as shown by `list`).
    Remove {
        position: usize,
    },

    /// Remove every book from the library.
    Clear,

    /// Print the fields of a book record.
    Schema,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "bookadvisor=info",
        1 => "bookadvisor=debug",
        _ => "bookadvisor=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Settings resolution
// ---------------------------------------------------------------------------

/// Config file values with command-line overrides applied.
struct Settings {
    config: AppConfig,
    library: PathBuf,
    save_mode: SaveMode,
}

impl Settings {
    fn resolve(cli: &Cli) -> Result<Self> {
        let config = match &cli.config {
            Some(path) => load_config_from(path)?,
            None => load_config()?,
        };
        let library = cli
            .library
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.library.path));
        let save_mode = cli.save_mode.unwrap_or(config.library.save_mode);

        Ok(Self {
            config,
            library,
            save_mode,
        })
    }

    /// The library file, with the logging observer attached.
    fn store(&self) -> RecordStore {
        open_store(&self.library)
    }

    fn sink(&self) -> Box<dyn RecordSink> {
        match self.save_mode {
            SaveMode::File => Box::new(self.store()),
            SaveMode::Console => Box::new(ConsoleSink::stdout()),
        }
    }
}

fn open_store(path: &Path) -> RecordStore {
    let mut store = RecordStore::new(path);
    store.register(LogNotifier);
    store
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    if let Command::Config { action } = &cli.command {
        return match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(cli.config.as_deref()),
        };
    }

    let settings = Settings::resolve(&cli)?;

    match cli.command {
        Command::Search { query, pick, json } => {
            cmd_search(&settings, &query.join(" "), pick, json).await
        }
        Command::List { json } => cmd_list(&settings, json),
        Command::Add {
            title,
            author,
            cover,
            year,
            description,
        } => {
            let mut builder = BookRecord::builder()
                .title(title)
                .author(author)
                .cover_url(cover)
                .description(description.unwrap_or_default());
            if let Some(year) = year {
                builder = builder.publish_date(year);
            }
            cmd_add(&settings, builder.build())
        }
        Command::Remove { position } => cmd_remove(&settings, position),
        Command::Clear => cmd_clear(&settings),
        Command::Schema => {
            cmd_schema();
            Ok(())
        }
        Command::Config { .. } => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_search(settings: &Settings, query: &str, pick: Option<usize>, json: bool) -> Result<()> {
    let query = validate_query(query)?;
    let pipeline = SearchPipeline::new(&CatalogConfig::from(&settings.config))?;

    info!(query, "searching catalog");

    let progress = Arc::new(CliProgress::new());
    let results = pipeline.run_with_progress(query, progress).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        println!("No books found for '{query}'.");
    } else {
        for (i, record) in results.iter().enumerate() {
            println!("{}. {record}", i + 1);
        }
    }

    match pick {
        None | Some(0) => Ok(()),
        Some(n) => {
            let record = results
                .get(n - 1)
                .ok_or_else(|| eyre!("invalid choice: {n} (got {} result(s))", results.len()))?;
            save_one(settings, record)
        }
    }
}

fn cmd_list(settings: &Settings, json: bool) -> Result<()> {
    let records = settings.store().load_all();

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("Your library is empty.");
        return Ok(());
    }

    for (i, record) in records.iter().enumerate() {
        println!("{}", library::describe_entry(i + 1, record));
    }
    println!();
    println!("Total: {} book(s)", records.len());
    Ok(())
}

fn cmd_add(settings: &Settings, record: BookRecord) -> Result<()> {
    if record.title().trim().is_empty() {
        return Err(eyre!("title cannot be empty"));
    }
    save_one(settings, &record)
}

fn save_one(settings: &Settings, record: &BookRecord) -> Result<()> {
    let sink = settings.sink();
    sink.save(record)?;
    if settings.save_mode == SaveMode::File {
        println!("Saved '{record}' to {}", settings.library.display());
    }
    Ok(())
}

fn cmd_remove(settings: &Settings, position: usize) -> Result<()> {
    if position == 0 {
        return Err(eyre!("invalid choice: positions start at 1"));
    }
    let store = settings.store();
    let removed = library::remove_at(&store, &*settings.sink(), position - 1)?;
    println!("Removed '{removed}'");
    Ok(())
}

fn cmd_clear(settings: &Settings) -> Result<()> {
    library::clear(&*settings.sink())?;
    println!("Library cleared.");
    Ok(())
}

fn cmd_schema() {
    println!("BookRecord");
    for (name, ty) in BookRecord::SCHEMA {
        println!("  {name}: {ty}");
    }
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config: AppConfig = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Search progress shown as an indicatif spinner on stderr.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl SearchProgress for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn hit_enriched(&self, title: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Describing [{current}/{total}] {title}"));
    }

    fn done(&self, _results: usize) {
        self.spinner.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn search_joins_terms_and_reads_pick() {
        let cli = Cli::parse_from(["bookadvisor", "search", "lord", "of", "the", "rings", "--pick", "2"]);
        match cli.command {
            Command::Search { query, pick, json } => {
                assert_eq!(query.join(" "), "lord of the rings");
                assert_eq!(pick, Some(2));
                assert!(!json);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn global_overrides_parse() {
        let cli = Cli::parse_from([
            "bookadvisor",
            "list",
            "--save-mode",
            "console",
            "--library",
            "/tmp/books.txt",
        ]);
        assert_eq!(cli.save_mode, Some(SaveMode::Console));
        assert_eq!(cli.library, Some(PathBuf::from("/tmp/books.txt")));
    }

    #[test]
    fn unknown_save_mode_is_rejected() {
        assert!(Cli::try_parse_from(["bookadvisor", "list", "--save-mode", "cloud"]).is_err());
    }

    #[test]
    fn search_requires_terms() {
        assert!(Cli::try_parse_from(["bookadvisor", "search"]).is_err());
    }
}
