use anyhow::{Context, Result};
use book_catalog::catalog::{CatalogError, ViewController};
use book_catalog::config::{
    default_config_path, find_config_file, get_config, load_config, Config, LoggingConfig,
};
use book_catalog::models::SortKey;
use book_catalog::sources::FreeApiFetcher;
use book_catalog::ui::{
    self, status_line, DisplaySettings, RenderStyle, Status, TerminalRenderer, ViewMode,
};
use book_catalog::utils::{FilePreferences, MemoryPreferences, PreferenceStore};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Book Catalog - Browse a paginated public books catalog from the terminal
#[derive(Parser, Debug)]
#[command(name = "book-catalog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browse a paginated public books catalog", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log line format on stderr
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch one or more pages and print the sorted catalog
    #[command(alias = "b")]
    Browse {
        /// Search term (omit to browse everything)
        query: Option<String>,

        /// Sort key: none, title-asc, title-desc, date-desc, date-asc
        #[arg(long, short)]
        sort: Option<SortKey>,

        /// Number of pages to accumulate
        #[arg(long, short, default_value_t = 1)]
        pages: u32,

        /// Layout: grid or list
        #[arg(long)]
        view: Option<ViewMode>,
    },

    /// Interactive session: search, load more pages, re-sort
    Shell,

    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Write a configuration file with default values
    Init {
        /// Where to write (defaults to the per-user config location)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Everything a browsing session needs
struct App {
    controller: ViewController,
    renderer: Arc<TerminalRenderer>,
    settings: DisplaySettings,
    prefs: Box<dyn PreferenceStore>,
}

impl App {
    fn new(config: &Config, color: bool) -> Result<Self> {
        let prefs: Box<dyn PreferenceStore> = match FilePreferences::open_default() {
            Ok(prefs) => Box::new(prefs),
            Err(e) => {
                tracing::warn!(error = %e, "preferences unavailable, changes will not be saved");
                Box::new(MemoryPreferences::new())
            }
        };
        let settings = DisplaySettings::load(prefs.as_ref(), config);

        let mut style = RenderStyle::new(&settings, &config.ui, ui::terminal_width());
        style.color = color;
        let renderer = Arc::new(TerminalRenderer::stdout(style));

        let fetcher = FreeApiFetcher::new(&config.api)
            .with_context(|| format!("Invalid API settings for {}", config.api.base_url))?;
        let controller =
            ViewController::new(Arc::new(fetcher), renderer.clone(), renderer.clone())
                .skip_duplicates(config.catalog.skip_duplicates)
                .with_sort_key(settings.sort);

        Ok(Self {
            controller,
            renderer,
            settings,
            prefs,
        })
    }

    fn apply_style(&self) {
        let style = RenderStyle {
            theme: self.settings.theme,
            view: self.settings.view,
            ..self.renderer.style()
        };
        self.renderer.set_style(style);
    }

    fn color(&self) -> bool {
        self.renderer.style().color
    }

    fn summary(&self) -> String {
        let query = self.controller.query();
        let term = if query.search_term().is_empty() {
            "all books".to_string()
        } else {
            format!("\"{}\"", query.search_term())
        };
        format!(
            "{} books for {} (page {} of {}, sorted by {})",
            self.controller.records().len(),
            term,
            query.page(),
            query.total_pages(),
            query.sort_key().label()
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from file if specified or found in default locations
    let config_path = cli.config.clone().or_else(find_config_file);
    let config = match &config_path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => get_config().context("Failed to read configuration")?,
    };

    init_tracing(&cli, &config.logging);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let color = config.ui.color && !cli.no_color && ui::is_terminal();

    match cli.command {
        Some(Commands::Config { action }) => run_config(action, &config, config_path),
        Some(Commands::Shell) => {
            let mut app = App::new(&config, color)?;
            run_shell(&mut app).await
        }
        Some(Commands::Browse {
            query,
            sort,
            pages,
            view,
        }) => {
            let mut app = App::new(&config, color)?;
            run_browse(&mut app, query.as_deref().unwrap_or(""), sort, pages, view).await
        }
        None => {
            let mut app = App::new(&config, color)?;
            run_browse(&mut app, "", None, 1, None).await
        }
    }
}

fn init_tracing(cli: &Cli, logging: &LoggingConfig) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("book_catalog={}", level)));

    let json = match cli.log_format {
        Some(format) => format == LogFormat::Json,
        None => logging.format.as_deref() == Some("json"),
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run_browse(
    app: &mut App,
    query: &str,
    sort: Option<SortKey>,
    pages: u32,
    view: Option<ViewMode>,
) -> Result<()> {
    if let Some(view) = view {
        app.settings.view = view;
        app.apply_style();
    }

    // Print the accumulated catalog once, after the last page
    app.renderer.set_paused(true);
    if let Some(sort) = sort {
        app.controller.change_sort(sort);
    }
    let mut failed = app.controller.search(query).await.is_err();

    let mut fetched = 1;
    while !failed && fetched < pages.max(1) && app.controller.can_load_more() {
        failed = app.controller.load_more().await.is_err();
        fetched += 1;
    }
    app.renderer.set_paused(false);

    if failed && app.controller.records().is_empty() {
        anyhow::bail!("No books could be loaded");
    }

    app.controller.refresh();
    eprintln!("{}", status_line(Status::Info, &app.summary(), app.color()));
    Ok(())
}

const SHELL_HELP: &str = "\
Commands:
  search <term>   Start a new search (empty term browses everything)
  more            Load the next page
  sort <key>      none, title-asc, title-desc, date-desc, date-asc
  view <mode>     grid or list
  theme           Toggle light and dark theme
  help            Show this help
  quit            Leave the shell";

async fn run_shell(app: &mut App) -> Result<()> {
    let color = app.color();
    eprintln!(
        "{}",
        status_line(Status::Search, "Book catalog shell, type 'help' for commands", color)
    );

    if let Err(e) = app.controller.search("").await {
        tracing::debug!(error = %e, "initial browse failed");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        let line = line.trim();
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };

        match command {
            "" => continue,
            "search" | "s" => {
                if let Err(e) = app.controller.search(arg).await {
                    tracing::debug!(error = %e, "search failed");
                }
            }
            "more" | "m" => match app.controller.load_more().await {
                Ok(_) => {}
                Err(CatalogError::InvalidState(msg)) => {
                    eprintln!("{}", status_line(Status::Warning, &msg, color));
                }
                Err(e) => tracing::debug!(error = %e, "load more failed"),
            },
            "sort" => match arg.parse::<SortKey>() {
                Ok(key) => {
                    if let Err(e) = app.settings.set_sort(key, app.prefs.as_ref()) {
                        tracing::warn!(error = %e, "could not save sort preference");
                    }
                    app.controller.change_sort(key);
                }
                Err(e) => eprintln!("{}", status_line(Status::Warning, &e.to_string(), color)),
            },
            "view" => match arg.parse::<ViewMode>() {
                Ok(view) => {
                    if let Err(e) = app.settings.set_view(view, app.prefs.as_ref()) {
                        tracing::warn!(error = %e, "could not save view preference");
                    }
                    app.apply_style();
                    app.controller.refresh();
                }
                Err(msg) => eprintln!("{}", status_line(Status::Warning, &msg, color)),
            },
            "theme" => {
                match app.settings.toggle_theme(app.prefs.as_ref()) {
                    Ok(theme) => tracing::info!(%theme, "theme changed"),
                    Err(e) => tracing::warn!(error = %e, "could not save theme preference"),
                }
                app.apply_style();
                app.controller.refresh();
            }
            "status" => eprintln!("{}", status_line(Status::Info, &app.summary(), color)),
            "help" | "?" => println!("{}", SHELL_HELP),
            "quit" | "exit" | "q" => break,
            other => eprintln!(
                "{}",
                status_line(
                    Status::Warning,
                    &format!("Unknown command: {} (try 'help')", other),
                    color
                )
            ),
        }
    }

    Ok(())
}

fn run_config(action: ConfigAction, config: &Config, loaded_from: Option<PathBuf>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            match loaded_from {
                Some(path) => println!("# Loaded from {}", path.display()),
                None => println!("# No config file found, showing defaults and environment"),
            }
            print!("{}", toml::to_string_pretty(config)?);
        }
        ConfigAction::Init { path, force } => {
            let path = path.unwrap_or_else(default_config_path);
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            Config::default().save_toml(&path)?;
            println!(
                "{}",
                status_line(
                    Status::Success,
                    &format!("Wrote {}", path.display()),
                    ui::is_terminal()
                )
            );
        }
    }
    Ok(())
}
