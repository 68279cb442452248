use clap::{ArgAction, Parser, Subcommand};
use commands::{browse, clear, config, details, watchlist};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "moviemuse")]
#[command(about = "MovieMuse - Discover movies and keep one watchlist everywhere")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to a file (daily rotation) instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the movie catalog
    #[command(long_about = "Browse the movie catalog by category, search it, and page through the results. Sorting is applied to the fetched page. Unknown category or sort values fall back to the defaults (popular, score).")]
    Browse {
        /// Category: popular, trending, top_rated, now_playing, upcoming
        #[arg(long, default_value = "popular")]
        category: String,

        /// Page number (the catalog serves at most 500 pages)
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Search the catalog instead of listing a category
        #[arg(long, value_name = "QUERY")]
        search: Option<String>,

        /// Sort order: score, popularity, release_date, title
        #[arg(long, default_value = "score")]
        sort: String,
    },

    /// Show a movie's details, top cast, trailer, and reviews
    Details {
        /// Movie identifier from the catalog
        id: u64,
    },

    /// Manage the personal watchlist
    #[command(long_about = "Manage the personal watchlist. Mutations always persist locally; when signed in with remote sync enabled, they are also pushed to the per-user cloud record. Remote failures are reported as warnings and never lose local state.")]
    Watchlist {
        #[command(subcommand)]
        cmd: WatchlistCommands,
    },

    /// Configure API access and the signed-in account
    #[command(long_about = "Manage configuration and credentials. Running without a subcommand shows the current configuration with secrets masked.")]
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },

    /// Clear stored data
    #[command(long_about = "Clear stored data. Use --watchlist to clear the local watchlist slot, --credentials to clear stored credentials, or --all to clear everything.")]
    Clear {
        /// Clear the local watchlist and credentials
        #[arg(long, action = ArgAction::SetTrue, conflicts_with_all = ["watchlist", "credentials"])]
        all: bool,

        /// Clear the local watchlist slot
        #[arg(long, action = ArgAction::SetTrue)]
        watchlist: bool,

        /// Clear stored credentials
        #[arg(long, action = ArgAction::SetTrue)]
        credentials: bool,
    },
}

#[derive(Subcommand)]
enum WatchlistCommands {
    /// Add a movie to the watchlist
    Add { id: u64 },
    /// Remove a movie from the watchlist
    Remove { id: u64 },
    /// List the watchlist (titles resolved when an API key is configured)
    List,
    /// Reconcile the local watchlist with the signed-in user's cloud record
    Sync,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks sensitive data)
    Show,

    /// Store the catalog API key (prompts when not provided)
    SetKey {
        /// Catalog API key
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Sign in: store the user identity and remote store token
    Login {
        /// Unique user identifier in the remote store
        #[arg(long)]
        uid: Option<String>,

        /// Account email, shown by `config show`
        #[arg(long)]
        email: Option<String>,

        /// Bearer token for the remote store (prompts when not provided)
        #[arg(long)]
        token: Option<String>,
    },

    /// Sign out: forget the user identity and remote store token
    Logout,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet, cli.log_file.clone())
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Browse {
            category,
            page,
            search,
            sort,
        } => browse::run_browse(&category, page, search, &sort, &output).await?,
        Commands::Details { id } => details::run_details(id, &output).await?,
        Commands::Watchlist { cmd } => match cmd {
            WatchlistCommands::Add { id } => watchlist::run_add(id, &output).await?,
            WatchlistCommands::Remove { id } => watchlist::run_remove(id, &output).await?,
            WatchlistCommands::List => watchlist::run_list(&output).await?,
            WatchlistCommands::Sync => watchlist::run_sync(&output).await?,
        },
        Commands::Config { cmd } => match cmd {
            None | Some(ConfigCommands::Show) => config::run_show(&output)?,
            Some(ConfigCommands::SetKey { api_key }) => config::run_set_key(api_key, &output)?,
            Some(ConfigCommands::Login { uid, email, token }) => {
                config::run_login(uid, email, token, &output)?
            }
            Some(ConfigCommands::Logout) => config::run_logout(&output)?,
        },
        Commands::Clear {
            all,
            watchlist,
            credentials,
        } => clear::run_clear(all, watchlist, credentials, &output)?,
    }

    Ok(())
}
