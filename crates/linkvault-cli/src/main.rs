use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use commands::{config, delete, edit, groups, import, resolve, scrape, search};
use link_catalog_models::{ContentType, GroupKey};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "linkvault")]
#[command(about = "LinkVault - Curate download links for movies and series")]
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

    /// Also write logs to this file (rotated daily)
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List links grouped by movie or series
    #[command(long_about = "Read every link of a collection (newest first), group it by external id and show the title and poster from the metadata provider. Links without an id are listed as orphan-<id> groups.")]
    Groups {
        /// movies or series
        content_type: ContentType,
    },
    /// Search the metadata provider for ids
    Search {
        /// movies or series
        content_type: ContentType,
        /// Title to look for (at least 2 characters)
        query: String,
    },
    /// Ask the scrape worker to find links
    Scrape {
        #[command(subcommand)]
        cmd: ScrapeCommands,
    },
    /// Delete whole groups or single links
    Delete {
        #[command(subcommand)]
        cmd: DeleteCommands,
    },
    /// Change the title, url or external id of one link
    #[command(group(ArgGroup::new("change").required(true).multiple(true).args(["title", "url", "content_id", "clear_content_id"])))]
    Edit {
        /// movies or series
        content_type: ContentType,
        /// Link id
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        url: Option<String>,
        /// New external (TMDB) id
        #[arg(long, conflicts_with = "clear_content_id")]
        content_id: Option<u64>,
        /// Detach the link from its movie/series
        #[arg(long, action = ArgAction::SetTrue)]
        clear_content_id: bool,
    },
    /// Insert links from a CSV file
    #[command(long_about = "Insert links from a CSV file without a header row. Movies: movieId,title,url. Series: tvId,seriesTitle,season,episode,url. The id column may be left empty; incomplete rows are skipped.")]
    Import {
        /// movies or series
        content_type: ContentType,
        #[arg(long, value_name = "FILE")]
        csv: PathBuf,
    },
    /// Resolve a download link for ids and insert it
    Resolve {
        /// movies or series
        content_type: ContentType,
        /// External ids, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<u64>,
        /// Season for series (default 1)
        #[arg(long)]
        season: Option<u32>,
        /// Episode for series (default 1)
        #[arg(long)]
        episode: Option<u32>,
    },
    /// Show or create configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ScrapeCommands {
    /// Scrape a single movie
    Movie {
        /// TMDB movie id
        #[arg(long)]
        id: u64,
        #[arg(long)]
        title: String,
    },
    /// Scrape movie groups from the current listing
    Movies {
        /// Group keys, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<GroupKey>,
    },
    /// Scrape episodes of series groups from the current listing
    #[command(group(ArgGroup::new("selection").required(true).args(["episodes", "full_season"])))]
    Series {
        /// Group keys, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<GroupKey>,
        #[arg(long)]
        season: u32,
        /// Episode selector, e.g. "1-3,5"
        #[arg(long)]
        episodes: Option<String>,
        /// Every episode up to the configured season length
        #[arg(long, action = ArgAction::SetTrue)]
        full_season: bool,
    },
}

#[derive(Subcommand)]
enum DeleteCommands {
    /// Delete every link of the given groups
    Groups {
        /// movies or series
        content_type: ContentType,
        /// Group keys, comma separated (e.g. 603,orphan-17)
        #[arg(long, value_delimiter = ',', required = true)]
        keys: Vec<GroupKey>,
        /// Skip the confirmation prompt
        #[arg(short, long, action = ArgAction::SetTrue)]
        yes: bool,
    },
    /// Delete single links by id
    Links {
        /// movies or series
        content_type: ContentType,
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<i64>,
        /// Skip the confirmation prompt
        #[arg(short, long, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks secrets)
    Show {
        /// Show secrets unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Write a starter configuration and store credentials
    #[command(long_about = "Create config.toml in the configuration directory. On a terminal you are asked for the store URL and the API keys; otherwise a template is written that you can edit by hand.")]
    Init {
        /// Overwrite an existing configuration file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging_with_file(cli.verbose, cli.quiet, cli.log_file.clone())
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Groups { content_type } => groups::run_groups(content_type, &output).await,
        Commands::Search { content_type, query } => search::run_search(content_type, &query, &output).await,
        Commands::Scrape { cmd } => match cmd {
            ScrapeCommands::Movie { id, title } => scrape::run_scrape_movie(id, &title, &output).await,
            ScrapeCommands::Movies { ids } => scrape::run_scrape_movies(&ids, &output).await,
            ScrapeCommands::Series {
                ids,
                season,
                episodes,
                full_season,
            } => scrape::run_scrape_series(&ids, season, episodes, full_season, &output).await,
        },
        Commands::Delete { cmd } => match cmd {
            DeleteCommands::Groups { content_type, keys, yes } => {
                delete::run_delete_groups(content_type, &keys, yes, &output).await
            }
            DeleteCommands::Links { content_type, ids, yes } => {
                delete::run_delete_links(content_type, &ids, yes, &output).await
            }
        },
        Commands::Edit {
            content_type,
            id,
            title,
            url,
            content_id,
            clear_content_id,
        } => {
            let external_id = if clear_content_id { Some(None) } else { content_id.map(Some) };
            edit::run_edit(content_type, id, title, url, external_id, &output).await
        }
        Commands::Import { content_type, csv } => import::run_import(content_type, &csv, &output).await,
        Commands::Resolve {
            content_type,
            ids,
            season,
            episode,
        } => resolve::run_resolve(content_type, &ids, season, episode, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output).await,
    }
}
