use crate::prelude::*;
use clap::Parser;
use std::sync::Arc;

mod assembler;
mod browse;
mod cache;
mod catalog;
mod client;
mod error;
mod list;
mod prelude;
mod show;
mod types;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Browse the Pokémon catalog from the terminal"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// PokéAPI base URL
    #[clap(
        long,
        env = "POKECAT_BASE_URL",
        global = true,
        default_value = client::POKEAPI_BASE
    )]
    base_url: String,

    /// Whether to display additional information.
    #[clap(long, env = "POKECAT_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// List one page of the catalog, optionally filtered by name or type
    List(crate::list::ListOptions),

    /// Show the details of one Pokémon
    Show(crate::show::ShowOptions),

    /// List the available types
    Types(crate::types::TypesOptions),

    /// Browse the catalog interactively
    Browse(crate::browse::BrowseOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    let client = client::PokeApiClient::new(&app.global.base_url)?;
    log::debug!("Using catalog at {}", client.base_url());
    let catalog = Arc::new(catalog::Catalog::new(client));

    match app.command {
        SubCommands::List(options) => crate::list::run(options, &*catalog, app.global).await,
        SubCommands::Show(options) => crate::show::run(options, &*catalog, app.global).await,
        SubCommands::Types(options) => crate::types::run(options, &*catalog, app.global).await,
        SubCommands::Browse(options) => crate::browse::run(options, catalog, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
