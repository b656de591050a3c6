//! Command-line client for the Bookshelf API.
//!
//! - books: list, get, create, update and delete books
//! - users: list, get and delete users
//!
//! Configuration via environment:
//! - BOOKSHELF_URL: Base URL of the server (default: http://localhost:5000)

mod commands;

use clap::{Parser, Subcommand};

use commands::{books::BooksArgs, users::UsersArgs};

/// Bookshelf CLI
///
/// Prints JSON by default; pass --human for formatted output.
#[derive(Parser)]
#[command(name = "bookshelf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output human-readable formatted text instead of JSON
    #[arg(long, global = true)]
    human: bool,

    /// Bookshelf server URL
    #[arg(
        long,
        env = "BOOKSHELF_URL",
        default_value = "http://localhost:5000",
        global = true
    )]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with books
    Books(BooksArgs),

    /// Work with users
    Users(UsersArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let base_url = cli.url.trim_end_matches('/');

    let client = match commands::build_client() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Books(args) => commands::books::execute(&client, base_url, cli.human, args).await,
        Commands::Users(args) => commands::users::execute(&client, base_url, cli.human, args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
