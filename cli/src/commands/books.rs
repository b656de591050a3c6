//! BOOKS commands - List, read, create, update and delete books.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::{
    HumanReadable, InsertResponse, Listing, MessageResponse, UpdateResponse, confirm,
    make_request, output, parse_assignments, truncate,
};

/// Arguments for the books command.
#[derive(Args)]
pub struct BooksArgs {
    #[command(subcommand)]
    pub command: BooksCommand,
}

#[derive(Subcommand)]
pub enum BooksCommand {
    /// List books
    List {
        /// Page number (1-based)
        #[arg(long)]
        page: Option<u64>,

        /// Books per page
        #[arg(long)]
        limit: Option<u64>,
    },

    /// Show one book
    Get {
        /// Book ID (24 hex characters)
        id: String,
    },

    /// Add a book
    Create(CreateBookArgs),

    /// Change fields of a book
    Update {
        /// Book ID
        id: String,

        /// Field assignment, e.g. --set availableCopies=2 (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE", required = true)]
        set: Vec<String>,
    },

    /// Delete a book
    Delete {
        /// Book ID
        id: String,

        /// Skip confirmation prompt (for non-interactive use)
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Args)]
pub struct CreateBookArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub author: String,

    #[arg(long)]
    pub publisher: Option<String>,

    #[arg(long)]
    pub isbn: Option<String>,

    #[arg(long)]
    pub edition: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub language: Option<String>,

    #[arg(long)]
    pub total_copies: Option<i64>,

    /// Must not exceed --total-copies
    #[arg(long)]
    pub available_copies: Option<i64>,

    #[arg(long)]
    pub publication_year: Option<i64>,

    /// Cover image URL
    #[arg(long)]
    pub cover_image: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
}

impl CreateBookArgs {
    /// Request body with only the fields that were given.
    fn into_body(self) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("title".to_string(), json!(self.title));
        body.insert("author".to_string(), json!(self.author));

        let optional = [
            ("publisher", self.publisher.map(Value::from)),
            ("isbn", self.isbn.map(Value::from)),
            ("edition", self.edition.map(Value::from)),
            ("category", self.category.map(Value::from)),
            ("language", self.language.map(Value::from)),
            ("totalCopies", self.total_copies.map(Value::from)),
            ("availableCopies", self.available_copies.map(Value::from)),
            ("publicationYear", self.publication_year.map(Value::from)),
            ("coverImage", self.cover_image.map(Value::from)),
            ("description", self.description.map(Value::from)),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                body.insert(key.to_string(), value);
            }
        }
        body
    }
}

/// A book as returned by the server.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_copies: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_copies: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl HumanReadable for BookView {
    fn print_human(&self) {
        let title = self.title.as_deref().unwrap_or("(untitled)");
        let author = self.author.as_deref().unwrap_or("unknown author");
        println!("  {} {}", title.bold(), format!("by {}", author).dimmed());
        println!("    {} {}", "ID:".cyan(), self.id);

        if let (Some(available), Some(total)) = (self.available_copies, self.total_copies) {
            println!("    {} {}/{} available", "Copies:".cyan(), available, total);
        } else if let Some(total) = self.total_copies {
            println!("    {} {}", "Copies:".cyan(), total);
        }

        let details = [
            ("Publisher:", self.publisher.clone()),
            ("ISBN:", self.isbn.clone()),
            ("Edition:", self.edition.clone()),
            ("Category:", self.category.clone()),
            ("Language:", self.language.clone()),
            ("Year:", self.publication_year.map(|y| y.to_string())),
            ("Cover:", self.cover_image.clone()),
        ];
        for (label, value) in details {
            if let Some(value) = value {
                println!("    {} {}", label.cyan(), value);
            }
        }

        if let Some(description) = &self.description {
            println!("    {} {}", "About:".cyan(), truncate(description, 70));
        }
    }
}

/// Execute a books subcommand.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: BooksArgs,
) -> Result<()> {
    match args.command {
        BooksCommand::List { page, limit } => {
            let mut query = Vec::new();
            if let Some(page) = page {
                query.push(("page", page));
            }
            if let Some(limit) = limit {
                query.push(("limit", limit));
            }
            let request = client.get(format!("{}/books", base_url)).query(&query);
            let response: Listing<BookView> = make_request(request).await?;
            output(&response, human)
        }
        BooksCommand::Get { id } => {
            let request = client.get(format!("{}/book/{}", base_url, id));
            let response: BookView = make_request(request).await?;
            output(&response, human)
        }
        BooksCommand::Create(create) => {
            let request = client
                .post(format!("{}/book", base_url))
                .json(&create.into_body());
            let response: InsertResponse = make_request(request).await?;
            output(&response, human)
        }
        BooksCommand::Update { id, set } => {
            let fields = parse_assignments(&set)?;
            let request = client
                .patch(format!("{}/book/{}", base_url, id))
                .json(&fields);
            let response: UpdateResponse = make_request(request).await?;
            output(&response, human)
        }
        BooksCommand::Delete { id, yes } => {
            if human && !yes && !confirm(&format!("Delete book {}?", id))? {
                eprintln!("Aborted.");
                return Ok(());
            }
            let request = client.delete(format!("{}/book/{}", base_url, id));
            let response: MessageResponse = make_request(request).await?;
            output(&response, human)
        }
    }
}
