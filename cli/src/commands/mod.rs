//! Command implementations for the bookshelf CLI.
//!
//! Each command module provides:
//! - Args struct for clap argument parsing
//! - execute() function that performs the command
//! - Human-readable and JSON output formatting

pub mod books;
pub mod users;

use anyhow::Result;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Common error type for HTTP requests.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
}

/// Build the HTTP client shared by every command.
pub fn build_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("bookshelf-cli/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Print output in JSON or human-readable format.
pub fn output<T: Serialize + HumanReadable>(value: &T, human: bool) -> Result<()> {
    if human {
        value.print_human();
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Trait for types that can be printed in human-readable format.
pub trait HumanReadable {
    fn print_human(&self);
}

/// Send a request and decode the JSON body, or surface the server's error.
pub async fn make_request<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, CliError> {
    let response = request.send().await?;
    let status = response.status();

    if status.is_success() {
        Ok(response.json::<T>().await?)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(server_error(status.as_u16(), &body))
    }
}

/// Build a [`CliError::Server`], preferring `error.message` from a JSON body.
fn server_error(status: u16, body: &str) -> CliError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string());

    CliError::Server { status, message }
}

/// Ask on stderr for a y/N answer.
pub fn confirm(prompt: &str) -> Result<bool> {
    use std::io::Write;

    eprint!("{} {} [y/N] ", "Warning:".yellow().bold(), prompt);
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Parse `key=value` pairs into a JSON object.
///
/// Values that parse as JSON (numbers, booleans, quoted strings) keep their
/// type; anything else is sent as a plain string.
pub fn parse_assignments(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut fields = Map::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Expected key=value, got '{}'", pair))?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("Empty field name in '{}'", pair);
        }
        let value =
            serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        fields.insert(key.to_string(), value);
    }
    Ok(fields)
}

/// Truncate a string for display, adding ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

// ============================================================================
// Shared response types
// ============================================================================

/// List response: a page, or a plain array when the server has pagination off.
#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    #[serde(rename_all = "camelCase")]
    Paged {
        items: Vec<T>,
        total_count: u64,
        total_pages: u64,
        current_page: u64,
    },
    All(Vec<T>),
}

impl<T: HumanReadable> HumanReadable for Listing<T> {
    fn print_human(&self) {
        let items = match self {
            Listing::Paged { items, .. } | Listing::All(items) => items,
        };

        if items.is_empty() {
            println!("  {}", "(No records)".dimmed());
        }
        for item in items {
            item.print_human();
            println!();
        }

        match self {
            Listing::Paged {
                total_count,
                total_pages,
                current_page,
                ..
            } => println!(
                "  {} {} (page {} of {})",
                "Total:".cyan(),
                total_count,
                current_page,
                total_pages
            ),
            Listing::All(items) => println!("  {} {}", "Total:".cyan(), items.len()),
        }
    }
}

/// Response from a create.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResponse {
    pub acknowledged: bool,
    pub inserted_id: String,
}

impl HumanReadable for InsertResponse {
    fn print_human(&self) {
        println!("{}", "Created successfully!".green().bold());
        println!();
        println!("  {} {}", "ID:".cyan(), self.inserted_id);
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCounts {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Response from a partial update.
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateResponse {
    pub message: String,
    pub result: UpdateCounts,
}

impl HumanReadable for UpdateResponse {
    fn print_human(&self) {
        if self.result.modified_count == 0 {
            println!("{}", self.message.yellow().bold());
        } else {
            println!("{}", self.message.green().bold());
        }
        println!();
        println!(
            "  {} matched {}, modified {}",
            "Result:".cyan(),
            self.result.matched_count,
            self.result.modified_count
        );
    }
}

/// Response carrying only a message, e.g. from a delete.
#[derive(Debug, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl HumanReadable for MessageResponse {
    fn print_human(&self) {
        println!("{}", self.message.green().bold());
    }
}
