//! USERS commands - List, read and delete users.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::{HumanReadable, Listing, MessageResponse, confirm, make_request, output};

/// Arguments for the users command.
#[derive(Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Subcommand)]
pub enum UsersCommand {
    /// List users
    List {
        /// Page number (1-based)
        #[arg(long)]
        page: Option<u64>,

        /// Users per page
        #[arg(long)]
        limit: Option<u64>,
    },

    /// Show one user
    Get {
        /// User ID (24 hex characters)
        id: String,
    },

    /// Delete a user
    Delete {
        /// User ID
        id: String,

        /// Skip confirmation prompt (for non-interactive use)
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// A user as returned by the server. The API never includes the password.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl HumanReadable for UserView {
    fn print_human(&self) {
        let name = self.name.as_deref().unwrap_or("(unnamed)");
        match &self.email {
            Some(email) => println!("  {} {}", name.bold(), format!("<{}>", email).dimmed()),
            None => println!("  {}", name.bold()),
        }
        println!("    {} {}", "ID:".cyan(), self.id);

        let details = [
            ("Phone:", self.phone.clone()),
            ("Roll:", self.roll.clone()),
            ("Department:", self.department.clone()),
            ("Batch:", self.batch.map(|b| b.to_string())),
            ("Position:", self.position.clone()),
            ("Picture:", self.profile_picture.clone()),
        ];
        for (label, value) in details {
            if let Some(value) = value {
                println!("    {} {}", label.cyan(), value);
            }
        }
    }
}

/// Execute a users subcommand.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: UsersArgs,
) -> Result<()> {
    match args.command {
        UsersCommand::List { page, limit } => {
            let query: Vec<_> = [("page", page), ("limit", limit)]
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, v)))
                .collect();
            let request = client.get(format!("{}/users", base_url)).query(&query);
            let response: Listing<UserView> = make_request(request).await?;
            output(&response, human)
        }
        UsersCommand::Get { id } => {
            let request = client.get(format!("{}/user/{}", base_url, id));
            let response: UserView = make_request(request).await?;
            output(&response, human)
        }
        UsersCommand::Delete { id, yes } => {
            if human && !yes && !confirm(&format!("Delete user {}?", id))? {
                eprintln!("Aborted.");
                return Ok(());
            }
            let request = client.delete(format!("{}/user/{}", base_url, id));
            let response: MessageResponse = make_request(request).await?;
            output(&response, human)
        }
    }
}
