use std::time::Duration;

use mission_core::config::MailSourceConfig;
use mission_core::Fetched;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SourceError};
use crate::runner::{run, CommandSpec};
use crate::sanitize::sanitize_arg;

pub const DEFAULT_QUERY: &str = "is:unread";
pub const DEFAULT_MAX: u32 = 20;
const UNREAD_LABEL: &str = "UNREAD";

/// One message as shown in the inbox widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailMessage {
    pub id: String,
    pub thread_id: String,
    pub label_ids: Vec<String>,
    pub snippet: String,
    pub subject: String,
    pub from: String,
    pub date: String,
    pub is_unread: bool,
}

/// Searches and relabels mail through a CLI such as `gog gmail`.
pub struct MailReader {
    command: String,
    account: Option<String>,
    timeout: Duration,
}

impl MailReader {
    pub fn new(config: &MailSourceConfig, timeout: Duration) -> Self {
        Self {
            command: config.command.clone(),
            account: config.account.clone(),
            timeout,
        }
    }

    fn with_account(&self, mut spec: CommandSpec) -> CommandSpec {
        if let Some(account) = &self.account {
            spec = spec
                .arg("--account")
                .arg(account)
                .env("GOG_ACCOUNT", account);
        }
        spec
    }

    fn search_spec(&self, query: Option<&str>, max: Option<u32>) -> CommandSpec {
        let query = query
            .map(sanitize_arg)
            .filter(|q| !q.is_empty())
            .unwrap_or_else(|| DEFAULT_QUERY.to_string());
        let max = max.filter(|m| *m > 0).unwrap_or(DEFAULT_MAX);
        let spec = CommandSpec::new(&self.command).args([
            "gmail".to_string(),
            "messages".to_string(),
            "search".to_string(),
            query,
            "--max".to_string(),
            max.to_string(),
        ]);
        self.with_account(spec).arg("--json")
    }

    /// Messages matching `query` (default `is:unread`), at most `max` (default 20).
    pub async fn search(&self, query: Option<&str>, max: Option<u32>) -> Fetched<MailMessage> {
        let result = async {
            let stdout = run(&self.search_spec(query, max), self.timeout).await?;
            parse_messages(&stdout)
        }
        .await;

        match result {
            Ok(messages) => {
                info!(source = "mail", count = messages.len(), "mail searched");
                Fetched::ok(messages)
            }
            Err(e) => {
                warn!(source = "mail", error = %e, "mail search failed");
                Fetched::failed()
            }
        }
    }

    fn modify_spec(&self, message_id: &str, read: bool) -> CommandSpec {
        let action = if read { "--remove-labels" } else { "--add-labels" };
        let spec = CommandSpec::new(&self.command).args([
            "gmail",
            "messages",
            "modify",
            message_id,
            action,
            UNREAD_LABEL,
        ]);
        self.with_account(spec)
    }

    /// Mark a message read (drop `UNREAD`) or unread (add it back).
    pub async fn set_read(&self, message_id: &str, read: bool) -> Result<()> {
        validate_message_id(message_id)?;
        run(&self.modify_spec(message_id, read), self.timeout).await?;
        info!(source = "mail", %message_id, read, "mail labels updated");
        Ok(())
    }
}

/// Message ids are opaque ASCII tokens that never start with a dash.
pub fn validate_message_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(SourceError::InvalidInput("message id is required".into()));
    }
    let well_formed = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !well_formed || id.starts_with('-') {
        return Err(SourceError::InvalidInput(format!("invalid message id: {id:?}")));
    }
    Ok(())
}

#[derive(Deserialize)]
struct MessagesPayload {
    #[serde(default)]
    messages: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
    id: String,
    #[serde(default)]
    thread_id: String,
    #[serde(default)]
    label_ids: Vec<String>,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    payload: Option<WirePayload>,
}

#[derive(Deserialize, Default)]
struct WirePayload {
    #[serde(default)]
    headers: Vec<WireHeader>,
}

#[derive(Deserialize)]
struct WireHeader {
    name: String,
    #[serde(default)]
    value: String,
}

pub fn parse_messages(stdout: &[u8]) -> Result<Vec<MailMessage>> {
    let payload: MessagesPayload =
        serde_json::from_slice(stdout).map_err(|e| SourceError::Malformed(e.to_string()))?;

    Ok(payload
        .messages
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<WireMessage>(value) {
            Ok(msg) => Some(msg.into_message()),
            Err(e) => {
                warn!(source = "mail", error = %e, "skipping undecodable message");
                None
            }
        })
        .collect())
}

impl WireMessage {
    fn into_message(self) -> MailMessage {
        let payload = self.payload.unwrap_or_default();
        let header = |name: &str| {
            payload
                .headers
                .iter()
                .find(|h| h.name == name)
                .map(|h| h.value.clone())
                .filter(|v| !v.is_empty())
        };
        let subject = header("Subject").unwrap_or_else(|| "No Subject".to_string());
        let from = header("From").unwrap_or_else(|| "Unknown".to_string());
        let date = header("Date").unwrap_or_default();
        let is_unread = self.label_ids.iter().any(|l| l == UNREAD_LABEL);

        MailMessage {
            id: self.id,
            thread_id: self.thread_id,
            label_ids: self.label_ids,
            snippet: self.snippet,
            subject,
            from: display_sender(&from),
            date,
            is_unread,
        }
    }
}

/// `"Jane Doe <jane@example.com>"` becomes `"Jane Doe"`.
fn display_sender(from: &str) -> String {
    match (from.find('<'), from.find('>')) {
        (Some(open), Some(close)) if open < close => {
            format!("{}{}", &from[..open], &from[close + 1..]).trim().to_string()
        }
        _ => from.trim().to_string(),
    }
}
