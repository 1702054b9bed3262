use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;

/// Long-poll wait for inbound updates, in seconds.
const UPDATES_TIMEOUT_SECS: u64 = 30;

/// Static reply to /start.
pub const WELCOME_TEXT: &str = "👋 Welcome to the *Hyperliquid Wallet Tracker Bot*!\n\n\
This bot monitors Hyperliquid Perp and Spot activity in real time.\n\n\
Here's what I can do:\n\
• 🟢 Spot Buy / 🔴 Spot Sell notifications\n\
• 🟢 Perp Buy / 🔴 Perp Sell notifications\n\
• 📥 Order Placed alerts (Perp & Spot)\n\
• ❌ Order Cancelled alerts\n\n\
🧠 *Commands*:\n\
• /add `<wallet_address>` – Start tracking a wallet\n\
• /remove `<wallet_address>` – Stop tracking a wallet\n\
• /list – Show tracked wallets\n\n\
Enjoy your alpha feed 👁";

/// A recognized chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Add(String),
    Remove(String),
    List,
}

/// Parse a message text into a command.
///
/// Tolerates the `@botname` suffix Telegram appends in group chats.
/// Anything unrecognized, including /add and /remove without an argument,
/// is `None` and gets ignored.
pub fn parse_command(text: &str) -> Option<Command> {
    let mut parts = text.split_whitespace();
    let head = parts.next()?;
    let name = head.split('@').next().unwrap_or(head);
    match name {
        "/start" => Some(Command::Start),
        "/list" => Some(Command::List),
        "/add" => parts.next().map(|a| Command::Add(a.to_string())),
        "/remove" => parts.next().map(|a| Command::Remove(a.to_string())),
        _ => None,
    }
}

/// Minimal Telegram Bot API client over plain HTTP.
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

/// One inbound update from getUpdates.
#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

impl TelegramClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        // The request timeout has to outlast the long-poll wait.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(UPDATES_TIMEOUT_SECS + 10))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            token: token.into(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// Send a text message to a chat. `markdown` marks the text as
    /// Markdown-formatted; the receiving side may render or strip it.
    pub async fn send_message(&self, chat_id: &str, text: &str, markdown: bool) -> Result<()> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if markdown {
            body["parse_mode"] = json!("Markdown");
        }
        let resp: ApiResponse<serde_json::Value> = self.call("sendMessage", &body).await?;
        if !resp.ok {
            anyhow::bail!(
                "sendMessage refused: {}",
                resp.description.as_deref().unwrap_or("no description")
            );
        }
        Ok(())
    }

    /// Long-poll for updates with ids at or past `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let body = json!({
            "offset": offset,
            "timeout": UPDATES_TIMEOUT_SECS,
            "allowed_updates": ["message"],
        });
        let resp: ApiResponse<Vec<Update>> = self.call("getUpdates", &body).await?;
        if !resp.ok {
            anyhow::bail!(
                "getUpdates refused: {}",
                resp.description.as_deref().unwrap_or("no description")
            );
        }
        Ok(resp.result.unwrap_or_default())
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<ApiResponse<T>> {
        self.http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .with_context(|| format!("{method} request failed"))?
            .json()
            .await
            .with_context(|| format!("malformed {method} response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_commands() {
        assert_eq!(parse_command("/start"), Some(Command::Start));
        assert_eq!(parse_command("/list"), Some(Command::List));
    }

    #[test]
    fn parses_commands_with_argument() {
        assert_eq!(
            parse_command("/add 0xAbC123"),
            Some(Command::Add("0xAbC123".to_string()))
        );
        assert_eq!(
            parse_command("/remove 0xabc"),
            Some(Command::Remove("0xabc".to_string()))
        );
    }

    #[test]
    fn tolerates_bot_name_suffix() {
        assert_eq!(
            parse_command("/add@tracker_bot 0xabc"),
            Some(Command::Add("0xabc".to_string()))
        );
        assert_eq!(parse_command("/list@tracker_bot"), Some(Command::List));
    }

    #[test]
    fn missing_argument_is_ignored() {
        assert_eq!(parse_command("/add"), None);
        assert_eq!(parse_command("/remove"), None);
    }

    #[test]
    fn non_commands_are_ignored() {
        assert_eq!(parse_command("hello"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("/unknown arg"), None);
    }

    #[test]
    fn update_deserializes_without_message() {
        let update: Update =
            serde_json::from_str(r#"{"update_id": 5}"#).expect("valid update JSON");
        assert_eq!(update.update_id, 5);
        assert!(update.message.is_none());
    }
}
