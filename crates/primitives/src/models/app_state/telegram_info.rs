use eyre::{eyre, Report};
use secrecy::SecretString;
use std::env;

#[derive(Debug, Clone)]
pub struct TelegramInfo {
    pub bot_token: SecretString,
}

impl TelegramInfo {
    pub fn new() -> Result<Self, Report> {
        let bot_token =
            env::var("TELEGRAM_BOT_TOKEN").map_err(|_| eyre!("TELEGRAM_BOT_TOKEN must be set"))?;
        Ok(Self {
            bot_token: SecretString::from(bot_token),
        })
    }
}
