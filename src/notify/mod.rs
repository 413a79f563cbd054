// Notification sinks for opportunities that clear the reporting gate
use std::sync::Arc;

use tracing::info;

use crate::config::TelegramSettings;
use crate::engine::types::Opportunity;

pub mod telegram;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("telegram api error: {0}")]
    Api(String),
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, opportunity: &Opportunity) -> Result<(), NotifyError>;
}

pub type SharedNotifier = Arc<dyn Notifier>;

/// Human readable one-liner used by every sink.
pub fn format_message(o: &Opportunity) -> String {
    format!(
        "profit: {:.4} with volume: {:.4} - buy at {:.4} ({}) sell at {:.4} ({}) ~{:.2}%",
        o.profit, o.volume, o.buy_price, o.ask_venue, o.sell_price, o.bid_venue, o.percent_spread
    )
}

/// Writes opportunities to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, opportunity: &Opportunity) -> Result<(), NotifyError> {
        info!(
            ask_venue = %opportunity.ask_venue,
            bid_venue = %opportunity.bid_venue,
            profit = %opportunity.profit,
            volume = %opportunity.volume,
            percent_spread = %opportunity.percent_spread,
            "{}",
            format_message(opportunity)
        );
        Ok(())
    }
}

pub async fn build_notifier(
    settings: &TelegramSettings,
    client: reqwest::Client,
) -> Result<SharedNotifier, NotifyError> {
    if !settings.enabled {
        info!("Telegram disabled, opportunities go to the log");
        return Ok(Arc::new(LogNotifier));
    }
    let bot = telegram::TelegramNotifier::connect(settings, client).await?;
    Ok(Arc::new(bot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_message() {
        let o = Opportunity {
            ask_venue: "gemini".into(),
            bid_venue: "bitfinex".into(),
            profit: dec!(4),
            volume: dec!(1.5),
            buy_price: dec!(101),
            sell_price: dec!(103),
            percent_spread: dec!(2.6402640264),
        };
        assert_eq!(
            format_message(&o),
            "profit: 4.0000 with volume: 1.5000 - buy at 101.0000 (gemini) sell at 103.0000 (bitfinex) ~2.64%"
        );
    }
}
