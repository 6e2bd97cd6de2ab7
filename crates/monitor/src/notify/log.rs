use super::format::{render_balance_alert, render_daily_summary};
use super::{BalanceAlert, Notifier, NotifyError};
use crate::reconcile::PortfolioReport;
use async_trait::async_trait;

/// Writes alerts and digests to the `alerts` log target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_balance_change(&self, alert: &BalanceAlert) -> Result<(), NotifyError> {
        tracing::info!(
            target: "alerts",
            network = %alert.network,
            account = %alert.account_label,
            symbol = %alert.symbol,
            "{}",
            render_balance_alert(alert)
        );
        Ok(())
    }

    async fn send_daily_summary(&self, report: &PortfolioReport) -> Result<(), NotifyError> {
        tracing::info!(
            target: "alerts",
            accounts = report.accounts.len(),
            "{}",
            render_daily_summary(report)
        );
        Ok(())
    }
}
