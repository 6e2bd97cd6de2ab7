//! Text rendering of alerts and digests. Amounts are formatted from integers
//! with four fraction digits, truncated.

use super::BalanceAlert;
use crate::reconcile::{HumanAmount, PortfolioReport, SymbolTotal};
use crate::types::Delta;
use primitive_types::U256;
use std::fmt::Write;

/// Webhook message size limit (Discord).
pub const MESSAGE_LIMIT: usize = 2000;

pub fn format_amount(amount: U256, decimals: u8) -> String {
    let human = HumanAmount::from_minimal(amount, decimals);
    format!("{}.{:04}", human.whole, human.frac)
}

pub fn format_delta(delta: Delta, decimals: u8) -> String {
    match delta {
        Delta::Zero => format_amount(U256::zero(), decimals),
        Delta::Increase(v) => format!("+{}", format_amount(v, decimals)),
        Delta::Decrease(v) => format!("-{}", format_amount(v, decimals)),
    }
}

/// `first6...last6` for long addresses.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 15 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{head}...{tail}")
}

pub fn render_balance_alert(alert: &BalanceAlert) -> String {
    let heading = match alert.delta {
        Delta::Decrease(_) => "Balance decreased",
        _ => "Balance increased",
    };

    let mut out = String::new();
    let _ = writeln!(out, "**{heading}** on {}", alert.network);
    let _ = writeln!(
        out,
        "Account: {} ({})",
        alert.account_label,
        short_address(&alert.account_address)
    );
    let _ = writeln!(out, "Token: {} ({})", alert.symbol, alert.kind);
    let _ = writeln!(out, "Before: {} {}", format_amount(alert.before, alert.decimals), alert.symbol);
    let _ = writeln!(out, "After: {} {}", format_amount(alert.after, alert.decimals), alert.symbol);
    let _ = write!(out, "Change: {} {}", format_delta(alert.delta, alert.decimals), alert.symbol);
    out
}

fn render_total(out: &mut String, total: &SymbolTotal) {
    let _ = write!(
        out,
        "{} {}",
        format_amount(total.total, total.decimals),
        total.symbol
    );
    let net = total.change.net();
    if !net.is_zero() {
        let _ = write!(out, " ({})", format_delta(net, total.decimals));
    }
}

pub fn render_daily_summary(report: &PortfolioReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "**Daily balance summary** ({})",
        report.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(
        out,
        "{} accounts across {} networks",
        report.accounts.len(),
        report.networks
    );

    for account in &report.accounts {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "**{}** ({})",
            account.label,
            short_address(&account.address)
        );
        for holding in &account.holdings {
            let _ = write!(
                out,
                "- {}: {} {}",
                holding.network,
                format_amount(holding.balance, holding.decimals),
                holding.symbol
            );
            if !holding.delta.is_zero() {
                let _ = write!(out, " ({})", format_delta(holding.delta, holding.decimals));
            }
            let _ = writeln!(out);
        }
    }

    if !report.totals.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "**Totals**");
        for total in report.totals.values() {
            let _ = write!(out, "- ");
            render_total(&mut out, total);
            let _ = writeln!(out);
        }
    }

    out.trim_end().to_string()
}

/// Split `text` into messages of at most `limit` bytes, on line boundaries
/// where possible.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let mut line = line;
        // Lines longer than the limit are cut on char boundaries.
        while line.len() > limit {
            let mut cut = limit;
            while !line.is_char_boundary(cut) {
                cut -= 1;
            }
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.push(line[..cut].to_string());
            line = &line[cut..];
        }

        let needed = if current.is_empty() { line.len() } else { current.len() + 1 + line.len() };
        if needed > limit {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::PortfolioBuilder;
    use crate::types::{Account, Balance, Network, Token, TokenKind};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(U256::from(1_000_001_000_000u64), 10), "100.0001");
        assert_eq!(format_amount(U256::from(1_234_567u64), 6), "1.2345");
        assert_eq!(format_amount(U256::zero(), 12), "0.0000");
        assert_eq!(format_amount(U256::from(7u8), 0), "7.0000");
    }

    #[test]
    fn test_format_delta() {
        assert_eq!(format_delta(Delta::Increase(U256::from(1_000_000u32)), 10), "+0.0001");
        assert_eq!(format_delta(Delta::Decrease(U256::from(25_000u32)), 4), "-2.5000");
        assert_eq!(format_delta(Delta::Zero, 4), "0.0000");
    }

    #[test]
    fn test_short_address() {
        assert_eq!(
            short_address("15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5"),
            "15oF4u...Hr6Sp5"
        );
        assert_eq!(short_address("short"), "short");
    }

    #[test]
    fn test_render_balance_alert() {
        let alert = BalanceAlert {
            account_label: "Treasury".to_string(),
            account_address: "15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5".to_string(),
            network: "Polkadot".to_string(),
            kind: TokenKind::Native,
            symbol: "DOT".to_string(),
            decimals: 10,
            before: U256::from(1_000_000_000_000u64),
            after: U256::from(1_000_001_000_000u64),
            delta: Delta::Increase(U256::from(1_000_000u32)),
            recorded_at: Utc::now(),
        };

        let text = render_balance_alert(&alert);
        assert!(text.starts_with("**Balance increased** on Polkadot"));
        assert!(text.contains("Account: Treasury (15oF4u...Hr6Sp5)"));
        assert!(text.contains("Before: 100.0000 DOT"));
        assert!(text.contains("After: 100.0001 DOT"));
        assert!(text.ends_with("Change: +0.0001 DOT"));
    }

    #[test]
    fn test_render_daily_summary() {
        let network = Network {
            id: 1,
            name: "polkadot".to_string(),
            display_name: Some("Polkadot".to_string()),
            rpc_url: "wss://rpc.polkadot.io".to_string(),
            ss58_prefix: 0,
            decimals: 10,
            symbol: "DOT".to_string(),
            active: true,
        };
        let account = Account {
            id: 1,
            address: "15oF4uVJwmo4TdGW7VfQxNLavjCXviqxT9S1MgbjMNHr6Sp5".to_string(),
            name: Some("Treasury".to_string()),
            monitor_enabled: true,
            notify: true,
        };

        let mut builder = PortfolioBuilder::new();
        builder.record(
            &account,
            &network,
            &Token::native(&network),
            &Balance::from_native(25_000_000_000, 0, 0),
            Delta::Decrease(U256::from(5_000_000_000u64)),
        );
        let report = builder.finish(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 0).unwrap());

        let text = render_daily_summary(&report);
        assert!(text.starts_with("**Daily balance summary** (2026-01-02 03:04 UTC)"));
        assert!(text.contains("1 accounts across 1 networks"));
        assert!(text.contains("- Polkadot: 2.5000 DOT (-0.5000)"));
        assert!(text.ends_with("**Totals**\n- 2.5000 DOT (-0.5000)"));
    }

    #[test]
    fn test_split_message() {
        let text = "aaaa\nbbbb\ncccc";
        assert_eq!(split_message(text, 9), vec!["aaaa\nbbbb", "cccc"]);
        assert_eq!(split_message(text, 100), vec![text]);
        assert_eq!(split_message("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert!(split_message("", 10).is_empty());
    }
}
