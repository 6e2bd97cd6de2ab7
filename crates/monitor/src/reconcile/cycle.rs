//! One pass of balance checks over every monitored account and active network.

use super::{PortfolioBuilder, ReconcileError, ReconcileOutcome};
use crate::metrics::registry::{BALANCE_CYCLES, CHAIN_ERRORS};
use crate::state::AppState;
use crate::types::{Account, Network, Token, TokenKey};
use crate::utils::run_with_concurrency;
use chrono::Utc;
use futures::StreamExt;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub networks: usize,
    pub observations: usize,
    pub changes: usize,
    pub alerts: usize,
    /// Networks skipped after a transport failure.
    pub failed_networks: Vec<String>,
}

struct Observation {
    account: Account,
    token: Token,
    outcome: ReconcileOutcome,
}

struct NetworkPass {
    network: Network,
    observations: Vec<Observation>,
    failed: bool,
}

/// Native token first, then registry tokens, then discovered tokens, each
/// token identity kept once.
async fn tokens_for(state: &AppState, network: &Network) -> Vec<Token> {
    let mut tokens = vec![Token::native(network)];
    tokens.extend(state.registry.configured_tokens(&network.name).cloned());

    match state.ledger.tokens(network.id).await {
        Ok(discovered) => tokens.extend(discovered),
        Err(e) => {
            tracing::warn!(network = %network.name, error = %e, "Failed to read discovered tokens");
        }
    }

    let mut seen: HashSet<TokenKey> = HashSet::new();
    tokens.retain(|token| seen.insert(token.key()));
    tokens
}

async fn check_network(state: &AppState, network: Network, accounts: &[Account]) -> NetworkPass {
    let tokens = tokens_for(state, &network).await;
    let mut observations = Vec::new();

    for account in accounts {
        for token in &tokens {
            match state.reconciler.reconcile(account, &network, token).await {
                Ok(outcome) => observations.push(Observation {
                    account: account.clone(),
                    token: token.clone(),
                    outcome,
                }),
                Err(e) if e.is_transport() => {
                    CHAIN_ERRORS.with_label_values(&[network.name.as_str()]).inc();
                    tracing::warn!(
                        network = %network.name,
                        error = %e,
                        "Network unreachable, skipping until next cycle"
                    );
                    return NetworkPass {
                        network,
                        observations,
                        failed: true,
                    };
                }
                Err(e) => log_skipped(&network, account, token, &e),
            }
        }
    }

    NetworkPass {
        network,
        observations,
        failed: false,
    }
}

fn log_skipped(network: &Network, account: &Account, token: &Token, error: &ReconcileError) {
    tracing::warn!(
        network = %network.name,
        account = %account.label(),
        symbol = %token.symbol,
        error = %error,
        "Skipping balance"
    );
}

/// Reconcile every (account, network, token) triple once and send the
/// portfolio digest.
pub async fn run_balance_cycle(state: &AppState) -> CycleSummary {
    let started = std::time::Instant::now();
    BALANCE_CYCLES.inc();

    let accounts: Vec<Account> = state.registry.monitored_accounts().cloned().collect();
    let networks: Vec<Network> = state.registry.active_networks().cloned().collect();
    tracing::info!(
        accounts = accounts.len(),
        networks = networks.len(),
        "Starting balance cycle"
    );

    let tasks = networks
        .into_iter()
        .map(|network| check_network(state, network, &accounts));
    let passes: Vec<NetworkPass> =
        run_with_concurrency(state.config.schedule.max_concurrent_networks, tasks)
            .collect()
            .await;

    let mut summary = CycleSummary::default();
    let mut portfolio = PortfolioBuilder::new();
    for pass in &passes {
        summary.networks += 1;
        if pass.failed {
            summary.failed_networks.push(pass.network.name.clone());
        }
        for obs in &pass.observations {
            summary.observations += 1;
            if obs.outcome.change.is_some() {
                summary.changes += 1;
            }
            if obs.outcome.alerted {
                summary.alerts += 1;
            }
            portfolio.record(
                &obs.account,
                &pass.network,
                &obs.token,
                &obs.outcome.balance,
                obs.outcome.delta,
            );
        }
    }
    summary.failed_networks.sort();

    let now = Utc::now();
    if state.reconciler.policy().enabled {
        let report = portfolio.finish(now);
        if let Err(e) = state.notifier.send_daily_summary(&report).await {
            tracing::warn!(error = %e, "Failed to deliver daily summary");
        }
    }

    *state.last_balance_cycle.write().await = Some(now);
    tracing::info!(
        observations = summary.observations,
        changes = summary.changes,
        alerts = summary.alerts,
        failed = summary.failed_networks.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Balance cycle complete"
    );

    summary
}
