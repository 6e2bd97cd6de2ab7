// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod app;
pub mod chain;
pub mod codec;
pub mod consts;
pub mod discovery;
pub mod handlers;
pub mod ledger;
pub mod logging;
pub mod metrics;
pub mod notify;
pub mod reconcile;
pub mod registry;
pub mod resolver;
pub mod routes;
pub mod scheduler;
pub mod state;
pub mod storage;
pub mod types;
pub mod utils;
