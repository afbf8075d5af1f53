// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tokentally price` command implementation.

use std::sync::Arc;
use std::time::Duration;

use tokentally_config::TallyConfig;
use tokentally_core::TallyError;
use tokentally_openrouter::OpenRouterClient;
use tokentally_transform::PriceCalculator;

use crate::io::{read_records, write_records};
use crate::IoArgs;

pub async fn run_price(config: &TallyConfig, timeout: Duration, io: &IoArgs) -> Result<(), TallyError> {
    let client = OpenRouterClient::from_config(&config.openrouter, timeout)?;
    let records = read_records(io.input.as_deref())?;
    let priced = PriceCalculator::new(Arc::new(client)).run(records).await?;
    write_records(&priced, io.ndjson)
}
