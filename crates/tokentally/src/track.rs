// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tokentally track` command implementation.

use std::sync::Arc;
use std::time::Duration;

use tokentally_config::TallyConfig;
use tokentally_core::TallyError;
use tokentally_openrouter::OpenRouterClient;
use tokentally_transform::{CostTracker, GenerationId, Record, TrackMode, TrackOptions};

use crate::io::{read_records, write_records};
use crate::{IoArgs, TrackCommand};

impl From<TrackCommand> for TrackMode {
    fn from(command: TrackCommand) -> Self {
        match command {
            TrackCommand::FromInput => TrackMode::FromInput,
            TrackCommand::Generation {
                generation_id: Some(id),
                ..
            } => TrackMode::Generation(GenerationId::Fixed(id)),
            TrackCommand::Generation { id_field, .. } => {
                TrackMode::Generation(GenerationId::Field(id_field))
            }
            TrackCommand::Manual {
                model,
                input_tokens,
                output_tokens,
            } => TrackMode::Manual {
                model,
                input_tokens,
                output_tokens,
            },
        }
    }
}

pub async fn run_track(
    config: &TallyConfig,
    timeout: Duration,
    io: &IoArgs,
    command: TrackCommand,
    options: TrackOptions,
) -> Result<(), TallyError> {
    let mode = TrackMode::from(command);
    let client = Arc::new(OpenRouterClient::from_config(&config.openrouter, timeout)?);

    // Manual counts need no input; without --input they price one empty record.
    let records = match (&mode, io.input.as_deref()) {
        (TrackMode::Manual { .. }, None) => vec![Record::new()],
        (_, input) => read_records(input)?,
    };

    let tracked = CostTracker::new(client.clone(), client, mode, options)
        .run(records)
        .await?;
    write_records(&tracked, io.ndjson)
}
