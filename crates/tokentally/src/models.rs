// SPDX-FileCopyrightText: 2026 Tokentally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tokentally models` command implementation.
//!
//! Prints the priced model catalog, one model per line with prompt and
//! completion prices per million tokens.

use std::io::IsTerminal;
use std::time::Duration;

use tokentally_config::TallyConfig;
use tokentally_core::TallyError;
use tokentally_openrouter::OpenRouterClient;
use tokentally_transform::{list_models, ModelSummary};

/// Run the `tokentally models` command.
///
/// If `--json` is passed, outputs the list as JSON for scripting.
/// If `--plain` is passed or stdout is not a TTY, disables colors.
pub async fn run_models(
    config: &TallyConfig,
    timeout: Duration,
    json: bool,
    plain: bool,
) -> Result<(), TallyError> {
    let client = OpenRouterClient::from_config(&config.openrouter, timeout)?;
    let models = list_models(&client).await?;

    if json {
        let text = serde_json::to_string_pretty(&models)
            .map_err(|e| TallyError::Internal(format!("failed to serialize models: {e}")))?;
        println!("{text}");
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        for model in &models {
            println!("{}", render_line(model, use_color));
        }
    }
    Ok(())
}

fn format_per_million(price: f64) -> String {
    if price == 0.0 {
        "free".to_string()
    } else {
        format!("${price:.2}/M")
    }
}

fn render_line(model: &ModelSummary, use_color: bool) -> String {
    let prompt = format_per_million(model.prompt_per_million);
    let completion = format_per_million(model.completion_per_million);
    if use_color {
        use colored::Colorize;
        format!(
            "{}  prompt {}  completion {}",
            model.label.bold(),
            prompt.green(),
            completion.green()
        )
    } else {
        format!("{}  prompt {prompt}  completion {completion}", model.label)
    }
}
