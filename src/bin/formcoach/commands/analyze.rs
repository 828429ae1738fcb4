// ABOUTME: Analyze command streaming a JSON-lines frame recording through a coaching session
// ABOUTME: Malformed lines are reported and skipped; Ctrl-C ends the session early
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::path::Path;

use anyhow::{Context, Result};
use formcoach::config::CoachConfig;
use formcoach::session::FrameInput;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::helpers::runner::SessionRunner;

/// Grade every repetition in `input`
pub async fn run(config: &CoachConfig, input: &Path, json: bool) -> Result<()> {
    let file = File::open(input)
        .await
        .with_context(|| format!("failed to open {}", input.display()))?;
    let mut lines = BufReader::new(file).lines();

    info!(input = %input.display(), level = %config.difficulty, "analyzing recording");
    let mut runner = SessionRunner::start(config, json)?;
    let mut line_number = 0_usize;
    let mut skipped = 0_usize;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }
        let frame: FrameInput = match serde_json::from_str(&line) {
            Ok(frame) => frame,
            Err(e) => {
                skipped += 1;
                warn!(line = line_number, error = %e, "skipping malformed frame");
                continue;
            }
        };
        if !runner.feed(frame)? {
            break;
        }
    }

    if skipped > 0 {
        warn!(skipped, "malformed frames skipped");
    }
    runner.finish().await?;
    Ok(())
}
