// ABOUTME: Session plumbing shared by the analyze and demo commands
// ABOUTME: Starts the event logger, wires Ctrl-C to cancellation, and prints results as they arrive
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use formcoach::config::CoachConfig;
use formcoach::events::{spawn_event_logger, EventPublisher};
use formcoach::session::{CoachSession, FrameInput, SessionSummary};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::display;

/// A running session with its event logger
pub struct SessionRunner {
    session: CoachSession,
    shutdown_tx: mpsc::Sender<()>,
    logger: JoinHandle<u64>,
    json: bool,
}

impl SessionRunner {
    /// Build and start a session from configuration
    pub fn start(config: &CoachConfig, json: bool) -> Result<Self> {
        let (publisher, events) = EventPublisher::channel(config.event_queue_capacity);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let logger = spawn_event_logger(events, shutdown_rx);

        let mut session = CoachSession::from_config(config, publisher)?;
        let cancel = session.cancel_handle();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, cancelling session");
                cancel.cancel();
            }
        });

        session.start_session();
        Ok(Self {
            session,
            shutdown_tx,
            logger,
            json,
        })
    }

    /// Feed one frame; returns false once the session has ended
    pub fn feed(&mut self, input: FrameInput) -> Result<bool> {
        let result = self.session.process_frame(input)?;
        if let Some(repetition) = &result.repetition {
            display::print_repetition(repetition, self.json)?;
        }
        Ok(!result.session_ended)
    }

    /// End the session, drain the event logger, and print the summary
    pub async fn finish(self) -> Result<SessionSummary> {
        let Self {
            mut session,
            shutdown_tx,
            logger,
            json,
        } = self;

        let summary = session.end_session()?;
        // Dropping the session closes the event channel so the logger drains and exits
        drop(session);
        let logged = logger.await?;
        drop(shutdown_tx);
        debug!(logged, "event logger finished");

        display::print_summary(&summary, json)?;
        Ok(summary)
    }
}
