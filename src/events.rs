// ABOUTME: Coaching events handed to feedback collaborators over a bounded channel
// ABOUTME: Publishing never blocks the frame path; a full queue drops the event and counts it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use formcoach_core::models::{DifficultyLevel, MovementPhase};
use formcoach_intelligence::{DiscardReason, RepetitionResult};
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Something a feedback renderer, recorder or UI may react to
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CoachEvent {
    /// A session began
    SessionStarted {
        /// Session id
        session_id: Uuid,
        /// Difficulty level at start
        level: DifficultyLevel,
        /// Start time
        started_at: DateTime<Utc>,
    },
    /// The movement phase changed
    PhaseChanged {
        /// Session id
        session_id: Uuid,
        /// Previous phase
        from: MovementPhase,
        /// New phase
        to: MovementPhase,
        /// Completed repetitions so far
        rep_count: u32,
        /// Frame timestamp in seconds
        timestamp: f64,
    },
    /// A repetition was graded
    RepetitionCompleted {
        /// Session id
        session_id: Uuid,
        /// Graded result
        result: Box<RepetitionResult>,
    },
    /// A repetition candidate was dropped without grading
    RepetitionDiscarded {
        /// Session id
        session_id: Uuid,
        /// Why it was dropped
        reason: DiscardReason,
    },
    /// A configuration change was rejected and the previous one kept
    ConfigRejected {
        /// Session id
        session_id: Uuid,
        /// Validation error text
        reason: String,
    },
    /// The session ended
    SessionEnded {
        /// Session id
        session_id: Uuid,
        /// Graded repetitions
        reps_completed: u32,
        /// Mean composite score, if any repetition was graded
        average_score: Option<f64>,
        /// True when ended through cancellation
        cancelled: bool,
    },
}

impl CoachEvent {
    /// Short event name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "session_started",
            Self::PhaseChanged { .. } => "phase_changed",
            Self::RepetitionCompleted { .. } => "repetition_completed",
            Self::RepetitionDiscarded { .. } => "repetition_discarded",
            Self::ConfigRejected { .. } => "config_rejected",
            Self::SessionEnded { .. } => "session_ended",
        }
    }
}

/// Sending half of the event channel
#[derive(Debug, Clone, Default)]
pub struct EventPublisher {
    sender: Option<mpsc::Sender<CoachEvent>>,
    dropped: Arc<AtomicU64>,
}

impl EventPublisher {
    /// Bounded channel with `capacity` slots (at least one)
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<CoachEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                sender: Some(sender),
                dropped: Arc::new(AtomicU64::new(0)),
            },
            receiver,
        )
    }

    /// Publisher that discards everything silently
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Offer an event without waiting; returns false when it was dropped
    pub fn publish(&self, event: CoachEvent) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };
        match sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(event = event.name(), dropped, "event queue full, dropping event");
                false
            }
            Err(TrySendError::Closed(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                debug!(event = event.name(), "event receiver closed");
                false
            }
        }
    }

    /// Events dropped because the queue was full or closed
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Drain events into `tracing` until the channel closes or shutdown is signalled
///
/// Resolves to the number of events logged.
#[must_use]
pub fn spawn_event_logger(
    mut events: mpsc::Receiver<CoachEvent>,
    mut shutdown: mpsc::Receiver<()>,
) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut logged = 0_u64;
        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        debug!("event channel closed");
                        break;
                    };
                    log_event(&event);
                    logged += 1;
                }
                _ = shutdown.recv() => {
                    debug!("event logger received shutdown signal");
                    break;
                }
            }
        }
        logged
    })
}

fn log_event(event: &CoachEvent) {
    match event {
        CoachEvent::SessionStarted { session_id, level, .. } => {
            info!(%session_id, %level, "session started");
        }
        CoachEvent::PhaseChanged { from, to, rep_count, .. } => {
            debug!(%from, %to, rep_count, "phase changed");
        }
        CoachEvent::RepetitionCompleted { result, .. } => {
            info!(
                rep = result.rep_number,
                score = result.score,
                assessment = ?result.assessment,
                cues = ?result.recommendations,
                "repetition feedback"
            );
        }
        CoachEvent::RepetitionDiscarded { reason, .. } => {
            info!(?reason, "repetition discarded");
        }
        CoachEvent::ConfigRejected { reason, .. } => {
            warn!(%reason, "configuration change rejected");
        }
        CoachEvent::SessionEnded {
            session_id,
            reps_completed,
            average_score,
            cancelled,
        } => {
            info!(%session_id, reps_completed, ?average_score, cancelled, "session ended");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ended() -> CoachEvent {
        CoachEvent::SessionEnded {
            session_id: Uuid::new_v4(),
            reps_completed: 0,
            average_score: None,
            cancelled: false,
        }
    }

    #[test]
    fn test_full_queue_drops_and_counts() {
        let (publisher, _receiver) = EventPublisher::channel(1);
        assert!(publisher.publish(ended()));
        assert!(!publisher.publish(ended()));
        assert_eq!(publisher.dropped_count(), 1);
    }

    #[test]
    fn test_disabled_publisher_is_silent() {
        let publisher = EventPublisher::disabled();
        assert!(!publisher.publish(ended()));
        assert_eq!(publisher.dropped_count(), 0);
    }
}
