use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::event_sourcing::core::{Aggregate, ClassifiedError, DomainEvent, ErrorClass, wrap_events};
use crate::event_sourcing::store::{EventStore, Snapshot, SnapshotStore, StoreError};
use crate::metrics::Metrics;
use crate::utils::retry::{retry_on_transient, IsTransient, RetryConfig, RetryResult};

use super::aggregate::UserAggregate;
use super::commands::UserCommand;
use super::errors::UserError;
use super::events::UserEvent;
use super::projection::UserState;

// ============================================================================
// User Command Handler
// ============================================================================
//
// Orchestrates one unit of work per command:
// Snapshot + Events → Aggregate → Validate → Event Store → Snapshot
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Command rejected: {0}")]
    Rejected(UserError),

    #[error("Internal fault: {0}")]
    Internal(UserError),

    #[error("Failed to rebuild user {user_id}: {reason}")]
    Replay { user_id: String, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Gave up after {attempts} attempts: {source}")]
    RetriesExhausted { attempts: u32, source: StoreError },
}

impl CommandError {
    fn from_user_error(error: UserError) -> Self {
        if error.class().is_rejection() {
            CommandError::Rejected(error)
        } else {
            CommandError::Internal(error)
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            CommandError::Rejected(e) => e.class(),
            _ => ErrorClass::InternalFault,
        }
    }
}

impl IsTransient for CommandError {
    fn is_transient(&self) -> bool {
        matches!(self, CommandError::Store(e) if e.is_conflict())
    }
}

#[derive(Debug, Clone)]
pub struct HandlerConfig {
    pub retry: RetryConfig,
    /// Persist a snapshot whenever the version crosses a multiple of this; 0 disables
    pub snapshot_every: u64,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            snapshot_every: 10,
        }
    }
}

pub struct UserCommandHandler {
    event_store: Arc<dyn EventStore<UserEvent>>,
    snapshot_store: Arc<dyn SnapshotStore<UserState>>,
    metrics: Option<Arc<Metrics>>,
    config: HandlerConfig,
}

impl UserCommandHandler {
    pub fn new(
        event_store: Arc<dyn EventStore<UserEvent>>,
        snapshot_store: Arc<dyn SnapshotStore<UserState>>,
    ) -> Self {
        Self {
            event_store,
            snapshot_store,
            metrics: None,
            config: HandlerConfig::default(),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_config(mut self, config: HandlerConfig) -> Self {
        self.config = config;
        self
    }

    /// Handle a command and persist resulting events, returning the new state
    pub async fn handle(
        &self,
        user_id: &str,
        command: UserCommand,
        correlation_id: Uuid,
    ) -> Result<UserState, CommandError> {
        let started = Instant::now();
        let command_type = command.command_type();
        let command = &command;

        let result = retry_on_transient(self.config.retry.clone(), move |attempt| {
            if attempt > 1 {
                if let Some(metrics) = &self.metrics {
                    metrics.record_retry_attempt(command_type, attempt);
                }
            }
            self.try_handle(user_id, command, correlation_id)
        })
        .await;

        let result = match result {
            RetryResult::Success(state) => Ok(state),
            RetryResult::PermanentFailure(error) => Err(error),
            RetryResult::Failed { attempts, error } => match error {
                CommandError::Store(source) => Err(CommandError::RetriesExhausted { attempts, source }),
                other => Err(other),
            },
        };

        if let Some(metrics) = &self.metrics {
            let failure_class = result.as_ref().err().map(|e| e.class().as_str());
            metrics.record_command(command_type, started.elapsed().as_secs_f64(), failure_class);
        }

        match &result {
            Ok(state) => tracing::info!(
                user_id = %user_id,
                command = command_type,
                version = state.version,
                correlation_id = %correlation_id,
                "Handled command"
            ),
            Err(error) if error.class().is_rejection() => tracing::info!(
                user_id = %user_id,
                command = command_type,
                error = %error,
                "Command rejected"
            ),
            Err(error) => tracing::error!(
                user_id = %user_id,
                command = command_type,
                error = %error,
                "Command failed"
            ),
        }

        result
    }

    /// Current state of a user, or `None` if nothing was ever recorded for it
    pub async fn load(&self, user_id: &str) -> Result<Option<UserState>, CommandError> {
        let aggregate = self.load_aggregate(user_id).await?;
        if aggregate.version() == 0 {
            return Ok(None);
        }
        Ok(Some(aggregate.state()))
    }

    async fn try_handle(
        &self,
        user_id: &str,
        command: &UserCommand,
        correlation_id: Uuid,
    ) -> Result<UserState, CommandError> {
        let aggregate = self.load_aggregate(user_id).await?;
        let expected_version = aggregate.version();

        let outcome = aggregate
            .validate(Some(command))
            .map_err(CommandError::from_user_error)?;

        if outcome.is_empty() {
            return Ok(aggregate.state());
        }

        // Apply to a copy first so a faulty event never reaches the store
        let mut next = aggregate.clone();
        next.apply_outcome(&outcome).map_err(CommandError::Internal)?;

        let envelopes: Vec<_> =
            wrap_events(user_id, expected_version, outcome.into_events(), correlation_id)
                .into_iter()
                .map(|envelope| envelope.with_metadata("command", command.command_type()))
                .collect();
        let event_types: Vec<&'static str> =
            envelopes.iter().map(|e| e.event_data.event_type()).collect();

        let new_version = match self
            .event_store
            .append_events(user_id, expected_version, envelopes)
            .await
        {
            Ok(version) => version,
            Err(error) => {
                if error.is_conflict() {
                    if let Some(metrics) = &self.metrics {
                        metrics.record_conflict();
                    }
                }
                return Err(error.into());
            }
        };

        if let Some(metrics) = &self.metrics {
            for event_type in &event_types {
                metrics.record_event_appended(event_type);
            }
        }

        // Events are committed at this point; a lost snapshot only costs a longer replay
        if self.should_snapshot(expected_version, new_version) {
            if let Err(error) = self
                .snapshot_store
                .save_snapshot(Snapshot::new(user_id, new_version, next.state()))
                .await
            {
                tracing::warn!(
                    user_id = %user_id,
                    version = new_version,
                    error = %error,
                    "Failed to save snapshot"
                );
            }
        }

        Ok(next.state())
    }

    async fn load_aggregate(&self, user_id: &str) -> Result<UserAggregate, CommandError> {
        let snapshot = self.snapshot_store.load_snapshot(user_id).await?;

        let (mut aggregate, from_version) = match snapshot {
            Some(snapshot) => (UserAggregate::rehydrate(snapshot.state), snapshot.version),
            None => (UserAggregate::new(user_id), 0),
        };

        let events = self.event_store.load_events_after(user_id, from_version).await?;

        tracing::debug!(
            user_id = %user_id,
            snapshot_version = from_version,
            replayed = events.len(),
            "Loaded user aggregate"
        );

        aggregate.replay(events).map_err(|e| CommandError::Replay {
            user_id: user_id.to_string(),
            reason: e.to_string(),
        })?;

        Ok(aggregate)
    }

    fn should_snapshot(&self, old_version: u64, new_version: u64) -> bool {
        let every = self.config.snapshot_every;
        every > 0 && new_version / every > old_version / every
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
