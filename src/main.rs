use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use user_aggregate::domain::user::map_to_document;
use user_aggregate::event_sourcing::{InMemoryEventStore, InMemorySnapshotStore};
use user_aggregate::metrics::Metrics;
use user_aggregate::utils::RetryConfig;
use user_aggregate::{
    ContactInformation, Email, HandlerConfig, PhoneNumber, UserCommand, UserCommandHandler,
    UserEvent,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,user_aggregate=debug"))
        )
        .init();

    tracing::info!("Starting user aggregate demo");

    let metrics = Arc::new(Metrics::new()?);
    let event_store = Arc::new(InMemoryEventStore::<UserEvent>::new("User"));
    let snapshot_store = Arc::new(InMemorySnapshotStore::new());

    let handler = UserCommandHandler::new(event_store, snapshot_store)
        .with_metrics(metrics.clone())
        .with_config(HandlerConfig {
            retry: RetryConfig::aggressive(),
            snapshot_every: 2,
        });

    let user_id = Uuid::new_v4().to_string();
    let correlation_id = Uuid::new_v4();

    let commands = vec![
        UserCommand::create_user("FirstName", "LastName", None),
        UserCommand::create_contact_info(
            Some(Email::new("test@test.com")),
            Some(PhoneNumber::new("+421 901 000 000")),
        ),
        UserCommand::add_shortener(&user_id, Uuid::new_v4().to_string()),
        // Rejected: the user already exists
        UserCommand::create_user(
            "Other",
            "Name",
            Some(ContactInformation::with_email("other@test.com")),
        ),
    ];

    for command in commands {
        if let Err(error) = handler.handle(&user_id, command, correlation_id).await {
            tracing::warn!(class = %error.class(), error = %error, "Command not applied");
        }
    }

    if let Some(state) = handler.load(&user_id).await? {
        let document = map_to_document(&state);
        tracing::info!(
            view = %serde_json::to_string_pretty(&document)?,
            "Final user view"
        );
    }

    tracing::info!(metrics = %metrics.encode()?, "Metrics snapshot");
    Ok(())
}
