//! Message-passing event dispatch.
//!
//! Transports turn Slack traffic into typed [`Inbound`] events and push them
//! onto one bounded channel per event kind. A single [`Dispatcher`] loop takes
//! events off those channels and runs a two-phase protocol on each:
//!
//! 1. acknowledge, which releases the transport to answer Slack;
//! 2. spawn the handler as an independent task.
//!
//! Phase 1 always finishes before any outbound call of phase 2 starts.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::{Instrument, error, info_span, warn};
use uuid::Uuid;

use crate::core::models::{ActionClick, FormSubmission, SlashCommand};
use crate::errors::BotError;
use crate::slack::ChatPlatform;
use crate::workflow::ApprovalBot;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// One-shot acknowledgment of an inbound event.
///
/// Sending reports whether the transport was still waiting for it.
pub struct Ack(Box<dyn FnOnce() -> bool + Send>);

impl Ack {
    pub fn new(on_ack: impl FnOnce() + Send + 'static) -> Self {
        Self(Box::new(move || {
            on_ack();
            true
        }))
    }

    /// An ack whose receiver resolves once it is sent.
    #[must_use]
    pub fn oneshot() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        // A dropped receiver means the transport already gave up on the event.
        let ack = Self(Box::new(move || tx.send(()).is_ok()));
        (ack, rx)
    }

    #[must_use]
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    /// Returns `false` if nobody was waiting for the ack any more.
    pub fn send(self) -> bool {
        (self.0)()
    }
}

impl std::fmt::Debug for Ack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Ack")
    }
}

/// An event paired with the acknowledgment its transport is waiting for.
#[derive(Debug)]
pub struct Inbound<E> {
    pub event: E,
    ack: Ack,
}

impl<E> Inbound<E> {
    pub fn new(event: E, ack: Ack) -> Self {
        Self { event, ack }
    }

    /// Phase 1: acknowledge and hand back the event for processing.
    ///
    /// `None` when the transport stopped waiting: Slack has already been told
    /// the event failed, so it must not be handled.
    pub fn acknowledge(self) -> Option<E> {
        self.ack.send().then_some(self.event)
    }
}

/// Event kinds that have a channel of their own.
pub trait Routed: Send + Sized + 'static {
    const KIND: &'static str;

    fn channel(sender: &EventSender) -> &mpsc::Sender<Inbound<Self>>;
}

impl Routed for SlashCommand {
    const KIND: &'static str = "slash_command";

    fn channel(sender: &EventSender) -> &mpsc::Sender<Inbound<Self>> {
        &sender.commands
    }
}

impl Routed for FormSubmission {
    const KIND: &'static str = "view_submission";

    fn channel(sender: &EventSender) -> &mpsc::Sender<Inbound<Self>> {
        &sender.submissions
    }
}

impl Routed for ActionClick {
    const KIND: &'static str = "block_action";

    fn channel(sender: &EventSender) -> &mpsc::Sender<Inbound<Self>> {
        &sender.actions
    }
}

/// Producer side, cloned into every transport.
#[derive(Clone)]
pub struct EventSender {
    commands: mpsc::Sender<Inbound<SlashCommand>>,
    submissions: mpsc::Sender<Inbound<FormSubmission>>,
    actions: mpsc::Sender<Inbound<ActionClick>>,
    ack_timeout: Duration,
}

impl EventSender {
    /// Queue an event with a caller-supplied ack.
    ///
    /// # Errors
    ///
    /// Returns `BotError::DispatcherClosed` if the dispatcher has stopped.
    pub async fn send<E: Routed>(&self, inbound: Inbound<E>) -> Result<(), BotError> {
        E::channel(self)
            .send(inbound)
            .await
            .map_err(|_| BotError::DispatcherClosed)
    }

    /// Queue an event and wait until the dispatcher acknowledges it.
    ///
    /// An event whose ack times out stays queued, but the dispatcher drops it
    /// unhandled once it finds nobody waiting.
    ///
    /// # Errors
    ///
    /// Returns `BotError::DispatcherClosed` if the dispatcher has stopped, or
    /// `BotError::AckError` if no ack arrives within the ack timeout.
    pub async fn deliver<E: Routed>(&self, event: E) -> Result<(), BotError> {
        let (ack, acked) = Ack::oneshot();
        self.send(Inbound::new(event, ack)).await?;

        match tokio::time::timeout(self.ack_timeout, acked).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(BotError::AckError(format!(
                "{} dropped before acknowledgment",
                E::KIND
            ))),
            Err(_) => Err(BotError::AckError(format!(
                "{} not acknowledged within {}ms",
                E::KIND,
                self.ack_timeout.as_millis()
            ))),
        }
    }
}

/// Consumer side: the single dispatch loop.
pub struct Dispatcher<P> {
    bot: Arc<ApprovalBot<P>>,
    commands: mpsc::Receiver<Inbound<SlashCommand>>,
    submissions: mpsc::Receiver<Inbound<FormSubmission>>,
    actions: mpsc::Receiver<Inbound<ActionClick>>,
}

/// Create the per-kind channels for `bot`.
#[must_use]
pub fn channel<P>(
    bot: ApprovalBot<P>,
    capacity: usize,
    ack_timeout: Duration,
) -> (EventSender, Dispatcher<P>)
where
    P: ChatPlatform + 'static,
{
    let (commands_tx, commands_rx) = mpsc::channel(capacity);
    let (submissions_tx, submissions_rx) = mpsc::channel(capacity);
    let (actions_tx, actions_rx) = mpsc::channel(capacity);

    (
        EventSender {
            commands: commands_tx,
            submissions: submissions_tx,
            actions: actions_tx,
            ack_timeout,
        },
        Dispatcher {
            bot: Arc::new(bot),
            commands: commands_rx,
            submissions: submissions_rx,
            actions: actions_rx,
        },
    )
}

impl<P> Dispatcher<P>
where
    P: ChatPlatform + 'static,
{
    /// Run until every `EventSender` is dropped, then wait for in-flight handlers.
    pub async fn run(mut self) {
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                Some(inbound) = self.commands.recv() => {
                    let Some(command) = inbound.acknowledge() else {
                        warn_stale(SlashCommand::KIND);
                        continue;
                    };
                    let bot = Arc::clone(&self.bot);
                    spawn_handler(&mut tasks, SlashCommand::KIND, async move {
                        bot.handle_command(&command).await
                    });
                }
                Some(inbound) = self.submissions.recv() => {
                    let Some(submission) = inbound.acknowledge() else {
                        warn_stale(FormSubmission::KIND);
                        continue;
                    };
                    let bot = Arc::clone(&self.bot);
                    spawn_handler(&mut tasks, FormSubmission::KIND, async move {
                        bot.handle_submission(&submission).await
                    });
                }
                Some(inbound) = self.actions.recv() => {
                    let Some(click) = inbound.acknowledge() else {
                        warn_stale(ActionClick::KIND);
                        continue;
                    };
                    let bot = Arc::clone(&self.bot);
                    spawn_handler(&mut tasks, ActionClick::KIND, async move {
                        bot.handle_action(&click).await
                    });
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    log_panic(joined);
                }
                else => break,
            }
        }

        while let Some(joined) = tasks.join_next().await {
            log_panic(joined);
        }
    }
}

fn spawn_handler<F>(tasks: &mut JoinSet<()>, kind: &'static str, handler: F)
where
    F: Future<Output = Result<(), BotError>> + Send + 'static,
{
    let event_id = Uuid::new_v4();
    let span = info_span!("event", %event_id, kind);
    tasks.spawn(
        async move {
            // Errors end this event only; the loop keeps running.
            if let Err(e) = handler.await {
                error!("Failed to handle {}: {}", kind, e);
            }
        }
        .instrument(span),
    );
}

fn warn_stale(kind: &'static str) {
    warn!("Dropping {} whose acknowledgment timed out", kind);
}

fn log_panic(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        warn!("Event handler task did not complete: {}", e);
    }
}
