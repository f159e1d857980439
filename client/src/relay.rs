//! Contract event relay.
//!
//! Holds at most one pair of live log subscriptions (one per [`EventKind`]),
//! merges their deliveries, drops repeats within a subscription epoch and
//! renders the rest into the surface's event log.

use std::collections::{BTreeSet, HashSet};

use futures::stream::{self, BoxStream, SelectAll};
use futures::StreamExt;

use ethbank_common::events::{EventKey, EventKind};
use ethbank_common::provider::{Log, Provider, ProviderError, SubscriptionId};

use crate::contract::Contract;
use crate::surface::Surface;

/// First log line of every subscription epoch.
pub const SUBSCRIBED_MESSAGE: &str = "Subscribed to contract events";

/// One item pulled from the merged subscription streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamItem {
    Log(Log),
    Error(ProviderError),
    /// The provider ended the stream.
    Closed,
}

/// What the relay did with a pulled item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// A new event; the line prepended to the log.
    Rendered(String),
    /// Already seen in this epoch.
    Duplicate,
    /// Retracted, pending, undecodable, or from a stopped stream.
    Ignored,
    /// The stream for this kind stopped.
    StreamFailed(EventKind),
}

type TaggedStream = BoxStream<'static, (EventKind, StreamItem)>;

/// Prefix `message` with the local wall-clock time.
pub fn timestamped(message: &str) -> String {
    format!("{}: {message}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))
}

#[derive(Default)]
pub struct EventRelay {
    active: Vec<(EventKind, SubscriptionId)>,
    streams: SelectAll<TaggedStream>,
    seen: HashSet<EventKey>,
    failed: BTreeSet<EventKind>,
}

impl std::fmt::Debug for EventRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRelay")
            .field("active", &self.active)
            .field("seen", &self.seen.len())
            .field("failed", &self.failed)
            .finish()
    }
}

impl EventRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_subscribed(&self) -> bool {
        !self.active.is_empty()
    }

    /// Live subscriptions of the current epoch.
    pub fn active(&self) -> &[(EventKind, SubscriptionId)] {
        &self.active
    }

    /// Kinds whose stream failed to open or stopped during this epoch.
    pub fn failed_kinds(&self) -> impl Iterator<Item = EventKind> + '_ {
        self.failed.iter().copied()
    }

    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }

    /// Start a new epoch: cancel the previous pair, forget seen events and
    /// subscribe to both event kinds from the chain head.
    ///
    /// A kind that fails to subscribe is logged and recorded in
    /// [`failed_kinds`](Self::failed_kinds); the other kind stays live.
    pub async fn subscribe<P: Provider, S: Surface>(&mut self, contract: &Contract<P>, surface: &mut S) {
        self.unsubscribe(contract.provider().as_ref()).await;
        self.seen.clear();
        self.failed.clear();

        surface.prepend_log(&timestamped(SUBSCRIBED_MESSAGE));

        for kind in EventKind::ALL {
            match contract.subscribe(kind).await {
                Ok(subscription) => {
                    tracing::info!("Subscribed to {kind} events ({})", subscription.id);
                    self.active.push((kind, subscription.id));
                    let tagged = subscription
                        .logs
                        .map(move |item| match item {
                            Ok(log) => (kind, StreamItem::Log(log)),
                            Err(err) => (kind, StreamItem::Error(err)),
                        })
                        .chain(stream::once(async move { (kind, StreamItem::Closed) }));
                    self.streams.push(tagged.boxed());
                }
                Err(err) => {
                    tracing::error!("Failed to subscribe to {kind} events: {err}");
                    self.failed.insert(kind);
                }
            }
        }
    }

    /// Cancel every live subscription. Cancellation errors are logged only.
    pub async fn unsubscribe<P: Provider>(&mut self, provider: &P) {
        self.streams = SelectAll::new();
        for (kind, id) in self.active.drain(..) {
            match provider.unsubscribe(id).await {
                Ok(()) => tracing::debug!("Unsubscribed from {kind} events ({id})"),
                Err(err) => tracing::warn!("Failed to unsubscribe from {kind} events ({id}): {err}"),
            }
        }
    }

    /// Wait for the next item from any live stream. `None` once no stream is
    /// left.
    pub async fn next_item(&mut self) -> Option<(EventKind, StreamItem)> {
        self.streams.next().await
    }

    /// Handle one pulled item.
    pub fn deliver<P: Provider, S: Surface>(
        &mut self,
        contract: &Contract<P>,
        kind: EventKind,
        item: StreamItem,
        surface: &mut S,
    ) -> Delivery {
        let log = match item {
            StreamItem::Log(log) => log,
            StreamItem::Error(err) => {
                tracing::error!("{kind} subscription error: {err}");
                self.failed.insert(kind);
                return Delivery::StreamFailed(kind);
            }
            StreamItem::Closed => {
                if !self.failed.insert(kind) {
                    return Delivery::Ignored;
                }
                tracing::error!("{kind} subscription closed by provider");
                return Delivery::StreamFailed(kind);
            }
        };

        if self.failed.contains(&kind) {
            return Delivery::Ignored;
        }
        if log.removed {
            tracing::warn!("Ignoring retracted {kind} log {:?}", log.transaction_hash);
            return Delivery::Ignored;
        }
        let Some(key) = EventKey::of(&log) else {
            tracing::warn!("Ignoring {kind} log without a position");
            return Delivery::Ignored;
        };
        if !self.seen.insert(key) {
            tracing::debug!("Duplicate {kind} event {key}");
            return Delivery::Duplicate;
        }

        match contract.decode(kind, &log) {
            Ok(event) => {
                tracing::debug!("{kind} event {key}: {event:?}");
                let line = timestamped(&event.to_string());
                surface.prepend_log(&line);
                Delivery::Rendered(line)
            }
            Err(err) => {
                tracing::error!("Failed to decode {kind} event {key}: {err}");
                Delivery::Ignored
            }
        }
    }
}
