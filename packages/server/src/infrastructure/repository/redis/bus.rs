//! Redis Pub/Sub Broadcast Bus 実装

use std::time::Duration;

use ::redis::{Client, aio::ConnectionManager};
use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::{
    sync::{Mutex, mpsc},
    task::JoinHandle,
};

use super::{Bounded, bounded};
use crate::domain::{BroadcastBus, BusChannel, BusError, BusEvent};

/// Initial backoff delay for subscriber reconnection
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Maximum backoff delay for subscriber reconnection
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Why a subscriber connection ended
#[derive(Debug)]
enum SubscriberExit {
    /// Connected and subscribed, then the connection dropped
    Disconnected,
    /// Could not connect or subscribe
    ConnectFailed(BusError),
    /// Nobody is reading deliveries any more
    ReceiverClosed,
}

/// Double the backoff delay, capped at [`MAX_BACKOFF`]
fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_BACKOFF)
}

/// Broadcast bus backed by Redis Pub/Sub.
///
/// Publishing goes through a multiplexed connection manager. Subscribing
/// opens a dedicated Pub/Sub connection in a background task which keeps
/// retrying with exponential backoff, so a failed subscription never leaves
/// the instance silently isolated.
pub struct RedisBroadcastBus {
    client: Client,
    publisher: ConnectionManager,
    timeout: Duration,
    subscriber: Mutex<Option<JoinHandle<()>>>,
}

impl RedisBroadcastBus {
    /// Connect the publisher side to Redis
    pub async fn connect(client: Client, timeout: Duration) -> Result<Self, BusError> {
        let publisher = match bounded(timeout, ConnectionManager::new(client.clone())).await {
            Bounded::Done(Ok(conn)) => conn,
            Bounded::Done(Err(e)) => return Err(BusError::Backend(e.to_string())),
            Bounded::TimedOut => return Err(BusError::Timeout(timeout)),
        };

        Ok(Self {
            client,
            publisher,
            timeout,
            subscriber: Mutex::new(None),
        })
    }

    /// Keep a subscription alive until the receiver is dropped.
    ///
    /// Returns the number of connection attempts made.
    async fn subscribe_loop(
        client: Client,
        timeout: Duration,
        initial_backoff: Duration,
        tx: mpsc::UnboundedSender<BusEvent>,
    ) -> usize {
        let mut backoff = initial_backoff;
        let mut attempts = 0;

        loop {
            attempts += 1;
            match Self::run_subscriber(&client, timeout, &tx).await {
                SubscriberExit::ReceiverClosed => break,
                SubscriberExit::Disconnected => {
                    // The server was reachable, start over from the initial delay
                    tracing::error!(
                        "Bus subscription lost, resubscribing in {:?}",
                        initial_backoff
                    );
                    backoff = initial_backoff;
                }
                SubscriberExit::ConnectFailed(e) => {
                    tracing::error!("Bus subscription failed: {}, retrying in {:?}", e, backoff);
                }
            }

            tokio::time::sleep(backoff).await;
            if tx.is_closed() {
                break;
            }
            backoff = next_backoff(backoff);
        }

        tracing::info!(
            "Bus subscriber stopped after {} attempts: receiver closed",
            attempts
        );
        attempts
    }

    async fn run_subscriber(
        client: &Client,
        timeout: Duration,
        tx: &mpsc::UnboundedSender<BusEvent>,
    ) -> SubscriberExit {
        let mut pubsub = match bounded(timeout, client.get_async_pubsub()).await {
            Bounded::Done(Ok(pubsub)) => pubsub,
            Bounded::Done(Err(e)) => {
                return SubscriberExit::ConnectFailed(BusError::Backend(e.to_string()));
            }
            Bounded::TimedOut => return SubscriberExit::ConnectFailed(BusError::Timeout(timeout)),
        };

        for channel in BusChannel::ALL {
            match bounded(timeout, pubsub.subscribe(channel.name())).await {
                Bounded::Done(Ok(())) => {}
                Bounded::Done(Err(e)) => {
                    return SubscriberExit::ConnectFailed(BusError::Backend(format!(
                        "subscribe to {channel}: {e}"
                    )));
                }
                Bounded::TimedOut => {
                    return SubscriberExit::ConnectFailed(BusError::Timeout(timeout));
                }
            }
        }
        tracing::info!(
            "Subscribed to {} bus channels ({}, {})",
            BusChannel::ALL.len(),
            BusChannel::ConnectionCountUpdate,
            BusChannel::NewMessage
        );

        let mut messages = pubsub.on_message();
        while let Some(msg) = messages.next().await {
            let channel_name = msg.get_channel_name();
            let Some(channel) = BusChannel::from_name(channel_name) else {
                tracing::warn!("Ignoring delivery on unknown channel '{}'", channel_name);
                continue;
            };
            let payload: String = match msg.get_payload() {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!("Invalid payload on {}: {}", channel, e);
                    continue;
                }
            };

            if tx.send(BusEvent::new(channel, payload)).is_err() {
                return SubscriberExit::ReceiverClosed;
            }
        }

        SubscriberExit::Disconnected
    }
}

#[async_trait]
impl BroadcastBus for RedisBroadcastBus {
    async fn publish(&self, channel: BusChannel, payload: String) -> Result<(), BusError> {
        let mut conn = self.publisher.clone();
        let mut cmd = ::redis::cmd("PUBLISH");
        cmd.arg(channel.name()).arg(payload);

        match bounded(self.timeout, cmd.query_async::<i64>(&mut conn)).await {
            Bounded::Done(Ok(receivers)) => {
                tracing::debug!("Published on {} ({} receivers)", channel, receivers);
                Ok(())
            }
            Bounded::Done(Err(e)) => Err(BusError::Backend(e.to_string())),
            Bounded::TimedOut => Err(BusError::Timeout(self.timeout)),
        }
    }

    async fn subscribe(&self) -> Result<mpsc::UnboundedReceiver<BusEvent>, BusError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = self.client.clone();
        let timeout = self.timeout;
        let handle = tokio::spawn(async move {
            Self::subscribe_loop(client, timeout, INITIAL_BACKOFF, tx).await;
        });

        let mut subscriber = self.subscriber.lock().await;
        if let Some(previous) = subscriber.replace(handle) {
            previous.abort();
        }
        Ok(rx)
    }

    async fn close(&self) {
        if let Some(handle) = self.subscriber.lock().await.take() {
            handle.abort();
            tracing::info!("Bus subscriber closed");
        }
    }
}
