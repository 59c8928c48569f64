// In-memory stand-in for a broker channel. Messages are pulled off the
// source lazily as the relay polls its subscription, so queue state can be
// inspected at any point of a run.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::StreamExt;
use scoop_core::{BrokerChannel, Delivery, DeliveryStream, QueueOptions, QueueRef, RelayError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub exchange: String,
    pub routing_key: String,
    pub body: Vec<u8>,
}

#[derive(Default)]
struct FakeQueue {
    options: QueueOptions,
    messages: VecDeque<Vec<u8>>,
}

enum Pull {
    Delivery(Delivery),
    Failed(String),
    Wait,
    Closed,
}

#[derive(Default)]
struct Broker {
    queues: HashMap<String, FakeQueue>,
    published: Vec<Published>,
    publish_attempts: usize,
    fail_publish_at: Option<usize>,
    fail_delivery_after: Option<usize>,
    pulled: usize,
    next_tag: u64,
    unacked: BTreeMap<u64, Vec<u8>>,
    acked: Vec<u64>,
    consume_calls: usize,
    declare_calls: usize,
    live: bool,
    closed: bool,
}

impl Broker {
    fn pull(&mut self, queue: &str) -> Pull {
        if self.fail_delivery_after == Some(self.pulled) {
            return Pull::Failed("connection reset by peer".into());
        }
        match self.queues.get_mut(queue).and_then(|q| q.messages.pop_front()) {
            Some(data) => {
                self.pulled += 1;
                self.next_tag += 1;
                self.unacked.insert(self.next_tag, data.clone());
                Pull::Delivery(Delivery {
                    delivery_tag: self.next_tag,
                    redelivered: false,
                    data,
                })
            }
            None if self.live => Pull::Wait,
            None => Pull::Closed,
        }
    }
}

#[derive(Clone, Default)]
pub struct FakeChannel {
    broker: Arc<Mutex<Broker>>,
}

impl FakeChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queue(self, name: &str, messages: &[&[u8]]) -> Self {
        self.broker.lock().unwrap().queues.insert(
            name.to_string(),
            FakeQueue {
                options: QueueOptions::relay(false),
                messages: messages.iter().map(|m| m.to_vec()).collect(),
            },
        );
        self
    }

    pub fn with_durable_queue(self, name: &str) -> Self {
        self.broker.lock().unwrap().queues.insert(
            name.to_string(),
            FakeQueue {
                options: QueueOptions {
                    durable: true,
                    ..QueueOptions::default()
                },
                messages: VecDeque::new(),
            },
        );
        self
    }

    /// An empty source blocks the subscription instead of ending it.
    pub fn live(self) -> Self {
        self.broker.lock().unwrap().live = true;
        self
    }

    /// The `n`-th publish (1-based) fails.
    pub fn fail_publish_at(self, n: usize) -> Self {
        self.broker.lock().unwrap().fail_publish_at = Some(n);
        self
    }

    /// The subscription yields an error after `n` deliveries.
    pub fn fail_delivery_after(self, n: usize) -> Self {
        self.broker.lock().unwrap().fail_delivery_after = Some(n);
        self
    }

    pub fn pending(&self, queue: &str) -> Vec<Vec<u8>> {
        self.broker
            .lock()
            .unwrap()
            .queues
            .get(queue)
            .map(|q| q.messages.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn published(&self) -> Vec<Published> {
        self.broker.lock().unwrap().published.clone()
    }

    pub fn publish_attempts(&self) -> usize {
        self.broker.lock().unwrap().publish_attempts
    }

    pub fn acked(&self) -> Vec<u64> {
        self.broker.lock().unwrap().acked.clone()
    }

    pub fn unacked(&self) -> Vec<u64> {
        self.broker.lock().unwrap().unacked.keys().copied().collect()
    }

    pub fn consume_calls(&self) -> usize {
        self.broker.lock().unwrap().consume_calls
    }

    pub fn declare_calls(&self) -> usize {
        self.broker.lock().unwrap().declare_calls
    }

    pub fn is_closed(&self) -> bool {
        self.broker.lock().unwrap().closed
    }
}

#[async_trait]
impl BrokerChannel for FakeChannel {
    async fn declare_queue(
        &self,
        name: &str,
        options: QueueOptions,
    ) -> Result<QueueRef, RelayError> {
        let mut broker = self.broker.lock().unwrap();
        broker.declare_calls += 1;

        let declared = |options: QueueOptions, pending: usize| QueueRef {
            name: name.to_string(),
            options,
            message_count: pending as u32,
            consumer_count: 0,
        };

        let existing = broker
            .queues
            .get(name)
            .map(|q| (q.options, q.messages.len()));

        match existing {
            Some((current, pending)) if options.passive => Ok(declared(current, pending)),
            Some((current, _))
                if current.durable != options.durable
                    || current.exclusive != options.exclusive
                    || current.auto_delete != options.auto_delete =>
            {
                Err(RelayError::QueueDeclaration {
                    queue: name.to_string(),
                    cause: "PRECONDITION_FAILED - inequivalent arg 'durable'".into(),
                })
            }
            Some((current, pending)) => Ok(declared(current, pending)),
            None if options.passive => Err(RelayError::QueueDeclaration {
                queue: name.to_string(),
                cause: format!("NOT_FOUND - no queue '{name}'"),
            }),
            None => {
                let options = QueueOptions {
                    passive: false,
                    ..options
                };
                broker.queues.insert(
                    name.to_string(),
                    FakeQueue {
                        options,
                        messages: VecDeque::new(),
                    },
                );
                Ok(declared(options, 0))
            }
        }
    }

    async fn consume(
        &self,
        queue: &str,
        _consumer_tag: &str,
    ) -> Result<DeliveryStream, RelayError> {
        self.broker.lock().unwrap().consume_calls += 1;

        let state = (Arc::clone(&self.broker), queue.to_string());
        let stream = futures_util::stream::unfold(state, |(broker, queue)| async move {
            let next = broker.lock().unwrap().pull(&queue);
            match next {
                Pull::Delivery(d) => Some((Ok(d), (broker, queue))),
                Pull::Failed(cause) => Some((Err(RelayError::Delivery(cause)), (broker, queue))),
                Pull::Closed => None,
                Pull::Wait => {
                    futures_util::future::pending::<()>().await;
                    None
                }
            }
        });
        Ok(stream.boxed())
    }

    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        body: &[u8],
    ) -> Result<(), RelayError> {
        let mut broker = self.broker.lock().unwrap();
        broker.publish_attempts += 1;
        if broker.fail_publish_at == Some(broker.publish_attempts) {
            return Err(RelayError::Publish {
                routing_key: routing_key.to_string(),
                cause: "channel closed".into(),
            });
        }

        broker.published.push(Published {
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
            body: body.to_vec(),
        });
        if let Some(q) = broker.queues.get_mut(routing_key) {
            q.messages.push_back(body.to_vec());
        }
        Ok(())
    }

    async fn ack(&self, delivery_tag: u64) -> Result<(), RelayError> {
        let mut broker = self.broker.lock().unwrap();
        if !broker.unacked.contains_key(&delivery_tag) {
            return Err(RelayError::Ack {
                delivery_tag,
                cause: "PRECONDITION_FAILED - unknown delivery tag".into(),
            });
        }
        let rest = broker.unacked.split_off(&(delivery_tag + 1));
        let done = std::mem::replace(&mut broker.unacked, rest);
        broker.acked.extend(done.keys());
        Ok(())
    }

    async fn close(&self) -> Result<(), RelayError> {
        self.broker.lock().unwrap().closed = true;
        Ok(())
    }
}
