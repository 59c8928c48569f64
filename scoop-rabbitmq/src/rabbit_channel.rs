use async_trait::async_trait;
use futures_util::StreamExt;
use lapin::{
    options::*, types::FieldTable, BasicProperties, Channel, Connection, ConnectionProperties,
};
use tracing::{debug, info};

use crate::options::RabbitMqOptions;
use scoop_core::{BrokerChannel, Delivery, DeliveryStream, QueueOptions, QueueRef, RelayError};

/// One connection with a single channel, used for declaring, consuming,
/// publishing and acking alike.
pub struct RabbitChannel {
    opts: RabbitMqOptions,
    conn: Connection,
    ch: Channel,
}

impl RabbitChannel {
    pub async fn connect(opts: RabbitMqOptions) -> Result<Self, RelayError> {
        let conn = Connection::connect(&opts.uri(), ConnectionProperties::default())
            .await
            .map_err(|e| RelayError::Connection(e.to_string()))?;

        let ch = conn
            .create_channel()
            .await
            .map_err(|e| RelayError::Connection(format!("failed to open a channel: {e}")))?;

        if opts.confirms {
            ch.confirm_select(ConfirmSelectOptions { nowait: false })
                .await
                .map_err(|e| RelayError::Connection(e.to_string()))?;
        }

        ch.basic_qos(opts.prefetch, BasicQosOptions { global: false })
            .await
            .map_err(|e| RelayError::Connection(e.to_string()))?;

        info!(
            "RabbitMQ connected. uri={} confirms={}",
            opts.redacted_uri(),
            opts.confirms
        );
        Ok(Self { opts, conn, ch })
    }
}

#[async_trait]
impl BrokerChannel for RabbitChannel {
    async fn declare_queue(
        &self,
        name: &str,
        options: QueueOptions,
    ) -> Result<QueueRef, RelayError> {
        let queue = self
            .ch
            .queue_declare(
                name,
                QueueDeclareOptions {
                    durable: options.durable,
                    auto_delete: options.auto_delete,
                    exclusive: options.exclusive,
                    nowait: false,
                    passive: options.passive,
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| RelayError::QueueDeclaration {
                queue: name.to_string(),
                cause: e.to_string(),
            })?;

        Ok(QueueRef {
            name: queue.name().as_str().to_string(),
            options,
            message_count: queue.message_count(),
            consumer_count: queue.consumer_count(),
        })
    }

    async fn consume(
        &self,
        queue: &str,
        consumer_tag: &str,
    ) -> Result<DeliveryStream, RelayError> {
        let consumer = self
            .ch
            .basic_consume(
                queue,
                consumer_tag,
                BasicConsumeOptions {
                    // acking is what tells the broker a message was handed off
                    no_ack: false,
                    exclusive: false,
                    no_local: false,
                    nowait: false,
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| RelayError::Subscribe {
                queue: queue.to_string(),
                cause: e.to_string(),
            })?;

        debug!(queue, consumer_tag, prefetch = self.opts.prefetch, "consumer registered");

        let deliveries = consumer.map(|delivery| {
            delivery
                .map(|d| Delivery {
                    delivery_tag: d.delivery_tag,
                    redelivered: d.redelivered,
                    data: d.data,
                })
                .map_err(|e| RelayError::Delivery(e.to_string()))
        });
        Ok(deliveries.boxed())
    }

    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        body: &[u8],
    ) -> Result<(), RelayError> {
        let publish_err = |cause: String| RelayError::Publish {
            routing_key: routing_key.to_string(),
            cause,
        };

        let confirm = self
            .ch
            .basic_publish(
                exchange,
                routing_key,
                BasicPublishOptions {
                    mandatory: false,
                    immediate: false,
                },
                body,
                BasicProperties::default().with_content_type("text/plain".into()),
            )
            .await
            .map_err(|e| publish_err(e.to_string()))?
            .await
            .map_err(|e| publish_err(e.to_string()))?;

        if confirm.is_nack() {
            return Err(publish_err("publisher confirm NACK".to_string()));
        }
        Ok(())
    }

    async fn ack(&self, delivery_tag: u64) -> Result<(), RelayError> {
        self.ch
            .basic_ack(delivery_tag, BasicAckOptions { multiple: true })
            .await
            .map_err(|e| RelayError::Ack {
                delivery_tag,
                cause: e.to_string(),
            })
    }

    async fn close(&self) -> Result<(), RelayError> {
        self.ch
            .close(200, "scoop done")
            .await
            .map_err(|e| RelayError::Connection(e.to_string()))?;
        self.conn
            .close(200, "scoop done")
            .await
            .map_err(|e| RelayError::Connection(e.to_string()))
    }
}
