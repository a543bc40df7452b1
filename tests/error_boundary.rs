mod common;

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use utilbot::bot::server::GENERIC_ERROR;
use utilbot::bot::BotServer;
use utilbot::transport::{ChatId, DeliveryError, Reply, Sender, Transport, Update};

use common::*;

/// Rejects the first `failures` sends, then records everything.
#[derive(Default)]
struct FlakyTransport {
    failures: usize,
    attempts: AtomicUsize,
    delivered: Mutex<Vec<(ChatId, String)>>,
}

impl FlakyTransport {
    fn failing_first(failures: usize) -> Self {
        FlakyTransport {
            failures,
            ..Default::default()
        }
    }

    fn delivered(&self) -> Vec<(ChatId, String)> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FlakyTransport {
    async fn send(&self, chat: ChatId, reply: &Reply) -> Result<(), DeliveryError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(DeliveryError::Rejected {
                chat,
                reason: "flaky".into(),
            });
        }
        self.delivered.lock().unwrap().push((chat, reply.text.clone()));
        Ok(())
    }
}

fn flaky_bot(failures: usize) -> (BotServer, Arc<FlakyTransport>) {
    let transport = Arc::new(FlakyTransport::failing_first(failures));
    let server = BotServer::new(test_config(&[ADMIN]), transport.clone()).expect("server init");
    (server, transport)
}

#[tokio::test]
async fn failed_reply_yields_generic_error_and_server_continues() {
    let (mut server, transport) = flaky_bot(1);
    say(&mut server, 4, "/help").await;

    let delivered = transport.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].1, GENERIC_ERROR);

    say(&mut server, 4, "/echo still alive").await;
    assert_eq!(transport.delivered().last().map(|(_, t)| t.as_str()), Some("still alive"));
}

#[tokio::test]
async fn handle_update_surfaces_delivery_errors() {
    let (mut server, _transport) = flaky_bot(1);
    let result = server
        .handle_update(&Update::text(Sender::new(4), "/help"))
        .await;
    let err = result.expect_err("reply failure must propagate");
    assert!(format!("{:#}", err).contains("failed to reply to chat 4"));
}

#[tokio::test]
async fn state_change_survives_failed_reply() {
    let (mut server, transport) = flaky_bot(1);
    say(&mut server, 4, "/register").await;
    assert_eq!(transport.delivered()[0].1, GENERIC_ERROR);
    assert_eq!(
        server.flow_of(utilbot::storage::UserId(4)),
        utilbot::bot::flow::Flow::RegisterName
    );
}
