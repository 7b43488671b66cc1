use std::time::Duration;

use nostr_sdk::prelude::*;
use nostrivore::{
    unix_timestamp, ArticleContent, ArticlePublisher, ArticleSave, Privacy, PublisherConfig,
    RelayTransport, KIND_ARTICLE_CONTENT,
};

#[tokio::test]
#[ignore]
async fn publish_article_to_relay() {
    let relay = std::env::var("NOSTR_TEST_RELAY").expect("NOSTR_TEST_RELAY missing");
    let secret = std::env::var("NOSTR_TEST_KEY").expect("NOSTR_TEST_KEY missing");

    let mut config = PublisherConfig::new(vec![relay.clone()], secret);
    config.timeout = Duration::from_secs(10);
    let keys = config.keys().expect("invalid secret key");

    let omnivore_id = format!("omni_test_{}", unix_timestamp());
    let save = ArticleSave::new(
        "Relay Test Title",
        "http://example.com/relay-test",
        omnivore_id,
        Privacy::Private,
    );
    let mut content = ArticleContent::new("Relay test content.");

    let publisher = ArticlePublisher::new(RelayTransport::new(config).await.unwrap());
    let outcome = publisher.publish(&keys, &save, &mut content).await.unwrap();
    assert!(outcome.is_complete(), "{outcome}");
    let content_id = outcome.content().unwrap().id().to_string();
    publisher.transport().disconnect().await;

    let client = Client::builder().build();
    client.add_relay(&relay).await.unwrap();
    client.connect().await;
    let filter = Filter::new()
        .author(keys.public_key())
        .kind(Kind::Custom(KIND_ARTICLE_CONTENT))
        .id(EventId::from_hex(&content_id).unwrap());
    let events = client
        .fetch_events(filter, Duration::from_secs(10))
        .await
        .unwrap();

    assert!(events.iter().any(|event| event.id.to_hex() == content_id));
}
