use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use nostrivore::{
    ArticleDraft, ArticlePublisher, MemoryTransport, PublishOutcome, PublisherConfig,
    RelayTransport, DEFAULT_MIN_ACKS, DEFAULT_TIMEOUT_SECS,
};

#[derive(Debug, Parser)]
#[command(name = "nostrivore-publish")]
#[command(about = "Publish an article as linked Nostr metadata and content events")]
struct Args {
    /// Nostr relay URL(s); falls back to NOSTR_RELAYS
    #[arg(long)]
    relay: Vec<String>,
    /// Secret key (hex or nsec); falls back to NOSTR_SECRET_KEY
    #[arg(long)]
    key: Option<String>,
    /// Path to the article JSON
    #[arg(long, required = true)]
    article: PathBuf,
    #[arg(long, default_value_t = DEFAULT_MIN_ACKS)]
    min_acks: usize,
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
    /// Build and sign the records without contacting any relay
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let (save, mut content) = ArticleDraft::from_path(&args.article)?.into_parts();

    let mut config = PublisherConfig::resolve(args.relay, args.key)?;
    config.min_acks = args.min_acks;
    config.timeout = Duration::from_secs(args.timeout_secs);

    let keys = config.keys()?;

    if args.dry_run {
        let publisher = ArticlePublisher::new(MemoryTransport::new());
        let outcome = publisher.publish(&keys, &save, &mut content).await?;
        for record in publisher.transport().sent()? {
            println!("{}", record.as_json()?);
        }
        return report(outcome);
    }

    if config.relays.is_empty() {
        return Err("no relays configured (use --relay or NOSTR_RELAYS)".into());
    }

    let transport = RelayTransport::new(config).await?;
    let publisher = ArticlePublisher::new(transport);
    let result = publisher.publish(&keys, &save, &mut content).await;
    publisher.transport().disconnect().await;
    report(result?)
}

fn report(outcome: PublishOutcome) -> Result<(), Box<dyn std::error::Error>> {
    match outcome {
        PublishOutcome::Complete { metadata, content } => {
            info!(metadata_id = %metadata.id(), content_id = %content.id(), "Published article");
            Ok(())
        }
        PublishOutcome::MetadataOnly { metadata, failure } => {
            warn!(metadata_id = %metadata.id(), "Published article metadata without content");
            Err(Box::new(failure))
        }
    }
}
