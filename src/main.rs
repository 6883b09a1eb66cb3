use std::time::Duration;

use dcf77_web::config::Config;
use dcf77_web::history::{HISTORY_CAPACITY, RingLog};
use dcf77_web::http::connection::{HttpServer, Timeouts};
use dcf77_web::page::{IndexPage, LocalClock};
use dcf77_web::receiver;
use dcf77_web::server::{MonotonicClock, TcpAcceptor};
use tokio::time::MissedTickBehavior;

static HISTORY: RingLog<HISTORY_CAPACITY> = RingLog::new();

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    tokio::spawn(receiver::run(&HISTORY, cfg.receiver.clone()));

    let listener = TcpAcceptor::bind(&cfg.server.listen_addr).await?;
    let page = IndexPage::new(&HISTORY, LocalClock);
    let mut server = HttpServer::new(
        listener,
        page,
        MonotonicClock::new(),
        Timeouts::from(&cfg.server),
    );
    server.begin();

    let mut ticker = tokio::time::interval(Duration::from_millis(cfg.server.tick_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => server.tick(),

            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    server.end();
    Ok(())
}
