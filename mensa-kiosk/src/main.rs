use anyhow::Context;
use env_logger::{Builder, Target};
use log::LevelFilter;
use mensa_kiosk::api_client::{ApiClient, ApiError};
use mensa_kiosk::carousel::{CarouselEffect, CarouselEvent, CarouselState};
use mensa_kiosk::config::KioskConfig;
use mensa_kiosk::payments::{HttpTokenSource, TokenCache};
use mensa_model::Banner;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep, sleep_until};
use url::Url;

/// Nominal signage panel width; the headless runner has no real viewport
const SLIDE_WIDTH_PX: f32 = 1080.0;
/// Poll period while the server is gated behind maintenance mode
const MAINTENANCE_POLL_PERIOD: Duration = Duration::from_secs(30);

fn init_logger() {
    Builder::new()
        .target(Target::Stdout)
        .filter_level(LevelFilter::Warn)
        .filter_module("mensa_kiosk", LevelFilter::Debug)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::init();
    }

    let config = KioskConfig::load();
    let api = ApiClient::new(config.server_url.clone());

    check_payment_gateway(&config).await;

    let banners = fetch_banners_gated(&api).await?;
    log::info!("loaded {} banners", banners.len());
    for banner in &banners {
        log::debug!("banner {} -> {}", banner.id, api.media_url(banner));
    }

    let mut carousel =
        CarouselState::with_tuning(banners, SLIDE_WIDTH_PX, config.carousel.tuning());
    run_rotation(&api, &mut carousel).await;
    Ok(())
}

/// Fetch the banner rotation, holding while the server is in maintenance.
async fn fetch_banners_gated(api: &ApiClient) -> anyhow::Result<Vec<Banner>> {
    loop {
        match api.fetch_banners().await {
            Ok(banners) => return Ok(banners),
            Err(ApiError::Maintenance) => {
                log::warn!(
                    "server in maintenance mode, retrying in {}s",
                    MAINTENANCE_POLL_PERIOD.as_secs()
                );
                sleep(MAINTENANCE_POLL_PERIOD).await;
            }
            Err(err) => {
                return Err(err).context("failed to fetch banner rotation");
            }
        }
    }
}

/// Verify the payment identity endpoint accepts our client credentials, so a
/// misconfiguration surfaces at boot rather than at the first sale.
async fn check_payment_gateway(config: &KioskConfig) {
    if config.payment.client_id.is_empty() {
        log::debug!("payment credentials not configured, skipping gateway check");
        return;
    }

    let token_url = match Url::parse(&config.payment.token_url) {
        Ok(url) => url,
        Err(err) => {
            log::warn!("invalid payment token URL: {err}");
            return;
        }
    };

    let source = HttpTokenSource::new(
        token_url,
        config.payment.client_id.clone(),
        config.payment.client_secret.clone(),
    );
    match TokenCache::new(Arc::new(source)).bearer_token().await {
        Ok(_) => log::info!("payment gateway token issued"),
        Err(err) => log::warn!("payment gateway check failed: {err}"),
    }
}

/// Drive the carousel's timer effects until ctrl-c.
async fn run_rotation(api: &ApiClient, carousel: &mut CarouselState) {
    let transition = carousel.tuning().transition_duration;
    let mut deadline = effect_deadline(carousel.start());
    if deadline.is_none() {
        log::info!("rotation has {} banner(s), rendering statically", carousel.banner_count());
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("shutting down");
                break;
            }
            _ = wait_for(deadline) => {
                carousel.update(CarouselEvent::AutoAdvanceElapsed);
                deadline = None;
                sleep(transition).await;
                let effect = carousel.update(CarouselEvent::TransitionFinished);
                if let Some(banner) = carousel.current_banner() {
                    log::info!(
                        "showing banner {} of {} ({})",
                        carousel.current_index() + 1,
                        carousel.banner_count(),
                        api.media_url(banner)
                    );
                }
                deadline = effect_deadline(effect);
            }
        }
    }
}

fn effect_deadline(effect: Option<CarouselEffect>) -> Option<Instant> {
    match effect {
        Some(CarouselEffect::ScheduleAutoAdvance(period)) => {
            Some(Instant::now() + period)
        }
        Some(CarouselEffect::CancelAutoAdvance) | None => None,
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
