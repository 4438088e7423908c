//! Core behavior of the feed service that does not need a live store:
//! viewer-relative rendering, the daily sampler, and the shared poller.

use chrono::{Duration, TimeZone, Utc};
use feed_service::config::SampleConfig;
use feed_service::models::{units, UnitSystem, UserRow, UserView};
use feed_service::services::{DailySampler, SharedPoller};
use pagination::Page;
use uuid::Uuid;

fn user(id: u128, height_cm: Option<f64>, weight_kg: Option<f64>) -> UserRow {
    let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    UserRow {
        id: Uuid::from_u128(id),
        username: format!("user-{id}"),
        avatar_url: None,
        height_cm,
        weight_kg,
        created_at: t,
        last_active_at: t,
    }
}

#[test]
fn test_same_row_renders_per_viewer_units() {
    let row = user(1, Some(178.0), Some(82.0));

    let metric = UserView::render(row.clone(), UnitSystem::Metric);
    assert_eq!(metric.height.as_deref(), Some("178 cm"));
    assert_eq!(metric.weight.as_deref(), Some("82 kg"));

    let imperial = UserView::render(row, UnitSystem::Imperial);
    assert_eq!(imperial.height.as_deref(), Some("5'10\""));
    assert_eq!(imperial.weight.as_deref(), Some("181 lb"));
}

#[test]
fn test_missing_metrics_render_as_null_not_zero() {
    let view = UserView::render(user(2, None, None), UnitSystem::Imperial);
    assert_eq!(view.height, None);
    assert_eq!(view.weight, None);
}

#[test]
fn test_rendering_keeps_page_cursor() {
    let rows = vec![user(3, None, None), user(2, None, None)];
    let page = Page::from_rows(rows, 2);
    let token = page.next_cursor.clone();
    assert!(token.is_some());

    let rendered = page.map(|u| UserView::render(u, UnitSystem::Metric));
    assert_eq!(rendered.next_cursor, token);
    assert_eq!(rendered.items.len(), 2);
}

#[test]
fn test_inch_carry_goes_to_next_foot() {
    // 182.5 cm rounds to 12 inches past 5 feet; must render 6'0".
    assert_eq!(
        units::format_height(Some(182.5), UnitSystem::Imperial).as_deref(),
        Some("6'0\"")
    );
}

#[test]
fn test_sampler_is_deterministic_across_instances() {
    let config = SampleConfig {
        salt: "vigor-daily-sample-v1".to_string(),
        utc_offset_hours: -5,
    };
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap();

    // Two cold starts (separate instances) agree on the day's pivot.
    let a = DailySampler::new(&config).pivot_for(now);
    let b = DailySampler::new(&config).pivot_for(now);
    assert_eq!(a, b);

    // The next day rotates the ring elsewhere.
    let tomorrow = now + Duration::days(1);
    assert_ne!(a, DailySampler::new(&config).pivot_for(tomorrow));
}

#[test]
fn test_sampler_day_flips_at_reference_midnight() {
    let config = SampleConfig {
        salt: "s".to_string(),
        utc_offset_hours: -5,
    };
    let sampler = DailySampler::new(&config);

    // 04:59 UTC and 05:01 UTC straddle midnight at UTC-5.
    let before = Utc.with_ymd_and_hms(2024, 3, 2, 4, 59, 0).unwrap();
    let after = Utc.with_ymd_and_hms(2024, 3, 2, 5, 1, 0).unwrap();
    assert_ne!(sampler.pivot_for(before), sampler.pivot_for(after));
    assert_eq!(sampler.day_key(before), "2024-03-01");
    assert_eq!(sampler.day_key(after), "2024-03-02");
}

#[tokio::test]
async fn test_shared_poller_runs_one_task_for_all_subscribers() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration as StdDuration;

    let running = Arc::new(AtomicUsize::new(0));
    let running_inner = Arc::clone(&running);
    let poller = SharedPoller::new(StdDuration::from_millis(5), move || {
        let running = Arc::clone(&running_inner);
        Box::pin(async move {
            running.fetch_add(1, Ordering::SeqCst);
        })
    });

    let a = poller.subscribe();
    let b = poller.subscribe();
    let c = poller.subscribe();
    assert_eq!(poller.subscriber_count(), 3);
    assert!(poller.is_running());

    drop(a);
    drop(b);
    assert!(poller.is_running());

    drop(c);
    assert!(!poller.is_running());

    let at_stop = running.load(Ordering::SeqCst);
    tokio::time::sleep(StdDuration::from_millis(30)).await;
    assert_eq!(running.load(Ordering::SeqCst), at_stop);
}
