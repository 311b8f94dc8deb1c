//! CLI demo for the studio booking engine.
//!
//! Seeds the rolling calendar and a starter entitlement, then walks through
//! booking, cancellation, rescheduling, a package purchase, and a replayed
//! checkout return trip.

use std::sync::Arc;

use studio_booking::catalog::Catalog;
use studio_booking::checkout::{StaticCheckoutGateway, checkout_redirect};
use studio_booking::engine::StudioEnvironment;
use studio_booking::state::{StudioAction, StudioState};
use studio_booking::store::StudioStore;
use studio_booking::types::{PackageId, User, UserId};
use studio_core::environment::{Clock, SystemClock};
use tracing_subscriber::EnvFilter;
use url::Url;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Studio Booking: Engine Walkthrough ===\n");

    let clock = Arc::new(SystemClock);
    let now = clock.now();

    // Catalog provider seeds the calendar; the engine treats it as read-only
    let catalog = Catalog::standard();
    let sessions = catalog.generate_sessions(now.date_naive(), 14);
    println!("Calendar: {} sessions over the next two weeks", sessions.len());

    let user = User {
        id: UserId::new("user-1"),
        name: "Maya Quintero".to_string(),
        email: "maya@example.com".to_string(),
        phone: Some("+1 (555) 123-4567".to_string()),
        active_packages: Vec::new(),
    };

    let mut state = StudioState::new(catalog, sessions, user);
    state.grant_starter_package(now);

    let store = StudioStore::new(state, StudioEnvironment::new(clock));
    println!(
        "Starter entitlement granted; classes remaining (display): {}\n",
        store.total_classes_remaining().await
    );

    // Pick two slots at least two days out (safely outside the 12-hour
    // window); skip past Sundays, which have no sessions
    let mut day = Vec::new();
    for offset in 2..9 {
        day = store
            .classes_for_date(now.date_naive() + chrono::Duration::days(offset))
            .await;
        if day.len() >= 2 {
            break;
        }
    }
    let Some(first) = day.first().cloned() else {
        println!("No bookable sessions in the calendar");
        return Ok(());
    };
    let second = day[1].clone();

    println!("Booking {} at {}...", first.date, first.start_time);
    store
        .dispatch(StudioAction::BookClass {
            session_id: first.id.clone(),
        })
        .await?;

    println!("Booking the same session again...");
    store
        .dispatch(StudioAction::BookClass {
            session_id: first.id.clone(),
        })
        .await?;
    if let Some(reason) = store.last_rejection().await {
        println!("  denied: {reason}");
    }

    // Move the booking to the next slot
    let booking_id = store.confirmed_bookings().await[0].id.clone();
    println!("\nMoving the booking to {}...", second.start_time);
    store
        .dispatch(StudioAction::MoveBooking {
            booking_id: booking_id.clone(),
            new_session_id: second.id.clone(),
        })
        .await?;

    // Cancel it again (48 hours out, well clear of the window)
    println!("Cancelling the booking...");
    store
        .dispatch(StudioAction::CancelBooking { booking_id })
        .await?;
    println!(
        "Confirmed bookings: {}, history entries: {}",
        store.confirmed_bookings().await.len(),
        store.booking_history().await.len()
    );

    // Purchase flow: resolve the redirect, then settle the return trip
    let package_id = PackageId::new("pack-5");
    let gateway = StaticCheckoutGateway::new()
        .with_default("https://pay.example/studio")
        .shared();
    match checkout_redirect(gateway.as_ref(), &package_id) {
        Ok(url) => println!("\nCheckout redirect for {package_id}: {url}"),
        Err(error) => println!("\n{error}"),
    }

    let landing = Url::parse(
        "https://studio.example/account?payment=success&packageId=pack-5&session_id=cs_demo_1",
    )?;
    let cleaned = store.process_return_url(&landing).await?;
    println!("Return trip settled; address cleaned to: {cleaned}");

    // A reload of the same address must not grant a second entitlement
    store.process_return_url(&landing).await?;
    let state = store.state().await;
    println!(
        "Entitlements after replayed return: {} (reference settled: {})",
        state.ledger.packages().len(),
        state.payment_processed("cs_demo_1")
    );

    Ok(())
}
