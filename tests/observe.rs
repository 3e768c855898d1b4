use anyhow::Result;
use futures::StreamExt;
use triplog::Totals;

#[path = "util.rs"]
mod util;

#[tokio::test]
async fn observe_all_delivers_current_rows_up_front() -> Result<()> {
    let repo = util::memory_repo().await;

    repo.add(&util::input("First", "Adama", 10.0)).await?;
    let second = repo.add(&util::input("Second", "Jimma", 20.0)).await?;

    let sub = repo.observe_all().await?;
    let trips = sub.current();
    assert_eq!(trips.len(), 2);
    assert_eq!(trips[0].id, second.id);
    Ok(())
}

#[tokio::test]
async fn observe_all_follows_adds_updates_and_deletes() -> Result<()> {
    let repo = util::memory_repo().await;
    let mut sub = repo.observe_all().await?;
    assert!(sub.current().is_empty());

    let mut trip = repo.add(&util::input("Fresh", "Adama", 10.0)).await?;
    assert!(sub.changed().await);
    assert_eq!(sub.current().len(), 1);

    trip.name = "Renamed".into();
    repo.update(&trip).await?;
    assert!(sub.changed().await);
    assert_eq!(sub.current()[0].name, "Renamed");

    repo.remove(&trip).await?;
    assert!(sub.changed().await);
    assert!(sub.current().is_empty());
    Ok(())
}

#[tokio::test]
async fn observe_filtered_only_carries_matching_rows() -> Result<()> {
    let repo = util::memory_repo().await;
    let mut sub = repo.observe_filtered("Ad").await?;

    repo.add(&util::input("Biruk", "Addis Ababa", 5.0)).await?;
    assert!(sub.changed().await);
    assert_eq!(sub.current().len(), 1);

    // An unrelated row still triggers a delivery; the content may not
    // change but it must stay filtered.
    repo.add(&util::input("Abel", "Gondar", 7.0)).await?;
    assert!(sub.changed().await);
    let trips = sub.current();
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].name, "Biruk");
    Ok(())
}

#[tokio::test]
async fn observe_totals_starts_at_zero_on_empty_store() -> Result<()> {
    let repo = util::memory_repo().await;
    let sub = repo.observe_totals().await?;

    assert_eq!(sub.current(), Totals::default());
    assert_eq!(sub.current().net(), 0.0);
    Ok(())
}

#[tokio::test]
async fn observe_totals_tracks_each_mutation() -> Result<()> {
    let repo = util::memory_repo().await;
    let mut sub = repo.observe_totals().await?;

    let first = repo
        .add(&util::full_input(
            "North", "Adama", "Mekelle", 780.0, 100.0, 40.0, "2024-01-05",
        ))
        .await?;
    assert!(sub.changed().await);
    assert_eq!(
        sub.current(),
        Totals {
            income: 100.0,
            cost: 40.0
        }
    );

    repo.add(&util::full_input(
        "South", "Adama", "Hawassa", 270.0, 50.0, 10.0, "2024-01-09",
    ))
    .await?;
    assert!(sub.changed().await);
    let totals = sub.current();
    assert_eq!(
        totals,
        Totals {
            income: 150.0,
            cost: 50.0
        }
    );
    assert_eq!(totals.net(), 100.0);

    repo.remove(&first).await?;
    assert!(sub.changed().await);
    assert_eq!(
        sub.current(),
        Totals {
            income: 50.0,
            cost: 10.0
        }
    );
    Ok(())
}

#[tokio::test]
async fn clones_share_one_change_feed() -> Result<()> {
    let repo = util::memory_repo().await;
    let mut sub = repo.observe_all().await?;

    let writer = repo.clone();
    writer.add(&util::input("Via clone", "Adama", 12.0)).await?;

    assert!(sub.changed().await);
    assert_eq!(sub.current().len(), 1);
    Ok(())
}

#[tokio::test]
async fn two_subscriptions_see_their_own_queries() -> Result<()> {
    let repo = util::memory_repo().await;
    let mut all = repo.observe_all().await?;
    let mut filtered = repo.observe_filtered("Addis").await?;

    repo.add(&util::input("Biruk", "Addis Ababa", 5.0)).await?;
    repo.add(&util::input("Abel", "Gondar", 7.0)).await?;

    assert!(all.changed().await);
    assert!(filtered.changed().await);

    // Drain any second delivery from the two back-to-back writes before
    // comparing final content.
    while all.current().len() < 2 {
        assert!(all.changed().await);
    }
    assert_eq!(all.current().len(), 2);
    assert_eq!(filtered.current().len(), 1);
    assert_eq!(filtered.current()[0].destination, "Addis Ababa");
    Ok(())
}

#[tokio::test]
async fn into_stream_yields_initial_value_then_updates() -> Result<()> {
    let repo = util::memory_repo().await;
    repo.add(&util::input("Seed", "Adama", 9.0)).await?;

    let sub = repo.observe_all().await?;
    let mut stream = Box::pin(sub.into_stream());

    let initial = stream.next().await.expect("initial value");
    assert_eq!(initial.len(), 1);

    repo.add(&util::input("Next", "Jimma", 11.0)).await?;
    let updated = stream.next().await.expect("update after add");
    assert_eq!(updated.len(), 2);
    Ok(())
}

#[tokio::test]
async fn dropped_subscription_does_not_block_mutations() -> Result<()> {
    let repo = util::memory_repo().await;

    let sub = repo.observe_all().await?;
    drop(sub);

    repo.add(&util::input("After drop", "Adama", 3.0)).await?;
    assert_eq!(repo.count().await?, 1);
    Ok(())
}
