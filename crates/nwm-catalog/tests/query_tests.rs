//! Tests for time series, file counts and selections over a local NWM tree.

use chrono::NaiveDate;
use nwm_catalog::{Catalog, Explorer, FileFilter};
use std::sync::Arc;
use test_utils::{assert_steps_ascending, sample_date, NwmTree};

fn next_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 8, 22).unwrap()
}

/// Two days of output:
/// - 2020-08-21 short_range: channel_rt t06z f001-f018, land t06z f001-f003, channel_rt t07z f001-f002
/// - 2020-08-21 medium_range members 1 and 2: channel_rt t00z f003, f006, f009
/// - 2020-08-22 short_range: channel_rt t06z f001-f002
fn tree() -> NwmTree {
    let date = sample_date();
    NwmTree::new()
        .with_series(date, "short_range", "channel_rt", None, 6, (1..=18).rev(), "conus")
        .with_series(date, "short_range", "land", None, 6, 1..=3, "conus")
        .with_series(date, "short_range", "channel_rt", None, 7, 1..=2, "conus")
        .with_series(date, "medium_range", "channel_rt", Some(1), 0, [9, 3, 6], "conus")
        .with_series(date, "medium_range", "channel_rt", Some(2), 0, [3, 6, 9], "conus")
        .with_file(date, "short_range", None, "nwm.t06z.short_range.channel_rt.f001.conus.nc.md5")
        .with_file(date, "short_range", None, "broken.nc")
        .with_series(next_day(), "short_range", "channel_rt", None, 6, 1..=2, "conus")
}

/// Files written by [`tree`] that parse as NWM output.
const VALID_FILES: usize = 18 + 3 + 2 + 3 + 3 + 2;

async fn explore(tree: &NwmTree) -> Arc<Catalog> {
    let explorer = Explorer::new(Some(tree.address().as_str()), "local").unwrap();
    explorer.explore().await.unwrap()
}

// ============================================================================
// Time series
// ============================================================================

#[tokio::test]
async fn test_configuration_time_series_sorted_by_step() {
    let tree = tree();
    let catalog = explore(&tree).await;
    let day = catalog.get(sample_date()).await.unwrap().unwrap();
    let short_range = day.get("short_range").await.unwrap().unwrap();

    let files = short_range.time_series("channel_rt", 6).await.unwrap();
    assert_eq!(files.len(), 18);
    assert_steps_ascending!(files);
    assert_eq!(files[0].step, Some(1));

    let same = day.time_series("short_range", "channel_rt", 6).await.unwrap();
    assert_eq!(same, files);
    assert!(day.time_series("long_range", "channel_rt", 6).await.unwrap().is_empty());

    let via_catalog = catalog
        .time_series(sample_date(), "short_range", "channel_rt", 7)
        .await
        .unwrap();
    assert_eq!(via_catalog.len(), 2);
}

#[tokio::test]
async fn test_all_time_series_partitions_every_file() {
    let tree = tree();
    let catalog = explore(&tree).await;
    let day = catalog.get(sample_date()).await.unwrap().unwrap();
    let short_range = day.get("short_range").await.unwrap().unwrap();

    let total = short_range.len().await.unwrap();
    let series = short_range.all_time_series().await.unwrap();

    // (channel_rt, 6), (land, 6), (channel_rt, 7)
    assert_eq!(series.len(), 3);
    assert_eq!(series.iter().map(|s| s.len()).sum::<usize>(), total);
    for s in &series {
        assert_steps_ascending!(s.files());
        assert_eq!(s.area(), "conus");
        assert_eq!(s.day().date, sample_date());
        assert!(s.iter().all(|file| file.model_type == s.model_type() && file.reference == s.reference()));
    }

    let longest = series.iter().max_by_key(|s| s.len()).unwrap();
    assert_eq!(
        longest.to_string(),
        "short_range channel_rt over conus at t06Z on 2020-08-21 (Steps = 18)"
    );
}

#[tokio::test]
async fn test_catalog_time_series_across_days_and_members() {
    let tree = tree();
    let catalog = explore(&tree).await;

    let short_range = catalog.all_time_series("short_range", "CHANNEL_RT").await.unwrap();
    // Two runs on the first day, one on the second
    assert_eq!(short_range.len(), 3);

    let medium_range = catalog.all_time_series("medium_range", "channel_rt").await.unwrap();
    let mut members: Vec<_> = medium_range.iter().map(|s| s.member()).collect();
    members.sort();
    assert_eq!(members, vec![Some(1), Some(2)]);
    assert!(medium_range.iter().all(|s| s.len() == 3));

    assert!(catalog.all_time_series("long_range", "channel_rt").await.unwrap().is_empty());
}

// ============================================================================
// File counts
// ============================================================================

#[tokio::test]
async fn test_file_count_without_filters_counts_everything() {
    let tree = tree();
    let catalog = explore(&tree).await;

    assert_eq!(catalog.file_count(&FileFilter::new()).await.unwrap(), VALID_FILES);
    assert_eq!(catalog.all_files().await.unwrap().len(), VALID_FILES);

    let day = catalog.get(sample_date()).await.unwrap().unwrap();
    assert_eq!(day.file_count(&FileFilter::new()).await.unwrap(), day.all_files().await.unwrap().len());
}

#[tokio::test]
async fn test_file_count_with_filters() {
    let tree = tree();
    let catalog = explore(&tree).await;

    let impossible = FileFilter::new().with_area("mars");
    assert_eq!(catalog.file_count(&impossible).await.unwrap(), 0);

    let land = FileFilter::new().with_model_type("land");
    assert_eq!(catalog.file_count(&land).await.unwrap(), 3);

    let first_steps = FileFilter::new()
        .with_configuration_type("short_range")
        .with_step(1);
    assert_eq!(catalog.file_count(&first_steps).await.unwrap(), 4);

    let next_day = FileFilter::new().with_date(next_day());
    assert_eq!(catalog.file_count(&next_day).await.unwrap(), 2);

    let member = FileFilter::new().with_member(2).with_reference(0);
    assert_eq!(catalog.file_count(&member).await.unwrap(), 3);

    let missing_day = FileFilter::new().with_date(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap());
    assert_eq!(catalog.file_count(&missing_day).await.unwrap(), 0);
}

// ============================================================================
// Selection
// ============================================================================

#[tokio::test]
async fn test_select_always_true_keeps_every_file() {
    let tree = tree();
    let catalog = explore(&tree).await;

    let selected = catalog.select_files(|_| true).await.unwrap();
    assert_eq!(selected.all_files().await.unwrap().len(), VALID_FILES);
    assert_eq!(selected.len().await.unwrap(), 2);
}

#[tokio::test]
async fn test_select_always_false_is_empty() {
    let tree = tree();
    let catalog = explore(&tree).await;

    let selected = catalog.select_files(|_| false).await.unwrap();
    assert!(selected.is_empty().await.unwrap());

    let selected = catalog.select_configurations(|_| false).await.unwrap();
    assert!(selected.is_empty().await.unwrap());

    let selected = catalog.select_days(|_| false).await.unwrap();
    assert!(selected.is_empty().await.unwrap());
}

#[tokio::test]
async fn test_select_prunes_and_leaves_source_intact() {
    let tree = tree();
    let catalog = explore(&tree).await;

    let land = catalog.select_files(|file| file.model_type == "land").await.unwrap();
    assert_eq!(land.len().await.unwrap(), 1);
    let day = land.get(sample_date()).await.unwrap().unwrap();
    assert_eq!(day.len().await.unwrap(), 1);
    assert_eq!(day.all_files().await.unwrap().len(), 3);

    let ensembles = catalog
        .select_configurations(|configuration| configuration.member().is_some())
        .await
        .unwrap();
    assert_eq!(ensembles.len().await.unwrap(), 1);
    assert_eq!(ensembles.all_files().await.unwrap().len(), 6);

    let later = catalog.select_days(|day| day.date() > sample_date()).await.unwrap();
    assert_eq!(later.len().await.unwrap(), 1);

    assert_eq!(catalog.len().await.unwrap(), 2);
    assert_eq!(catalog.all_files().await.unwrap().len(), VALID_FILES);
}
