use std::sync::Arc;

use chrono::Duration;
use drill_core::model::{
    DigitRange, OperationConfig, OperationKind, PracticeSettings, SessionCounters, SessionLength,
    SessionSummary, SummaryId, SummarySettings, TerminationReason,
};
use drill_core::time::fixed_now;
use rand::SeedableRng;
use rand::rngs::StdRng;
use storage::keyed::{KeyedHistory, KeyedSettings, SUMMARIES_KEY};
use storage::repository::{HistoryRepository, KeyValueStore, SettingsRepository, Storage};
use storage::sqlite::SqliteRepository;

fn build_summary(rng: &mut StdRng, minute: i64, correct: u32) -> SessionSummary {
    let started = fixed_now() + Duration::minutes(minute);
    SessionSummary::from_counters(
        SummaryId::random(rng),
        started,
        started + Duration::seconds(60),
        SummarySettings {
            skills: vec![OperationKind::Addition, OperationKind::Division],
            length_sec: SessionLength::Standard,
            termination_reason: TerminationReason::Timeout,
        },
        &SessionCounters {
            attempted: 10,
            correct,
            sum_response_time_ms: 25_000,
            current_streak: 0,
            max_streak: correct.min(4),
        },
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_kv_entries_upsert_and_remove() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo.migrate().await.expect("migrations are idempotent");

    repo.set("lengthSec", "30").await.unwrap();
    repo.set("lengthSec", "120").await.unwrap();
    assert_eq!(repo.get("lengthSec").await.unwrap().as_deref(), Some("120"));

    repo.remove("lengthSec").await.unwrap();
    assert_eq!(repo.get("lengthSec").await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_backs_settings_and_history() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_history?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    let kv: Arc<dyn KeyValueStore> = Arc::new(repo.clone());
    let settings_repo = KeyedSettings::new(Arc::clone(&kv));
    let history = KeyedHistory::new(kv);

    let config = OperationConfig::only(&[OperationKind::Multiplication]).with_digits(
        OperationKind::Multiplication,
        DigitRange::new(1, 2),
        DigitRange::single(2),
    );
    let settings = PracticeSettings::new(config, SessionLength::Short);
    settings_repo.save_settings(&settings).await.unwrap();
    assert_eq!(settings_repo.get_settings().await.unwrap(), Some(settings));

    let mut rng = StdRng::seed_from_u64(77);
    let summaries: Vec<_> = (0..12)
        .map(|i| build_summary(&mut rng, i, u32::try_from(i % 10).unwrap()))
        .collect();
    for summary in &summaries {
        history.append(summary).await.unwrap();
    }

    let listed = history.list(usize::MAX).await.unwrap();
    assert_eq!(listed.len(), 10);
    assert_eq!(listed[0], summaries[11]);
    assert_eq!(history.latest().await.unwrap(), Some(summaries[11].clone()));

    let raw = repo.get(SUMMARIES_KEY).await.unwrap().expect("summaries stored");
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["settings"]["skills"][1], "division");
    assert_eq!(json[0]["totals"]["avgTimeMs"], 2_500);
}

#[tokio::test]
async fn storage_sqlite_wires_repositories() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    assert!(storage.settings.get_settings().await.unwrap().is_none());
    assert!(storage.history.latest().await.unwrap().is_none());

    let mut rng = StdRng::seed_from_u64(78);
    let summary = build_summary(&mut rng, 0, 5);
    storage.history.append(&summary).await.unwrap();
    assert!(storage.kv.get("lastSummary").await.unwrap().is_some());
}
