use storage::repository::{ProgressRepository, StorageError};
use storage::sqlite::SqliteRepository;
use tracker_core::model::{QuestionPatch, TopicPatch, TopicPosition};
use tracker_core::seed::default_topics;

async fn repo(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_seeds_and_lists_in_position_order() {
    let repo = repo("memdb_seed").await;
    assert!(repo.list_topics().await.unwrap().is_empty());

    let seed = default_topics().unwrap();
    let seeded = repo.seed_if_empty(&seed).await.unwrap();
    assert_eq!(seeded, seed);

    let listed = repo.list_topics().await.unwrap();
    let positions: Vec<u32> = listed.iter().map(|t| t.position().value()).collect();
    assert_eq!(positions, (0..15).collect::<Vec<_>>());
}

#[tokio::test]
async fn sqlite_patch_persists_notes_and_flags() {
    let repo = repo("memdb_patch").await;
    let seed = default_topics().unwrap();
    repo.seed_if_empty(&seed).await.unwrap();

    let patch = TopicPatch::new()
        .question(0, QuestionPatch::new().done(true))
        .question(2, QuestionPatch::new().bookmark(true).notes("revisit"));
    repo.patch_topic(TopicPosition::new(11), &patch)
        .await
        .unwrap();
    // same patch again: idempotent
    repo.patch_topic(TopicPosition::new(11), &patch)
        .await
        .unwrap();

    let listed = repo.list_topics().await.unwrap();
    let graph = &listed[11];
    assert!(graph.questions()[0].done());
    assert!(graph.questions()[2].bookmark());
    assert_eq!(graph.questions()[2].notes(), Some("revisit"));
    assert_eq!(graph.questions().len(), seed[11].questions().len());
    assert_eq!(listed[10], seed[10]);
}

#[tokio::test]
async fn sqlite_patch_out_of_range_changes_nothing() {
    let repo = repo("memdb_patch_oob").await;
    let seed = default_topics().unwrap();
    repo.seed_if_empty(&seed).await.unwrap();

    let len = seed[0].questions().len();
    let patch = TopicPatch::new()
        .question(0, QuestionPatch::new().done(true))
        .question(len, QuestionPatch::new().done(true));
    let err = repo
        .patch_topic(TopicPosition::new(0), &patch)
        .await
        .unwrap_err();
    assert_eq!(err, StorageError::NotFound);
    assert_eq!(repo.list_topics().await.unwrap(), seed);

    let err = repo
        .patch_topic(TopicPosition::new(99), &TopicPatch::new())
        .await
        .unwrap_err();
    assert_eq!(err, StorageError::NotFound);
}

#[tokio::test]
async fn sqlite_replace_all_and_clear() {
    let repo = repo("memdb_replace").await;
    let seed = default_topics().unwrap();
    repo.seed_if_empty(&seed).await.unwrap();

    let edited: Vec<_> = seed
        .iter()
        .map(|t| {
            t.apply_patch(&TopicPatch::single(0, QuestionPatch::new().done(true)))
                .unwrap()
        })
        .collect();
    repo.replace_all(&edited).await.unwrap();
    assert_eq!(repo.list_topics().await.unwrap(), edited);

    repo.clear().await.unwrap();
    assert!(repo.list_topics().await.unwrap().is_empty());

    let reseeded = repo.seed_if_empty(&seed).await.unwrap();
    assert_eq!(reseeded, seed);
}
