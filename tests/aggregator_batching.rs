//! Batch aggregation invariants.
//!
//! The aggregator must issue one grouped query per (statistic × kind)
//! plus one membership query per kind with a requester (never one query
//! per item), and must return a complete zero-seeded record for every
//! requested id.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use plaza::application::repos::{RepoError, StatsRepo};
use plaza::application::stats::StatsService;
use plaza::domain::content::{ContentKind, ContentRef, Statistic};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct QueryLog {
    kind: ContentKind,
    statistic: Option<Statistic>,
    batch_size: usize,
}

#[derive(Default)]
struct FakeStore {
    counts: Mutex<HashMap<(ContentKind, Statistic), HashMap<Uuid, u64>>>,
    liked: Mutex<HashMap<ContentKind, HashSet<Uuid>>>,
    queries: Mutex<Vec<QueryLog>>,
    count_queries: AtomicUsize,
    membership_queries: AtomicUsize,
    fail_on: Mutex<Option<(ContentKind, Statistic)>>,
}

impl FakeStore {
    fn seed_counts(&self, kind: ContentKind, statistic: Statistic, counts: &[(Uuid, u64)]) {
        self.counts
            .lock()
            .expect("counts lock")
            .insert((kind, statistic), counts.iter().copied().collect());
    }

    fn seed_liked(&self, kind: ContentKind, ids: &[Uuid]) {
        self.liked
            .lock()
            .expect("liked lock")
            .insert(kind, ids.iter().copied().collect());
    }

    fn fail_on(&self, kind: ContentKind, statistic: Statistic) {
        *self.fail_on.lock().expect("fail_on lock") = Some((kind, statistic));
    }

    fn queries(&self) -> Vec<QueryLog> {
        self.queries.lock().expect("queries lock").clone()
    }
}

#[async_trait]
impl StatsRepo for FakeStore {
    async fn count_grouped(
        &self,
        kind: ContentKind,
        statistic: Statistic,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, u64>, RepoError> {
        self.count_queries.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().expect("queries lock").push(QueryLog {
            kind,
            statistic: Some(statistic),
            batch_size: ids.len(),
        });

        if *self.fail_on.lock().expect("fail_on lock") == Some((kind, statistic)) {
            return Err(RepoError::from_persistence("induced failure"));
        }

        let counts = self.counts.lock().expect("counts lock");
        let stored = counts.get(&(kind, statistic)).cloned().unwrap_or_default();
        Ok(stored
            .into_iter()
            .filter(|(id, _)| ids.contains(id))
            .collect())
    }

    async fn liked_by_user(
        &self,
        kind: ContentKind,
        _user_id: Uuid,
        ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError> {
        self.membership_queries.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().expect("queries lock").push(QueryLog {
            kind,
            statistic: None,
            batch_size: ids.len(),
        });

        let liked = self.liked.lock().expect("liked lock");
        let stored = liked.get(&kind).cloned().unwrap_or_default();
        Ok(stored.into_iter().filter(|id| ids.contains(id)).collect())
    }
}

fn service(store: &Arc<FakeStore>) -> StatsService {
    StatsService::new(Arc::clone(store) as Arc<dyn StatsRepo>)
}

fn refs(kind: ContentKind, count: usize) -> Vec<ContentRef> {
    (0..count)
        .map(|_| ContentRef::new(Uuid::new_v4(), kind))
        .collect()
}

#[tokio::test]
async fn query_count_is_constant_in_batch_size() {
    let store = Arc::new(FakeStore::default());
    let stats = service(&store);

    let mut batch = refs(ContentKind::Post, 250);
    batch.extend(refs(ContentKind::Task, 250));

    let merged = stats
        .batch(&batch, Some(Uuid::new_v4()))
        .await
        .expect("aggregation succeeds");

    assert_eq!(merged.len(), 500);
    // posts carry likes/comments/views, tasks only likes/views
    assert_eq!(store.count_queries.load(Ordering::SeqCst), 5);
    assert_eq!(store.membership_queries.load(Ordering::SeqCst), 2);

    // each grouped query saw the whole per-kind batch, not per-item slices
    for query in store.queries() {
        assert_eq!(query.batch_size, 250);
    }
}

#[tokio::test]
async fn empty_input_issues_no_queries() {
    let store = Arc::new(FakeStore::default());
    let stats = service(&store);

    let merged = stats.batch(&[], Some(Uuid::new_v4())).await.expect("empty");

    assert!(merged.is_empty());
    assert_eq!(store.count_queries.load(Ordering::SeqCst), 0);
    assert_eq!(store.membership_queries.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn absent_kinds_issue_no_queries() {
    let store = Arc::new(FakeStore::default());
    let stats = service(&store);

    let batch = refs(ContentKind::Confession, 3);
    stats.batch(&batch, None).await.expect("aggregation");

    for query in store.queries() {
        assert_eq!(query.kind, ContentKind::Confession);
    }
}

#[tokio::test]
async fn membership_queries_require_a_requester() {
    let store = Arc::new(FakeStore::default());
    let stats = service(&store);

    stats
        .batch(&refs(ContentKind::Post, 4), None)
        .await
        .expect("aggregation");

    assert_eq!(store.membership_queries.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn comment_queries_are_skipped_for_kinds_without_comments() {
    let store = Arc::new(FakeStore::default());
    let stats = service(&store);

    let mut batch = refs(ContentKind::MarketItem, 2);
    batch.extend(refs(ContentKind::Task, 2));
    let merged = stats.batch(&batch, None).await.expect("aggregation");

    for query in store.queries() {
        assert_ne!(query.statistic, Some(Statistic::Comments));
    }
    // ...and the skipped statistic defaults to zero rather than erroring
    for record in merged.values() {
        assert_eq!(record.comment_count, 0);
    }
}

#[tokio::test]
async fn duplicate_refs_are_deduplicated() {
    let store = Arc::new(FakeStore::default());
    let stats = service(&store);

    let item = ContentRef::new(Uuid::new_v4(), ContentKind::Post);
    let merged = stats
        .batch(&[item, item, item], None)
        .await
        .expect("aggregation");

    assert_eq!(merged.len(), 1);
    for query in store.queries() {
        assert_eq!(query.batch_size, 1);
    }
}

#[tokio::test]
async fn ids_without_activity_yield_zero_records() {
    let store = Arc::new(FakeStore::default());
    let stats = service(&store);

    let batch = refs(ContentKind::Post, 2);
    let merged = stats.batch(&batch, None).await.expect("aggregation");

    for item in &batch {
        let record = merged.get(&item.id).expect("record present");
        assert_eq!(
            (record.like_count, record.comment_count, record.view_count, record.is_liked),
            (0, 0, 0, false)
        );
    }
}

#[tokio::test]
async fn grouped_counts_merge_into_the_right_fields() {
    let store = Arc::new(FakeStore::default());
    let stats = service(&store);

    let a = ContentRef::new(Uuid::new_v4(), ContentKind::Post);
    let b = ContentRef::new(Uuid::new_v4(), ContentKind::Post);
    let c = ContentRef::new(Uuid::new_v4(), ContentKind::MarketItem);

    store.seed_counts(ContentKind::Post, Statistic::Likes, &[(a.id, 3)]);
    store.seed_counts(ContentKind::Post, Statistic::Comments, &[(a.id, 1)]);
    store.seed_counts(ContentKind::Post, Statistic::Views, &[(a.id, 10), (b.id, 2)]);
    store.seed_counts(ContentKind::MarketItem, Statistic::Likes, &[(c.id, 1)]);
    store.seed_counts(ContentKind::MarketItem, Statistic::Views, &[(c.id, 5)]);

    let merged = stats.batch(&[a, b, c], None).await.expect("aggregation");

    let rec_a = merged[&a.id];
    assert_eq!(
        (rec_a.like_count, rec_a.comment_count, rec_a.view_count, rec_a.is_liked),
        (3, 1, 10, false)
    );
    let rec_b = merged[&b.id];
    assert_eq!(
        (rec_b.like_count, rec_b.comment_count, rec_b.view_count, rec_b.is_liked),
        (0, 0, 2, false)
    );
    let rec_c = merged[&c.id];
    assert_eq!(
        (rec_c.like_count, rec_c.comment_count, rec_c.view_count, rec_c.is_liked),
        (1, 0, 5, false)
    );
}

#[tokio::test]
async fn requester_membership_sets_is_liked() {
    let store = Arc::new(FakeStore::default());
    let stats = service(&store);

    let a = ContentRef::new(Uuid::new_v4(), ContentKind::Confession);
    let b = ContentRef::new(Uuid::new_v4(), ContentKind::Confession);
    store.seed_liked(ContentKind::Confession, &[a.id]);

    let merged = stats
        .batch(&[a, b], Some(Uuid::new_v4()))
        .await
        .expect("aggregation");

    assert!(merged[&a.id].is_liked);
    assert!(!merged[&b.id].is_liked);
}

#[tokio::test]
async fn one_failed_subquery_fails_the_whole_batch() {
    let store = Arc::new(FakeStore::default());
    let stats = service(&store);
    store.fail_on(ContentKind::Post, Statistic::Views);

    let mut batch = refs(ContentKind::Post, 3);
    batch.extend(refs(ContentKind::Task, 3));

    let result = stats.batch(&batch, None).await;
    assert!(result.is_err(), "no partially-merged result is returned");
}
