use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use domain::{
    entities::subscriptions::{SubscriptionEntity, UpdateSubscriptionStatusEntity},
    repositories::subscriptions::SubscriptionRepository,
    value_objects::{
        enums::subscription_statuses::SubscriptionStatus,
        pagination::{Page, PageRequest},
        payments::PaymentApplication,
    },
};

use crate::redis_store::subscription_cache::{CachedSubscription, SubscriptionCache};

/// Read-through cache in front of the subscription table. Writes go to the store first and then
/// delete the cached entry. Cache failures fall back to the store.
pub struct CachedSubscriptionRepository {
    inner: Arc<dyn SubscriptionRepository + Send + Sync>,
    cache: Arc<dyn SubscriptionCache>,
}

impl CachedSubscriptionRepository {
    pub fn new(
        inner: Arc<dyn SubscriptionRepository + Send + Sync>,
        cache: Arc<dyn SubscriptionCache>,
    ) -> Self {
        Self { inner, cache }
    }

    async fn invalidate(&self, user_id: Uuid) {
        if let Err(err) = self.cache.invalidate(user_id).await {
            warn!(%user_id, cache_error = ?err, "cache: failed to invalidate subscription");
        }
    }
}

#[async_trait]
impl SubscriptionRepository for CachedSubscriptionRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<SubscriptionEntity>> {
        match self.cache.get(user_id).await {
            Ok(CachedSubscription::Present(subscription)) => return Ok(Some(subscription)),
            Ok(CachedSubscription::Absent) => return Ok(None),
            Ok(CachedSubscription::Miss) => {}
            Err(err) => {
                warn!(%user_id, cache_error = ?err, "cache: read failed, using database");
            }
        }

        let subscription = self.inner.find_by_user_id(user_id).await?;

        if let Err(err) = self.cache.put(user_id, subscription.clone()).await {
            warn!(%user_id, cache_error = ?err, "cache: failed to store subscription");
        }

        Ok(subscription)
    }

    async fn update_status(
        &self,
        user_id: Uuid,
        expected_status: SubscriptionStatus,
        update_entity: UpdateSubscriptionStatusEntity,
    ) -> Result<Option<SubscriptionEntity>> {
        let result = self
            .inner
            .update_status(user_id, expected_status, update_entity)
            .await;
        self.invalidate(user_id).await;
        result
    }

    async fn list_expiring(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<SubscriptionEntity>> {
        self.inner.list_expiring(from, to, page).await
    }

    async fn list_auto_renew_due(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<SubscriptionEntity>> {
        self.inner.list_auto_renew_due(from, to).await
    }

    async fn mark_expired(&self, now: DateTime<Utc>) -> Result<Vec<SubscriptionEntity>> {
        let expired = self.inner.mark_expired(now).await?;
        for subscription in &expired {
            self.invalidate(subscription.user_id).await;
        }
        Ok(expired)
    }

    async fn apply_paid_order(
        &self,
        order_id: String,
        now: DateTime<Utc>,
    ) -> Result<PaymentApplication> {
        let application = self.inner.apply_paid_order(order_id, now).await?;
        if let PaymentApplication::Applied(applied) = &application {
            self.invalidate(applied.subscription.user_id).await;
        }
        Ok(application)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redis_store::subscription_cache::MockSubscriptionCache;
    use chrono::Duration;
    use domain::repositories::subscriptions::MockSubscriptionRepository;
    use mockall::predicate::eq;

    fn subscription(user_id: Uuid) -> SubscriptionEntity {
        let now = Utc::now();
        SubscriptionEntity {
            user_subscription_id: 7,
            user_id,
            plan_id: Uuid::new_v4(),
            app_id: "app-1".to_string(),
            start_time: now,
            end_time: now + Duration::days(30),
            status: "active".to_string(),
            auto_renew: false,
            order_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn hit_skips_the_database() {
        let user_id = Uuid::new_v4();
        let cached = subscription(user_id);
        let expected = cached.clone();
        let mut cache = MockSubscriptionCache::new();
        cache
            .expect_get()
            .with(eq(user_id))
            .returning(move |_| Ok(CachedSubscription::Present(cached.clone())));
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_find_by_user_id().never();

        let found = CachedSubscriptionRepository::new(Arc::new(repo), Arc::new(cache))
            .find_by_user_id(user_id)
            .await
            .unwrap();

        assert_eq!(found, Some(expected));
    }

    #[tokio::test]
    async fn miss_loads_and_caches_negative_result() {
        let user_id = Uuid::new_v4();
        let mut cache = MockSubscriptionCache::new();
        cache
            .expect_get()
            .returning(|_| Ok(CachedSubscription::Miss));
        cache
            .expect_put()
            .with(eq(user_id), eq(None))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_find_by_user_id()
            .times(1)
            .returning(|_| Ok(None));

        let found = CachedSubscriptionRepository::new(Arc::new(repo), Arc::new(cache))
            .find_by_user_id(user_id)
            .await
            .unwrap();

        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn cache_outage_falls_back_to_database() {
        let user_id = Uuid::new_v4();
        let row = subscription(user_id);
        let mut cache = MockSubscriptionCache::new();
        cache
            .expect_get()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));
        cache
            .expect_put()
            .returning(|_, _| Err(anyhow::anyhow!("connection refused")));
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_find_by_user_id()
            .returning(move |_| Ok(Some(row.clone())));

        let found = CachedSubscriptionRepository::new(Arc::new(repo), Arc::new(cache))
            .find_by_user_id(user_id)
            .await
            .unwrap();

        assert_eq!(found.map(|s| s.user_id), Some(user_id));
    }

    #[tokio::test]
    async fn status_write_deletes_the_entry() {
        let user_id = Uuid::new_v4();
        let row = subscription(user_id);
        let mut cache = MockSubscriptionCache::new();
        cache
            .expect_invalidate()
            .with(eq(user_id))
            .times(1)
            .returning(|_| Ok(()));
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_update_status()
            .returning(move |_, _, _| Ok(Some(row.clone())));

        let updated = CachedSubscriptionRepository::new(Arc::new(repo), Arc::new(cache))
            .update_status(
                user_id,
                SubscriptionStatus::Active,
                UpdateSubscriptionStatusEntity {
                    status: "paused".to_string(),
                    auto_renew: false,
                    updated_at: Utc::now(),
                },
            )
            .await
            .unwrap();

        assert!(updated.is_some());
    }

    #[tokio::test]
    async fn sweep_invalidates_every_expired_user() {
        let rows = vec![subscription(Uuid::new_v4()), subscription(Uuid::new_v4())];
        let returned = rows.clone();
        let mut cache = MockSubscriptionCache::new();
        cache.expect_invalidate().times(2).returning(|_| Ok(()));
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_mark_expired()
            .returning(move |_| Ok(returned.clone()));

        let expired = CachedSubscriptionRepository::new(Arc::new(repo), Arc::new(cache))
            .mark_expired(Utc::now())
            .await
            .unwrap();

        assert_eq!(expired, rows);
    }

    #[tokio::test]
    async fn unknown_order_leaves_cache_alone() {
        let mut cache = MockSubscriptionCache::new();
        cache.expect_invalidate().never();
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_apply_paid_order()
            .returning(|_, _| Ok(PaymentApplication::OrderNotFound));

        let application = CachedSubscriptionRepository::new(Arc::new(repo), Arc::new(cache))
            .apply_paid_order("SUB1".to_string(), Utc::now())
            .await
            .unwrap();

        assert_eq!(application, PaymentApplication::OrderNotFound);
    }
}
