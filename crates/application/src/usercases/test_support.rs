//! In-memory doubles for scenario tests that need shared state across usecases.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::{
    collections::HashMap,
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};
use uuid::Uuid;

use domain::{
    entities::{
        plan_pricings::{InsertPlanPricingEntity, PlanPricingEntity, UpdatePlanPricingEntity},
        plans::{InsertPlanEntity, PlanEntity, UpdatePlanEntity},
        subscription_histories::{InsertSubscriptionHistoryEntity, SubscriptionHistoryEntity},
        subscription_orders::{InsertSubscriptionOrderEntity, SubscriptionOrderEntity},
        subscriptions::{SubscriptionEntity, UpdateSubscriptionStatusEntity},
    },
    repositories::{
        plan_pricings::PlanPricingRepository, plans::PlanRepository,
        subscription_histories::SubscriptionHistoryRepository,
        subscription_orders::SubscriptionOrderRepository, subscriptions::SubscriptionRepository,
    },
    value_objects::{
        enums::{payment_statuses::PaymentStatus, subscription_statuses::SubscriptionStatus},
        pagination::{Page, PageRequest},
        payments::{AppliedPayment, PaymentApplication},
        subscription_lifecycle::{SubscriptionEvent, apply_paid_order, transition},
    },
};

use crate::interfaces::{
    distributed_lock::{DistributedLock, LockHandle},
    payment_gateway::{CreatePaymentRequest, CreatedPayment, PaymentGateway, PaymentGatewayError},
};

pub(crate) fn plan(app_id: &str, price: f64, currency: &str, duration_days: i32) -> PlanEntity {
    let now = Utc::now();
    PlanEntity {
        plan_id: Uuid::new_v4(),
        app_id: app_id.to_string(),
        developer_id: "dev-1".to_string(),
        name: "monthly".to_string(),
        description: String::new(),
        price,
        currency: currency.to_string(),
        duration_days,
        plan_type: "subscription".to_string(),
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn subscription(
    user_id: Uuid,
    plan_id: Uuid,
    status: SubscriptionStatus,
    end_time: DateTime<Utc>,
    auto_renew: bool,
) -> SubscriptionEntity {
    SubscriptionEntity {
        user_subscription_id: 1,
        user_id,
        plan_id,
        app_id: "app-1".to_string(),
        start_time: end_time - ChronoDuration::days(30),
        end_time,
        status: status.to_string(),
        auto_renew,
        order_id: None,
        created_at: end_time - ChronoDuration::days(30),
        updated_at: end_time - ChronoDuration::days(30),
    }
}

#[derive(Default)]
pub(crate) struct StoreState {
    pub plans: HashMap<Uuid, PlanEntity>,
    pub pricings: Vec<PlanPricingEntity>,
    pub subscriptions: HashMap<Uuid, SubscriptionEntity>,
    pub orders: HashMap<String, SubscriptionOrderEntity>,
    pub histories: Vec<InsertSubscriptionHistoryEntity>,
    next_id: i64,
}

impl StoreState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Implements every repository over one mutex-guarded state.
#[derive(Default)]
pub(crate) struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub(crate) fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap()
    }

    pub(crate) fn insert_plan(&self, plan: PlanEntity) {
        self.state().plans.insert(plan.plan_id, plan);
    }

    pub(crate) fn insert_subscription(&self, subscription: SubscriptionEntity) {
        self.state()
            .subscriptions
            .insert(subscription.user_id, subscription);
    }

    pub(crate) fn subscription_of(&self, user_id: Uuid) -> Option<SubscriptionEntity> {
        self.state().subscriptions.get(&user_id).cloned()
    }
}

#[async_trait]
impl PlanRepository for InMemoryStore {
    async fn find_by_id(&self, plan_id: Uuid) -> Result<Option<PlanEntity>> {
        Ok(self.state().plans.get(&plan_id).cloned())
    }

    async fn list_by_app(&self, app_id: String) -> Result<Vec<PlanEntity>> {
        Ok(self
            .state()
            .plans
            .values()
            .filter(|p| p.app_id == app_id)
            .cloned()
            .collect())
    }

    async fn create(&self, insert_plan_entity: InsertPlanEntity) -> Result<PlanEntity> {
        let plan = PlanEntity {
            plan_id: Uuid::new_v4(),
            app_id: insert_plan_entity.app_id,
            developer_id: insert_plan_entity.developer_id,
            name: insert_plan_entity.name,
            description: insert_plan_entity.description,
            price: insert_plan_entity.price,
            currency: insert_plan_entity.currency,
            duration_days: insert_plan_entity.duration_days,
            plan_type: insert_plan_entity.plan_type,
            created_at: insert_plan_entity.created_at,
            updated_at: insert_plan_entity.updated_at,
        };
        self.insert_plan(plan.clone());
        Ok(plan)
    }

    async fn update(
        &self,
        plan_id: Uuid,
        update_plan_entity: UpdatePlanEntity,
    ) -> Result<Option<PlanEntity>> {
        let mut state = self.state();
        let Some(plan) = state.plans.get_mut(&plan_id) else {
            return Ok(None);
        };
        if let Some(name) = update_plan_entity.name {
            plan.name = name;
        }
        if let Some(price) = update_plan_entity.price {
            plan.price = price;
        }
        if let Some(currency) = update_plan_entity.currency {
            plan.currency = currency;
        }
        if let Some(duration_days) = update_plan_entity.duration_days {
            plan.duration_days = duration_days;
        }
        Ok(Some(plan.clone()))
    }

    async fn delete(&self, plan_id: Uuid) -> Result<bool> {
        Ok(self.state().plans.remove(&plan_id).is_some())
    }
}

#[async_trait]
impl PlanPricingRepository for InMemoryStore {
    async fn find_by_plan_and_country(
        &self,
        plan_id: Uuid,
        country_code: String,
    ) -> Result<Option<PlanPricingEntity>> {
        Ok(self
            .state()
            .pricings
            .iter()
            .find(|p| p.plan_id == plan_id && p.country_code == country_code)
            .cloned())
    }

    async fn find_by_id(&self, plan_pricing_id: i64) -> Result<Option<PlanPricingEntity>> {
        Ok(self
            .state()
            .pricings
            .iter()
            .find(|p| p.plan_pricing_id == plan_pricing_id)
            .cloned())
    }

    async fn list_by_plan(&self, plan_id: Uuid) -> Result<Vec<PlanPricingEntity>> {
        Ok(self
            .state()
            .pricings
            .iter()
            .filter(|p| p.plan_id == plan_id)
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        insert_plan_pricing_entity: InsertPlanPricingEntity,
    ) -> Result<PlanPricingEntity> {
        let mut state = self.state();
        let pricing = PlanPricingEntity {
            plan_pricing_id: state.next_id(),
            plan_id: insert_plan_pricing_entity.plan_id,
            country_code: insert_plan_pricing_entity.country_code,
            price: insert_plan_pricing_entity.price,
            currency: insert_plan_pricing_entity.currency,
            created_at: insert_plan_pricing_entity.created_at,
            updated_at: insert_plan_pricing_entity.updated_at,
        };
        state.pricings.push(pricing.clone());
        Ok(pricing)
    }

    async fn update(
        &self,
        plan_pricing_id: i64,
        update_plan_pricing_entity: UpdatePlanPricingEntity,
    ) -> Result<Option<PlanPricingEntity>> {
        let mut state = self.state();
        let Some(pricing) = state
            .pricings
            .iter_mut()
            .find(|p| p.plan_pricing_id == plan_pricing_id)
        else {
            return Ok(None);
        };
        pricing.price = update_plan_pricing_entity.price;
        pricing.currency = update_plan_pricing_entity.currency;
        pricing.updated_at = update_plan_pricing_entity.updated_at;
        Ok(Some(pricing.clone()))
    }

    async fn delete(&self, plan_pricing_id: i64) -> Result<bool> {
        let mut state = self.state();
        let before = state.pricings.len();
        state.pricings.retain(|p| p.plan_pricing_id != plan_pricing_id);
        Ok(state.pricings.len() != before)
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryStore {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<SubscriptionEntity>> {
        Ok(self.subscription_of(user_id))
    }

    async fn update_status(
        &self,
        user_id: Uuid,
        expected_status: SubscriptionStatus,
        update_entity: UpdateSubscriptionStatusEntity,
    ) -> Result<Option<SubscriptionEntity>> {
        let mut state = self.state();
        let Some(subscription) = state.subscriptions.get_mut(&user_id) else {
            return Ok(None);
        };
        if subscription.status() != expected_status {
            return Ok(None);
        }
        subscription.status = update_entity.status;
        subscription.auto_renew = update_entity.auto_renew;
        subscription.updated_at = update_entity.updated_at;
        Ok(Some(subscription.clone()))
    }

    async fn list_expiring(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<SubscriptionEntity>> {
        let mut matching: Vec<SubscriptionEntity> = self
            .state()
            .subscriptions
            .values()
            .filter(|s| {
                s.status() == SubscriptionStatus::Active && s.end_time >= from && s.end_time <= to
            })
            .cloned()
            .collect();
        matching.sort_by_key(|s| s.end_time);
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();
        Ok(Page::new(items, total, page))
    }

    async fn list_auto_renew_due(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<SubscriptionEntity>> {
        let snapshot: Vec<SubscriptionEntity> = self
            .state()
            .subscriptions
            .values()
            .filter(|s| {
                s.status() == SubscriptionStatus::Active
                    && s.auto_renew
                    && s.end_time >= from
                    && s.end_time <= to
            })
            .cloned()
            .collect();
        // Lets a concurrent run take its own snapshot before this one proceeds.
        tokio::task::yield_now().await;
        Ok(snapshot)
    }

    async fn mark_expired(&self, now: DateTime<Utc>) -> Result<Vec<SubscriptionEntity>> {
        let mut state = self.state();
        let mut expired = Vec::new();
        for subscription in state.subscriptions.values_mut() {
            if let Ok(result) = transition(subscription, SubscriptionEvent::Expire, now) {
                subscription.status = result.to.to_string();
                subscription.updated_at = now;
                expired.push(subscription.clone());
            }
        }
        Ok(expired)
    }

    async fn apply_paid_order(
        &self,
        order_id: String,
        now: DateTime<Utc>,
    ) -> Result<PaymentApplication> {
        let mut state = self.state();
        let Some(order) = state.orders.get(&order_id).cloned() else {
            return Ok(PaymentApplication::OrderNotFound);
        };
        if order.is_paid() {
            return Ok(PaymentApplication::AlreadyPaid(order));
        }
        let Some(plan) = state.plans.get(&order.plan_id).cloned() else {
            return Ok(PaymentApplication::PlanNotFound {
                plan_id: order.plan_id,
            });
        };

        let existing = state.subscriptions.get(&order.user_id).cloned();
        let (upsert, action) = apply_paid_order(&order, plan.duration_days, existing.as_ref(), now)?;

        let mut paid_order = order;
        paid_order.payment_status = PaymentStatus::Success.to_string();
        paid_order.updated_at = now;
        state
            .orders
            .insert(paid_order.order_id.clone(), paid_order.clone());

        let user_subscription_id = match &existing {
            Some(current) => current.user_subscription_id,
            None => state.next_id(),
        };
        let subscription = SubscriptionEntity {
            user_subscription_id,
            user_id: upsert.user_id,
            plan_id: upsert.plan_id,
            app_id: upsert.app_id,
            start_time: upsert.start_time,
            end_time: upsert.end_time,
            status: upsert.status,
            auto_renew: upsert.auto_renew,
            order_id: upsert.order_id,
            created_at: existing.map(|s| s.created_at).unwrap_or(now),
            updated_at: now,
        };
        state
            .subscriptions
            .insert(subscription.user_id, subscription.clone());

        Ok(PaymentApplication::Applied(AppliedPayment {
            order: paid_order,
            subscription,
            plan_name: plan.name,
            action,
        }))
    }
}

#[async_trait]
impl SubscriptionOrderRepository for InMemoryStore {
    async fn create(
        &self,
        insert_order_entity: InsertSubscriptionOrderEntity,
    ) -> Result<SubscriptionOrderEntity> {
        let order = SubscriptionOrderEntity {
            order_id: insert_order_entity.order_id,
            payment_id: None,
            user_id: insert_order_entity.user_id,
            plan_id: insert_order_entity.plan_id,
            app_id: insert_order_entity.app_id,
            amount: insert_order_entity.amount,
            currency: insert_order_entity.currency,
            payment_status: insert_order_entity.payment_status,
            created_at: insert_order_entity.created_at,
            updated_at: insert_order_entity.updated_at,
        };
        self.state()
            .orders
            .insert(order.order_id.clone(), order.clone());
        Ok(order)
    }

    async fn find_by_id(&self, order_id: String) -> Result<Option<SubscriptionOrderEntity>> {
        Ok(self.state().orders.get(&order_id).cloned())
    }

    async fn set_payment_id(&self, order_id: String, payment_id: String) -> Result<()> {
        if let Some(order) = self.state().orders.get_mut(&order_id) {
            order.payment_id = Some(payment_id);
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriptionHistoryRepository for InMemoryStore {
    async fn append(&self, insert_history_entity: InsertSubscriptionHistoryEntity) -> Result<()> {
        self.state().histories.push(insert_history_entity);
        Ok(())
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<SubscriptionHistoryEntity>> {
        let state = self.state();
        let rows: Vec<SubscriptionHistoryEntity> = state
            .histories
            .iter()
            .enumerate()
            .filter(|(_, h)| h.user_id == user_id)
            .map(|(index, h)| SubscriptionHistoryEntity {
                subscription_history_id: index as i64 + 1,
                user_id: h.user_id,
                plan_id: h.plan_id,
                plan_name: h.plan_name.clone(),
                app_id: h.app_id.clone(),
                start_time: h.start_time,
                end_time: h.end_time,
                status: h.status.clone(),
                action: h.action.clone(),
                created_at: h.created_at,
            })
            .rev()
            .collect();
        let total = rows.len() as i64;
        let items = rows
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();
        Ok(Page::new(items, total, page))
    }
}

#[derive(Default)]
pub(crate) struct InMemoryLock {
    held: Mutex<HashMap<String, String>>,
    tokens: AtomicUsize,
}

impl InMemoryLock {
    pub(crate) fn hold(&self, key: &str) {
        self.held
            .lock()
            .unwrap()
            .insert(key.to_string(), "someone-else".to_string());
    }

    pub(crate) fn is_held(&self, key: &str) -> bool {
        self.held.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl DistributedLock for InMemoryLock {
    async fn try_acquire(&self, key: String, _ttl: Duration) -> Result<Option<LockHandle>> {
        let handle = {
            let mut held = self.held.lock().unwrap();
            if held.contains_key(&key) {
                return Ok(None);
            }
            let token = format!("token-{}", self.tokens.fetch_add(1, Ordering::SeqCst));
            held.insert(key.clone(), token.clone());
            LockHandle { key, token }
        };
        tokio::task::yield_now().await;
        Ok(Some(handle))
    }

    async fn release(&self, handle: LockHandle) -> Result<()> {
        let mut held = self.held.lock().unwrap();
        if held.get(&handle.key) == Some(&handle.token) {
            held.remove(&handle.key);
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakePaymentGateway {
    pub calls: AtomicUsize,
    /// Never answers while set.
    pub stall: AtomicBool,
}

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<CreatedPayment, PaymentGatewayError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.stall.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(CreatedPayment {
            payment_id: format!("PAY-{}-{}", n, request.order_id),
            pay_url: Some("https://pay.example.com/checkout".to_string()),
            pay_code: None,
            pay_params: None,
        })
    }
}
