use super::Store;
use crate::entity::{user_subscriptions, users};
use anyhow::Result;
use sea_orm::*;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct NewSubscription {
    pub user_id: String,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub stripe_price_id: Option<String>,
    pub stripe_current_period_end_us: Option<i64>,
    pub plan: String,
    pub credits: i64,
    pub stripe_status: String,
}

#[derive(Debug, Clone, Default)]
pub struct SubscriptionChanges {
    pub plan: Option<String>,
    pub credits: Option<i64>,
    pub stripe_status: Option<String>,
    pub stripe_current_period_end_us: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct SubscriptionWithProfile {
    pub subscription: user_subscriptions::Model,
    pub profile: Option<users::Model>,
}

fn apply_changes(
    existing: user_subscriptions::Model,
    changes: SubscriptionChanges,
) -> user_subscriptions::ActiveModel {
    let mut record: user_subscriptions::ActiveModel = existing.into();
    if let Some(plan) = changes.plan {
        record.plan = Set(plan);
    }
    if let Some(credits) = changes.credits {
        record.credits = Set(credits);
    }
    if let Some(stripe_status) = changes.stripe_status {
        record.stripe_status = Set(stripe_status);
    }
    if let Some(period_end) = changes.stripe_current_period_end_us {
        record.stripe_current_period_end_us = Set(Some(period_end));
    }
    record
}

impl Store {
    pub async fn insert_subscription(
        &self,
        new: NewSubscription,
    ) -> Result<user_subscriptions::Model> {
        let record = user_subscriptions::ActiveModel {
            id: NotSet,
            user_id: Set(new.user_id),
            stripe_customer_id: Set(new.stripe_customer_id),
            stripe_subscription_id: Set(new.stripe_subscription_id),
            stripe_price_id: Set(new.stripe_price_id),
            stripe_current_period_end_us: Set(new.stripe_current_period_end_us),
            plan: Set(new.plan),
            credits: Set(new.credits),
            stripe_status: Set(new.stripe_status),
        };
        self.db.run(move |db| Ok(record.insert(db)?)).await
    }

    pub async fn list_subscriptions(&self) -> Result<Vec<user_subscriptions::Model>> {
        self.db
            .run(|db| {
                Ok(user_subscriptions::Entity::find()
                    .order_by_asc(user_subscriptions::Column::Id)
                    .all(db)?)
            })
            .await
    }

    /// Subscriptions joined with the mirrored identity profile, when one exists.
    pub async fn list_subscriptions_with_profiles(&self) -> Result<Vec<SubscriptionWithProfile>> {
        self.db
            .run(|db| {
                let profiles: HashMap<String, users::Model> = users::Entity::find()
                    .all(db)?
                    .into_iter()
                    .map(|u| (u.clerk_id.clone(), u))
                    .collect();

                let rows = user_subscriptions::Entity::find()
                    .order_by_asc(user_subscriptions::Column::Id)
                    .all(db)?;

                Ok(rows
                    .into_iter()
                    .map(|subscription| {
                        let profile = profiles.get(&subscription.user_id).cloned();
                        SubscriptionWithProfile {
                            subscription,
                            profile,
                        }
                    })
                    .collect())
            })
            .await
    }

    pub async fn find_subscription(&self, id: i64) -> Result<Option<user_subscriptions::Model>> {
        self.db
            .run(move |db| Ok(user_subscriptions::Entity::find_by_id(id).one(db)?))
            .await
    }

    pub async fn find_subscription_by_user(
        &self,
        user_id: &str,
    ) -> Result<Option<user_subscriptions::Model>> {
        let user_id = user_id.to_string();
        self.db
            .run(move |db| {
                Ok(user_subscriptions::Entity::find()
                    .filter(user_subscriptions::Column::UserId.eq(user_id))
                    .one(db)?)
            })
            .await
    }

    pub async fn update_subscription(
        &self,
        id: i64,
        changes: SubscriptionChanges,
    ) -> Result<Option<user_subscriptions::Model>> {
        self.db
            .run(move |db| {
                let Some(existing) = user_subscriptions::Entity::find_by_id(id).one(db)? else {
                    return Ok(None);
                };
                Ok(Some(apply_changes(existing, changes).update(db)?))
            })
            .await
    }

    pub async fn update_subscription_by_user(
        &self,
        user_id: &str,
        changes: SubscriptionChanges,
    ) -> Result<Option<user_subscriptions::Model>> {
        let user_id = user_id.to_string();
        self.db
            .run(move |db| {
                let Some(existing) = user_subscriptions::Entity::find()
                    .filter(user_subscriptions::Column::UserId.eq(user_id))
                    .one(db)?
                else {
                    return Ok(None);
                };
                Ok(Some(apply_changes(existing, changes).update(db)?))
            })
            .await
    }

    pub async fn delete_subscription_by_user(&self, user_id: &str) -> Result<bool> {
        let user_id = user_id.to_string();
        self.db
            .run(move |db| {
                let result = user_subscriptions::Entity::delete_many()
                    .filter(user_subscriptions::Column::UserId.eq(user_id))
                    .exec(db)?;
                Ok(result.rows_affected > 0)
            })
            .await
    }
}
