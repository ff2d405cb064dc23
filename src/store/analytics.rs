use super::Store;
use crate::entity::{ai_outputs, messages, tutors, user_subscriptions};
use anyhow::Result;
use sea_orm::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

const MONTHLY_PRICE: f64 = 9.99;
const YEARLY_PRICE: f64 = 99.99;
const DAILY_WINDOW: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_users: u64,
    pub total_ai_outputs: u64,
    pub total_tutors: u64,
    pub total_subscriptions: u64,
    pub total_messages: u64,
    pub active_subscriptions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateUsage {
    pub template: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCount {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_users: u64,
    pub active_subscriptions: u64,
    pub total_tutors: u64,
    pub total_messages: u64,
    pub user_messages: u64,
    pub total_ai_outputs: u64,
    pub monthly_revenue: f64,
    pub active_users: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionBreakdown {
    pub free: u64,
    pub monthly: u64,
    pub yearly: u64,
    pub active: u64,
    pub inactive: u64,
    pub canceled: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub template_usage: Vec<TemplateUsage>,
    pub daily_outputs: Vec<DailyCount>,
    pub user_growth: Vec<DailyCount>,
    pub overview: Overview,
    pub subscription_breakdown: SubscriptionBreakdown,
}

struct Counts {
    tutors: u64,
    messages: u64,
    user_messages: u64,
}

fn count_where<F>(subs: &[user_subscriptions::Model], pred: F) -> u64
where
    F: Fn(&user_subscriptions::Model) -> bool,
{
    subs.iter().filter(|s| pred(s)).count() as u64
}

fn output_date(created_at_us: i64) -> String {
    chrono::DateTime::from_timestamp_micros(created_at_us)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn build_analytics(
    subs: &[user_subscriptions::Model],
    outputs: &[ai_outputs::Model],
    counts: Counts,
) -> Analytics {
    let mut usage: HashMap<&str, u64> = HashMap::new();
    for output in outputs {
        *usage.entry(output.template_slug.as_str()).or_default() += 1;
    }
    let mut template_usage: Vec<TemplateUsage> = usage
        .into_iter()
        .map(|(template, count)| TemplateUsage {
            template: template.to_string(),
            count,
        })
        .collect();
    template_usage.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.template.cmp(&b.template)));

    let mut daily: BTreeMap<String, u64> = BTreeMap::new();
    for output in outputs {
        *daily.entry(output_date(output.created_at_us)).or_default() += 1;
    }
    let daily_outputs: Vec<DailyCount> = daily
        .into_iter()
        .rev()
        .take(DAILY_WINDOW)
        .map(|(date, count)| DailyCount { date, count })
        .collect();

    let creators: HashSet<&str> = outputs.iter().map(|o| o.created_by.as_str()).collect();
    let active_users = creators.len() as u64;
    let user_growth = if active_users > 0 {
        vec![DailyCount {
            date: "Active".to_string(),
            count: active_users,
        }]
    } else {
        Vec::new()
    };

    let is_active = |s: &user_subscriptions::Model| s.stripe_status == "active";
    let active = count_where(subs, is_active);
    let active_monthly = count_where(subs, |s| s.plan == "monthly" && is_active(s));
    let active_yearly = count_where(subs, |s| s.plan == "yearly" && is_active(s));
    let monthly_revenue =
        active_monthly as f64 * MONTHLY_PRICE + active_yearly as f64 * (YEARLY_PRICE / 12.0);

    Analytics {
        template_usage,
        daily_outputs,
        user_growth,
        overview: Overview {
            total_users: subs.len() as u64,
            active_subscriptions: active,
            total_tutors: counts.tutors,
            total_messages: counts.messages,
            user_messages: counts.user_messages,
            total_ai_outputs: outputs.len() as u64,
            monthly_revenue,
            active_users,
        },
        subscription_breakdown: SubscriptionBreakdown {
            free: count_where(subs, |s| s.plan == "free" || s.plan.is_empty()),
            monthly: count_where(subs, |s| s.plan == "monthly"),
            yearly: count_where(subs, |s| s.plan == "yearly"),
            active,
            inactive: count_where(subs, |s| s.stripe_status == "inactive"),
            canceled: count_where(subs, |s| s.stripe_status == "canceled"),
        },
    }
}

impl Store {
    pub async fn stats(&self) -> Result<Stats> {
        self.db
            .run(|db| {
                let subs = user_subscriptions::Entity::find().all(db)?;
                let distinct_users: HashSet<&str> =
                    subs.iter().map(|s| s.user_id.as_str()).collect();

                Ok(Stats {
                    total_users: distinct_users.len() as u64,
                    total_ai_outputs: ai_outputs::Entity::find().count(db)?,
                    total_tutors: tutors::Entity::find().count(db)?,
                    total_subscriptions: subs.len() as u64,
                    total_messages: messages::Entity::find().count(db)?,
                    active_subscriptions: count_where(&subs, |s| s.stripe_status == "active"),
                })
            })
            .await
    }

    pub async fn analytics(&self) -> Result<Analytics> {
        self.db
            .run(|db| {
                let subs = user_subscriptions::Entity::find().all(db)?;
                let outputs = ai_outputs::Entity::find().all(db)?;
                let counts = Counts {
                    tutors: tutors::Entity::find().count(db)?,
                    messages: messages::Entity::find().count(db)?,
                    user_messages: messages::Entity::find()
                        .filter(messages::Column::Role.eq("user"))
                        .count(db)?,
                };
                Ok(build_analytics(&subs, &outputs, counts))
            })
            .await
    }
}
