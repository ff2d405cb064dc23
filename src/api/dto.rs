//! JSON shapes returned by the API.

use super::input::{parse_form_fields, rfc3339};
use crate::entity::{
    ai_outputs, categories, coursework_categories, coursework_templates, messages, tutors,
    user_subscriptions,
};
use crate::store::{MessageWithTutor, SubscriptionWithProfile, TutorWithCategory};
use serde::Serialize;
use serde_json::Value;

const DEFAULT_TEMPLATE_ICON: &str = "https://img.icons8.com/color/96/file.png";
const DEFAULT_TEMPLATE_CATEGORY: &str = "General";
const ACTIVITY_CREATOR_CHARS: usize = 15;

#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorDto {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub src: String,
    pub name: String,
    pub description: String,
    pub instructions: String,
    pub seed: String,
    pub category_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<tutors::Model> for TutorDto {
    fn from(t: tutors::Model) -> Self {
        Self {
            id: t.id,
            user_id: t.user_id,
            user_name: t.user_name,
            src: t.src,
            name: t.name,
            description: t.description,
            instructions: t.instructions,
            seed: t.seed,
            category_id: t.category_id,
            created_at: rfc3339(t.created_at_us),
            updated_at: rfc3339(t.updated_at_us),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorWithCategoryDto {
    #[serde(flatten)]
    pub tutor: TutorDto,
    pub category_name: Option<String>,
}

impl From<TutorWithCategory> for TutorWithCategoryDto {
    fn from(t: TutorWithCategory) -> Self {
        Self {
            tutor: t.tutor.into(),
            category_name: t.category_name,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub role: String,
    pub content: String,
    pub created_at: String,
    pub tutor_id: String,
    pub user_id: String,
}

impl From<messages::Model> for MessageDto {
    fn from(m: messages::Model) -> Self {
        Self {
            id: m.id,
            role: m.role,
            content: m.content,
            created_at: rfc3339(m.created_at_us),
            tutor_id: m.tutor_id,
            user_id: m.user_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageWithTutorDto {
    #[serde(flatten)]
    pub message: MessageDto,
    pub tutor_name: Option<String>,
}

impl From<MessageWithTutor> for MessageWithTutorDto {
    fn from(m: MessageWithTutor) -> Self {
        Self {
            message: m.message.into(),
            tutor_name: m.tutor_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryDto {
    pub id: String,
    pub name: String,
}

impl From<categories::Model> for CategoryDto {
    fn from(c: categories::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetailDto {
    #[serde(flatten)]
    pub category: CategoryDto,
    pub tutors_count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseworkCategoryDto {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: String,
}

impl From<coursework_categories::Model> for CourseworkCategoryDto {
    fn from(c: coursework_categories::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            icon: c.icon,
            sort_order: c.sort_order,
            is_active: c.is_active,
            created_at: rfc3339(c.created_at_us),
        }
    }
}

/// Admin view of a template.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDto {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub category: Option<String>,
    pub ai_prompt: String,
    pub form_fields: Value,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<coursework_templates::Model> for TemplateDto {
    fn from(t: coursework_templates::Model) -> Self {
        Self {
            form_fields: parse_form_fields(&t.form_fields),
            id: t.id,
            slug: t.slug,
            name: t.name,
            description: t.description,
            icon: t.icon,
            category: t.category,
            ai_prompt: t.ai_prompt,
            is_active: t.is_active,
            sort_order: t.sort_order,
            created_by: t.created_by,
            created_at: rfc3339(t.created_at_us),
            updated_at: rfc3339(t.updated_at_us),
        }
    }
}

/// Dashboard view of an active template.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicTemplateDto {
    pub name: String,
    pub desc: String,
    pub icon: String,
    pub category: String,
    pub slug: String,
    pub ai_prompt: String,
    pub form: Value,
}

impl From<coursework_templates::Model> for PublicTemplateDto {
    fn from(t: coursework_templates::Model) -> Self {
        Self {
            form: parse_form_fields(&t.form_fields),
            name: t.name,
            desc: t.description.unwrap_or_default(),
            icon: t
                .icon
                .filter(|i| !i.is_empty())
                .unwrap_or_else(|| DEFAULT_TEMPLATE_ICON.to_string()),
            category: t
                .category
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_TEMPLATE_CATEGORY.to_string()),
            slug: t.slug,
            ai_prompt: t.ai_prompt,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDto {
    pub id: i64,
    pub user_id: String,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub stripe_price_id: Option<String>,
    pub stripe_current_period_end: Option<String>,
    pub plan: String,
    pub credits: i64,
    pub stripe_status: String,
}

impl From<user_subscriptions::Model> for SubscriptionDto {
    fn from(s: user_subscriptions::Model) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            stripe_customer_id: s.stripe_customer_id,
            stripe_subscription_id: s.stripe_subscription_id,
            stripe_price_id: s.stripe_price_id,
            stripe_current_period_end: s.stripe_current_period_end_us.map(rfc3339),
            plan: s.plan,
            credits: s.credits,
            stripe_status: s.stripe_status,
        }
    }
}

/// A subscription plus the mirrored identity profile, when one is known.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    #[serde(flatten)]
    pub subscription: SubscriptionDto,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
}

impl From<SubscriptionWithProfile> for UserDto {
    fn from(s: SubscriptionWithProfile) -> Self {
        let profile = s.profile;
        Self {
            subscription: s.subscription.into(),
            email: profile.as_ref().map(|p| p.email.clone()),
            first_name: profile.as_ref().and_then(|p| p.first_name.clone()),
            last_name: profile.as_ref().and_then(|p| p.last_name.clone()),
            image_url: profile.and_then(|p| p.image_url),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiOutputDto {
    pub id: i64,
    pub form_data: String,
    pub ai_response: String,
    pub template_slug: String,
    pub created_by: String,
    pub created_at: String,
}

impl From<ai_outputs::Model> for AiOutputDto {
    fn from(o: ai_outputs::Model) -> Self {
        Self {
            id: o.id,
            form_data: o.form_data,
            ai_response: o.ai_response,
            template_slug: o.template_slug,
            created_by: o.created_by,
            created_at: rfc3339(o.created_at_us),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDto {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub description: String,
    pub created_by: String,
    pub created_at: String,
}

fn shorten(text: &str, max_chars: usize) -> String {
    if text.is_empty() {
        return "Unknown".to_string();
    }
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max_chars).collect();
    short.push_str("...");
    short
}

impl From<ai_outputs::Model> for ActivityDto {
    fn from(o: ai_outputs::Model) -> Self {
        Self {
            id: o.id,
            kind: "ai_output",
            description: format!(
                "New AI output generated using \"{}\" template",
                o.template_slug
            ),
            created_by: shorten(&o.created_by, ACTIVITY_CREATOR_CHARS),
            created_at: rfc3339(o.created_at_us),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub response: String,
}
