//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use caffiend_core::{COFFEE_MENU, CoffeeOption, quick_select, time_since};
use tracing::instrument;

use crate::filters;
use crate::middleware::{CspNonce, OptionalAuth};
use crate::models::CurrentUser;
use crate::routes::auth::AuthModalView;
use crate::routes::entries::{CoffeeFormView, EntrySummaryView};
use crate::state::AppState;

// =============================================================================
// Hero Content (static landing copy)
// =============================================================================

/// The info card in the hero panel.
#[derive(Clone)]
pub struct HeroFact {
    pub title: &'static str,
    pub lede: &'static str,
    pub body: &'static str,
}

/// Static hero panel content.
#[derive(Clone)]
pub struct HeroContent {
    pub headline: &'static str,
    pub brand: &'static str,
    pub benefits: &'static [&'static str],
    pub fact: HeroFact,
}

impl Default for HeroContent {
    fn default() -> Self {
        Self {
            headline: "Coffee Tracking for Coffee Fiends!",
            brand: "Caffiend",
            benefits: &[
                "Tracking every coffee",
                "Measuring your blood caffeine levels",
                "Costing and quantifying your addiction",
            ],
            fact: HeroFact {
                title: "Did you know...",
                lede: "That caffeine's half-life is about 5 hours?",
                body: "This means that after 5 hours, half the caffeine you \
                       consumed is still in your system, keeping you alert \
                       longer. Drink a cup with 200 mg of caffeine and 5 hours \
                       later about 100 mg is still working on you.",
            },
        }
    }
}

// =============================================================================
// Template
// =============================================================================

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub user: Option<CurrentUser>,
    pub hero: HeroContent,
    pub form: CoffeeFormView,
    pub auth: AuthModalView,
    pub quick: &'static [CoffeeOption],
    pub menu: &'static [CoffeeOption],
    pub hour_choices: &'static [u8],
    pub minute_choices: &'static [u8],
    pub summary: Option<EntrySummaryView>,
    pub nonce: String,
}

/// Display the landing page.
///
/// GET /
#[instrument(skip(state, user, nonce))]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    CspNonce(nonce): CspNonce,
) -> impl IntoResponse {
    let summary = user
        .as_ref()
        .and_then(|user| state.journal().current(&user.uid))
        .map(|snapshot| EntrySummaryView::from_journal(&snapshot));

    HomeTemplate {
        user,
        hero: HeroContent::default(),
        form: CoffeeFormView::default(),
        auth: AuthModalView::default(),
        quick: quick_select(),
        menu: COFFEE_MENU,
        hour_choices: time_since::HOUR_CHOICES,
        minute_choices: time_since::MINUTE_CHOICES,
        summary,
        nonce,
    }
}
