//! Coffee logging route handlers.
//!
//! The form submits over HTMX and every response is the re-rendered form
//! fragment: with an advisory message when input is incomplete, with the
//! auth modal swapped into the portal when nobody is signed in, or reset
//! to defaults after a recorded entry. Entered values survive every
//! outcome except a successful record.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use caffiend_core::{COFFEE_MENU, CoffeeOption, Entry, TimeSince, catalog, time_since};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, add_breadcrumb};
use crate::journal::record_entry;
use crate::middleware::OptionalAuth;
use crate::models::{CurrentUser, session_keys};
use crate::routes::auth::AuthModalView;
use crate::state::AppState;

/// The advisory shown when the form is submitted incomplete.
pub const MISSING_DATA_MESSAGE: &str = "Make sure to select a coffee and enter the price";

/// Value of the quick-select radio that reveals the full-catalog drop-down.
const OTHER_SENTINEL: &str = "other";

// =============================================================================
// Form Types
// =============================================================================

/// Add-entry form data.
///
/// `coffee` is the quick-select radio: a catalog name, or `"other"` to
/// defer to the `coffee_other` drop-down.
#[derive(Debug, Default, Deserialize)]
pub struct AddEntryForm {
    #[serde(default)]
    pub coffee: Option<String>,
    #[serde(default)]
    pub coffee_other: Option<String>,
    #[serde(default)]
    pub cost: String,
    #[serde(default)]
    pub hours: u8,
    #[serde(default)]
    pub minutes: u8,
}

impl AddEntryForm {
    /// The coffee this submission selects, resolving the "Other" path to
    /// the drop-down value. Both paths are equivalent from here on.
    fn selected_coffee(&self) -> Option<&str> {
        match self.coffee.as_deref() {
            None | Some("") => None,
            Some(OTHER_SENTINEL) => self
                .coffee_other
                .as_deref()
                .filter(|choice| !choice.is_empty()),
            Some(name) => Some(name),
        }
    }
}

/// The advisory for an incomplete submission, if any.
fn validation_message(selected: Option<&str>, cost: &str) -> Option<&'static str> {
    (selected.is_none() || cost.is_empty()).then_some(MISSING_DATA_MESSAGE)
}

// =============================================================================
// View Types
// =============================================================================

/// Transient form state rendered into the fragment.
#[derive(Debug, Clone, Default)]
pub struct CoffeeFormView {
    /// The currently selected coffee name, if any.
    pub selected: Option<String>,
    /// Whether the full-catalog drop-down is revealed.
    pub show_other: bool,
    /// The cost string exactly as entered.
    pub cost: String,
    /// Hours since consumption.
    pub hours: u8,
    /// Minutes since consumption.
    pub minutes: u8,
    /// Advisory message for incomplete input.
    pub message: Option<String>,
    /// Whether to swap the auth modal into the portal.
    pub show_auth_modal: bool,
}

impl CoffeeFormView {
    /// Preserve a submission's entered values for re-rendering.
    fn preserving(form: &AddEntryForm) -> Self {
        Self {
            selected: form.selected_coffee().map(str::to_owned),
            show_other: form.coffee.as_deref() == Some(OTHER_SENTINEL),
            cost: form.cost.clone(),
            hours: form.hours,
            minutes: form.minutes,
            message: None,
            show_auth_modal: false,
        }
    }

    /// Whether this catalog name is the current selection.
    #[must_use]
    pub fn is_selected(&self, name: &str) -> bool {
        self.selected.as_deref() == Some(name)
    }

    /// Whether this hour option is the entered offset (template helper).
    #[must_use]
    pub fn hours_is(&self, hour: &u8) -> bool {
        self.hours == *hour
    }

    /// Whether this minute option is the entered offset (template helper).
    #[must_use]
    pub fn minutes_is(&self, minute: &u8) -> bool {
        self.minutes == *minute
    }
}

/// Summary strip data: how much the journal currently holds.
#[derive(Debug, Clone)]
pub struct EntrySummaryView {
    pub count: usize,
    pub latest: Option<LatestEntryView>,
}

/// The most recently consumed entry, by journal key.
#[derive(Debug, Clone)]
pub struct LatestEntryView {
    pub name: String,
    pub cost: String,
    pub caffeine_mg: Option<u32>,
}

impl EntrySummaryView {
    /// Build the summary from a journal snapshot.
    #[must_use]
    pub fn from_journal(journal: &caffiend_core::EntryMap) -> Self {
        let latest = journal.last_key_value().map(|(_, entry)| LatestEntryView {
            name: entry.name.clone(),
            cost: entry.cost.clone(),
            caffeine_mg: catalog::find(&entry.name).map(|option| option.caffeine_mg),
        });

        Self {
            count: journal.len(),
            latest,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Coffee form fragment template (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/coffee_form.html")]
pub struct CoffeeFormTemplate {
    pub form: CoffeeFormView,
    pub auth: AuthModalView,
    pub quick: &'static [CoffeeOption],
    pub menu: &'static [CoffeeOption],
    pub hour_choices: &'static [u8],
    pub minute_choices: &'static [u8],
}

impl CoffeeFormTemplate {
    /// Render the given form state with the default auth modal.
    #[must_use]
    pub fn new(form: CoffeeFormView) -> Self {
        Self {
            form,
            auth: AuthModalView::default(),
            quick: caffiend_core::quick_select(),
            menu: COFFEE_MENU,
            hour_choices: time_since::HOUR_CHOICES,
            minute_choices: time_since::MINUTE_CHOICES,
        }
    }
}

/// Entry summary fragment template (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/entry_summary.html")]
pub struct EntrySummaryTemplate {
    pub summary: Option<EntrySummaryView>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Add an entry to the journal (HTMX).
///
/// POST /entries/add
///
/// Guards run in order: input completeness, then authentication. Only when
/// both pass is the entry recorded - optimistically locally, then merged
/// into the user's Firestore document. A failed merge never surfaces here;
/// the form simply keeps its values instead of resetting.
#[instrument(skip(state, session, form), fields(hours = form.hours, minutes = form.minutes))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddEntryForm>,
) -> Result<Response, AppError> {
    let selected = form.selected_coffee();

    // Guard: only record complete submissions
    if let Some(advisory) = validation_message(selected, &form.cost) {
        let mut view = CoffeeFormView::preserving(&form);
        view.message = Some(advisory.to_string());
        return Ok(CoffeeFormTemplate::new(view).into_response());
    }

    // Guard: recording requires a signed-in user; keep the entered values
    // so the submission can be repeated after authenticating
    let user: Option<CurrentUser> = session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten();
    let Some(user) = user else {
        let mut view = CoffeeFormView::preserving(&form);
        view.show_auth_modal = true;
        return Ok(CoffeeFormTemplate::new(view).into_response());
    };

    // The drop-downs only offer valid offsets; anything else is a forged request
    let elapsed = TimeSince::new(form.hours, form.minutes)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let name = selected.unwrap_or_default().to_owned();
    let entry = Entry::new(name, form.cost.clone());
    add_breadcrumb(
        "journal",
        "Entry submitted",
        Some(&[("coffee", entry.name.as_str())]),
    );

    let recorded = record_entry(
        state.journal(),
        state.firestore(),
        &user.uid,
        entry,
        elapsed,
        state.config().minute_unit,
        state.config().write_failure,
    )
    .await;

    // Reset transient state only once the write has resolved successfully;
    // otherwise the entered values stay put and no error is shown
    let view = if recorded.persisted {
        CoffeeFormView::default()
    } else {
        CoffeeFormView::preserving(&form)
    };

    Ok((
        AppendHeaders([("HX-Trigger", "entries-updated")]),
        CoffeeFormTemplate::new(view),
    )
        .into_response())
}

/// Journal summary fragment (HTMX).
///
/// GET /entries/summary
///
/// Re-requested by the page on every `entries-updated` trigger, which is
/// how the optimistic local update becomes visible.
#[instrument(skip(state, user))]
pub async fn summary(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let summary = user
        .and_then(|user| state.journal().current(&user.uid))
        .map(|snapshot| EntrySummaryView::from_journal(&snapshot));

    EntrySummaryTemplate { summary }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(coffee: Option<&str>, coffee_other: Option<&str>, cost: &str) -> AddEntryForm {
        AddEntryForm {
            coffee: coffee.map(str::to_owned),
            coffee_other: coffee_other.map(str::to_owned),
            cost: cost.to_owned(),
            ..AddEntryForm::default()
        }
    }

    #[test]
    fn test_selected_coffee_quick_pick() {
        assert_eq!(
            form(Some("Espresso"), None, "3.25").selected_coffee(),
            Some("Espresso")
        );
    }

    #[test]
    fn test_selected_coffee_other_path() {
        // Both selection paths are equivalent
        assert_eq!(
            form(Some("other"), Some("Turkish Coffee"), "3.25").selected_coffee(),
            Some("Turkish Coffee")
        );
    }

    #[test]
    fn test_selected_coffee_other_without_choice() {
        assert_eq!(form(Some("other"), None, "3.25").selected_coffee(), None);
        assert_eq!(form(Some("other"), Some(""), "3.25").selected_coffee(), None);
    }

    #[test]
    fn test_selected_coffee_none() {
        assert_eq!(form(None, None, "3.25").selected_coffee(), None);
        assert_eq!(form(Some(""), None, "3.25").selected_coffee(), None);
    }

    #[test]
    fn test_validation_requires_both_fields() {
        assert_eq!(
            validation_message(None, "3.25"),
            Some(MISSING_DATA_MESSAGE)
        );
        assert_eq!(
            validation_message(Some("Espresso"), ""),
            Some(MISSING_DATA_MESSAGE)
        );
        assert_eq!(validation_message(Some("Espresso"), "3.25"), None);
    }

    #[test]
    fn test_validation_does_not_trim_cost() {
        // The check is "non-empty", nothing more - a lone space passes
        assert_eq!(validation_message(Some("Espresso"), " "), None);
    }

    #[test]
    fn test_preserving_keeps_entered_values() {
        let mut submitted = form(Some("other"), Some("Mocha"), "4.75");
        submitted.hours = 2;
        submitted.minutes = 30;

        let view = CoffeeFormView::preserving(&submitted);
        assert_eq!(view.selected.as_deref(), Some("Mocha"));
        assert!(view.show_other);
        assert_eq!(view.cost, "4.75");
        assert_eq!(view.hours, 2);
        assert_eq!(view.minutes, 30);
        assert!(view.message.is_none());
        assert!(!view.show_auth_modal);
    }

    #[test]
    fn test_summary_from_journal() {
        let mut journal = caffiend_core::EntryMap::new();
        journal.insert(100, Entry::new("Espresso", "3.25"));
        journal.insert(200, Entry::new("Cold Brew", "5.00"));

        let summary = EntrySummaryView::from_journal(&journal);
        assert_eq!(summary.count, 2);

        let latest = summary.latest.expect("latest entry");
        assert_eq!(latest.name, "Cold Brew");
        assert_eq!(latest.caffeine_mg, Some(155));
    }

    #[test]
    fn test_summary_unknown_coffee_has_no_caffeine() {
        let mut journal = caffiend_core::EntryMap::new();
        journal.insert(100, Entry::new("Mystery Brew", "1.00"));

        let summary = EntrySummaryView::from_journal(&journal);
        assert_eq!(summary.latest.expect("latest entry").caffeine_mg, None);
    }
}
