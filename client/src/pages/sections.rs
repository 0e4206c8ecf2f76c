//! Admin section pages (students, teachers, modalities, events, payments,
//! reports).
//!
//! SYSTEM CONTEXT
//! ==============
//! Each section lists the rows of one table through the REST client. Entity
//! shapes are not modeled; rows stay as JSON and only a display label and the
//! id are pulled out.

#[cfg(test)]
#[path = "sections_test.rs"]
mod sections_test;

use leptos::prelude::*;
use serde_json::Value;

use crate::components::nav_bar::NavBar;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    Students,
    Teachers,
    Modalities,
    Events,
    Payments,
    Reports,
}

impl Section {
    pub const ALL: [Self; 6] =
        [Self::Students, Self::Teachers, Self::Modalities, Self::Events, Self::Payments, Self::Reports];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Students => "/students",
            Self::Teachers => "/teachers",
            Self::Modalities => "/modalities",
            Self::Events => "/events",
            Self::Payments => "/payments",
            Self::Reports => "/reports",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Students => "Alunos",
            Self::Teachers => "Professores",
            Self::Modalities => "Modalidades",
            Self::Events => "Eventos",
            Self::Payments => "Pagamentos",
            Self::Reports => "Relatórios",
        }
    }

    /// Backing table.
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Teachers => "teachers",
            Self::Modalities => "modalities",
            Self::Events => "events",
            Self::Payments => "payments",
            Self::Reports => "reports",
        }
    }

    /// Column and direction the list is sorted by.
    #[must_use]
    pub fn ordering(self) -> (&'static str, bool) {
        match self {
            Self::Students | Self::Teachers => ("full_name", true),
            Self::Modalities => ("name", true),
            Self::Events => ("starts_at", false),
            Self::Payments | Self::Reports => ("created_at", false),
        }
    }

    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let path = crate::routing::guard::normalize_path(path);
        Self::ALL.into_iter().find(|s| s.path() == path)
    }
}

/// Human-readable label for a row: the first present of a few name-like
/// columns, falling back to the id.
#[must_use]
pub fn row_label(row: &Value) -> String {
    ["full_name", "name", "title", "description"]
        .iter()
        .find_map(|key| row.get(key).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty()))
        .map(str::to_owned)
        .or_else(|| row.get("id").map(|id| id.as_str().map_or_else(|| id.to_string(), str::to_owned)))
        .unwrap_or_else(|| "—".to_owned())
}

#[derive(Clone, Debug, Default, PartialEq)]
enum ListState {
    #[default]
    Loading,
    Ready(Vec<Value>),
    Failed(String),
}

/// List page for one section.
#[component]
pub fn SectionPage(section: Section) -> impl IntoView {
    let rows = RwSignal::new(ListState::Loading);

    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(async move {
        let Some(backend) = crate::state::auth_context::current_handles().and_then(|h| h.backend()) else {
            rows.set(ListState::Failed("Serviço indisponível.".to_owned()));
            return;
        };
        let (column, ascending) = section.ordering();
        let query = crate::net::rest::Query::table(section.table()).order(column, ascending);
        match backend.rest.fetch_list::<Value>(&query).await {
            Ok(list) => rows.set(ListState::Ready(list)),
            Err(e) => {
                log::warn!("{}: list failed: {e}", section.table());
                rows.set(ListState::Failed(e.to_string()));
            }
        }
    });

    view! {
        <div class="section-page">
            <NavBar/>
            <h1>{section.title()}</h1>
            {move || match rows.get() {
                ListState::Loading => view! { <p class="section-page__status">"Carregando..."</p> }.into_any(),
                ListState::Failed(message) => {
                    view! { <p class="section-page__status section-page__status--error">{message}</p> }.into_any()
                }
                ListState::Ready(list) if list.is_empty() => {
                    view! { <p class="section-page__status">"Nenhum registro."</p> }.into_any()
                }
                ListState::Ready(list) => {
                    view! {
                        <ul class="section-page__list">
                            {list.iter().map(|row| view! { <li>{row_label(row)}</li> }).collect_view()}
                        </ul>
                    }
                        .into_any()
                }
            }}
        </div>
    }
}

#[component]
pub fn StudentsPage() -> impl IntoView {
    view! { <SectionPage section=Section::Students/> }
}

#[component]
pub fn TeachersPage() -> impl IntoView {
    view! { <SectionPage section=Section::Teachers/> }
}

#[component]
pub fn ModalitiesPage() -> impl IntoView {
    view! { <SectionPage section=Section::Modalities/> }
}

#[component]
pub fn EventsPage() -> impl IntoView {
    view! { <SectionPage section=Section::Events/> }
}

#[component]
pub fn PaymentsPage() -> impl IntoView {
    view! { <SectionPage section=Section::Payments/> }
}

#[component]
pub fn ReportsPage() -> impl IntoView {
    view! { <SectionPage section=Section::Reports/> }
}
