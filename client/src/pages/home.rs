//! Home page: the admin landing route.

use leptos::prelude::*;

use crate::components::nav_bar::NavBar;
use crate::pages::sections::Section;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="home-page">
            <NavBar/>
            <h1>"Painel"</h1>
            <div class="home-page__grid">
                {Section::ALL
                    .iter()
                    .map(|section| {
                        view! {
                            <a class="home-page__card" href=section.path()>
                                <span class="home-page__card-title">{section.title()}</span>
                            </a>
                        }
                    })
                    .collect_view()}
            </div>
        </div>
    }
}
