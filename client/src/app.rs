//! Root application component with routing and the auth context provider.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment,
    components::{Route, Router, Routes},
};

use crate::components::auth_guard::AuthGuard;
use crate::pages::{
    auth_callback::AuthCallbackPage,
    home::HomePage,
    login::LoginPage,
    onboarding::{EnrollmentDashboardPage, EnrollmentFormPage, InauguralClassPage, InauguralDashboardPage},
    sections::{EventsPage, ModalitiesPage, PaymentsPage, ReportsPage, StudentsPage, TeachersPage},
    signup::{EnrollmentSignupPage, InauguralSignupPage, SignupPage},
};
use crate::state::auth_context::AuthContext;

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="pt-BR">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

#[component]
fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="not-found">
            <h1>"Página não encontrada."</h1>
            <a href="/">"Voltar ao início"</a>
        </div>
    }
}

/// Root application component.
///
/// Provides the auth context and routes every page through [`AuthGuard`].
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let auth = AuthContext::new();
    provide_context(auth);

    #[cfg(feature = "hydrate")]
    crate::state::auth_context::bootstrap(auth);

    view! {
        <Stylesheet id="leptos" href="/pkg/academy.css"/>
        <Title text="Academia"/>

        <Router>
            <Routes fallback=|| view! { <AuthGuard><NotFoundPage/></AuthGuard> }>
                <Route path=StaticSegment("") view=|| view! { <AuthGuard><HomePage/></AuthGuard> }/>
                <Route path=StaticSegment("login") view=|| view! { <AuthGuard><LoginPage/></AuthGuard> }/>
                <Route path=StaticSegment("signup") view=|| view! { <AuthGuard><SignupPage/></AuthGuard> }/>
                <Route
                    path=StaticSegment("inaugural-signup")
                    view=|| view! { <AuthGuard><InauguralSignupPage/></AuthGuard> }
                />
                <Route
                    path=StaticSegment("enrollment-signup")
                    view=|| view! { <AuthGuard><EnrollmentSignupPage/></AuthGuard> }
                />
                <Route
                    path=(StaticSegment("auth"), StaticSegment("callback"))
                    view=|| view! { <AuthGuard><AuthCallbackPage/></AuthGuard> }
                />
                <Route
                    path=StaticSegment("inaugural-class")
                    view=|| view! { <AuthGuard><InauguralClassPage/></AuthGuard> }
                />
                <Route
                    path=StaticSegment("inaugural-dashboard")
                    view=|| view! { <AuthGuard><InauguralDashboardPage/></AuthGuard> }
                />
                <Route
                    path=StaticSegment("enrollment-form")
                    view=|| view! { <AuthGuard><EnrollmentFormPage/></AuthGuard> }
                />
                <Route
                    path=StaticSegment("enrollment-dashboard")
                    view=|| view! { <AuthGuard><EnrollmentDashboardPage/></AuthGuard> }
                />
                <Route path=StaticSegment("students") view=|| view! { <AuthGuard><StudentsPage/></AuthGuard> }/>
                <Route path=StaticSegment("teachers") view=|| view! { <AuthGuard><TeachersPage/></AuthGuard> }/>
                <Route
                    path=StaticSegment("modalities")
                    view=|| view! { <AuthGuard><ModalitiesPage/></AuthGuard> }
                />
                <Route path=StaticSegment("events") view=|| view! { <AuthGuard><EventsPage/></AuthGuard> }/>
                <Route path=StaticSegment("payments") view=|| view! { <AuthGuard><PaymentsPage/></AuthGuard> }/>
                <Route path=StaticSegment("reports") view=|| view! { <AuthGuard><ReportsPage/></AuthGuard> }/>
            </Routes>
        </Router>
    }
}
