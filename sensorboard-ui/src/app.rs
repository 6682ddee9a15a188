//! App Root Component

use leptos::*;

use crate::pages::Dashboard;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    view! {
        <div class="min-h-screen bg-gray-50 text-gray-900 flex flex-col">
            <header class="bg-white border-b border-gray-200 py-4 px-4">
                <div class="container mx-auto">
                    <h1 class="text-2xl font-bold">"Sensor Dashboard"</h1>
                    <p class="text-gray-500 text-sm">"Live temperature and humidity"</p>
                </div>
            </header>

            <main class="flex-1 container mx-auto px-4 py-8">
                <Dashboard />
            </main>
        </div>
    }
}
