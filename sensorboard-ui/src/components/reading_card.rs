//! Reading Card Component
//!
//! Latest value of one sensor channel. The poller writes the value into the
//! element by id, so the card itself holds no reactive state.

use leptos::*;

/// Reading card component
#[component]
pub fn ReadingCard(
    /// Channel name to display
    #[prop(into)]
    title: String,
    /// Id of the element receiving the value
    element_id: &'static str,
    /// Unit shown after the value
    #[prop(into)]
    unit: String,
    /// Accent colour class for the value
    #[prop(optional, into)]
    accent: Option<String>,
) -> impl IntoView {
    let accent = accent.unwrap_or_else(|| "text-gray-900".to_string());

    view! {
        <div class="bg-white rounded-lg p-4 border border-gray-200 shadow-sm">
            <span class="text-gray-500 text-sm">{title}</span>

            <div class=format!("text-3xl font-bold mt-2 {}", accent)>
                <span id=element_id>"--"</span>
                <span class="text-gray-400 text-lg ml-1">{unit}</span>
            </div>
        </div>
    }
}
