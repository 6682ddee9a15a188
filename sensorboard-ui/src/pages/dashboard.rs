//! Dashboard Page
//!
//! Latest readings, the date title and the live chart. Polling starts once
//! the canvas is mounted.

use std::rc::Rc;

use gloo_timers::callback::Interval;
use leptos::*;
use sensorboard::{
    CycleError, CycleOutcome, OverlapPolicy, Poller, Renderer,
    CHART_CANVAS_ID, DATE_TITLE_ID, HUMIDITY_ID, POLL_INTERVAL_MS, TEMPERATURE_ID,
};

use crate::api::GlooSource;
use crate::components::{CanvasSurface, Chart, ReadingCard};
use crate::state::DomPage;

type DashboardPoller = Poller<GlooSource, DomPage, CanvasSurface>;

/// Dashboard page component
#[component]
pub fn Dashboard() -> impl IntoView {
    let canvas_ref = create_node_ref::<html::Canvas>();
    let last_update = create_rw_signal(None::<String>);
    let setup_error = create_rw_signal(None::<String>);
    let started = store_value(false);

    create_effect(move |_| {
        if canvas_ref.get().is_none() || started.get_value() {
            return;
        }
        started.set_value(true);

        if let Err(e) = start_polling(last_update) {
            web_sys::console::error_1(&format!("Failed to start dashboard: {}", e).into());
            setup_error.set(Some(e.to_string()));
        }
    });

    view! {
        <div class="space-y-8">
            <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                <ReadingCard
                    title="Temperature"
                    element_id=TEMPERATURE_ID
                    unit="°C"
                    accent="text-rose-500"
                />
                <ReadingCard
                    title="Humidity"
                    element_id=HUMIDITY_ID
                    unit="%"
                    accent="text-sky-500"
                />
            </div>

            <section class="bg-white rounded-xl p-6 border border-gray-200 shadow-sm">
                <h2 id=DATE_TITLE_ID class="text-xl font-semibold mb-4 text-gray-800"></h2>

                {move || setup_error.get().map(|e| view! {
                    <div class="text-red-600 text-sm mb-4">{e}</div>
                })}

                <Chart canvas_ref=canvas_ref />
            </section>

            <div class="text-sm text-gray-500">
                {move || {
                    last_update
                        .get()
                        .map(|t| format!("Last update: {}", t))
                        .unwrap_or_else(|| "Waiting for first update".to_string())
                }}
            </div>
        </div>
    }
}

/// Initialize the chart, run a cycle now and one every poll interval
fn start_polling(last_update: RwSignal<Option<String>>) -> Result<(), CycleError> {
    let surface = CanvasSurface::bind(CHART_CANVAS_ID)?;
    let mut renderer = Renderer::new();
    renderer.initialize(surface)?;

    let page = DomPage::new()?;
    let poller: Rc<DashboardPoller> = Rc::new(
        Poller::new(GlooSource::new(), page, renderer).with_reporter(|e| {
            web_sys::console::error_1(&format!("Error fetching sensor data: {}", e).into());
        }),
    );

    spawn_cycle(Rc::clone(&poller), last_update);

    // Ticks never wait for earlier cycles
    Interval::new(POLL_INTERVAL_MS, move || {
        if poller.should_start(OverlapPolicy::Allow) {
            spawn_cycle(Rc::clone(&poller), last_update);
        }
    })
    .forget();

    Ok(())
}

fn spawn_cycle(poller: Rc<DashboardPoller>, last_update: RwSignal<Option<String>>) {
    spawn_local(async move {
        if let Some(CycleOutcome::Rendered { .. }) = poller.run_cycle().await {
            last_update.set(Some(chrono::Local::now().format("%H:%M:%S").to_string()));
        }
    });
}
