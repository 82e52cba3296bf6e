use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::controls::GraphControls;
use crate::components::dataset_selector::DatasetSelector;
use crate::components::force_graph::ForceGraphCanvas;
use crate::components::legend::GraphLegend;
use crate::graph::loader::load_dataset;
use crate::store::{LoadStatus, SessionState};

/// Knowledge graph viewer: canvas, dataset selector, controls and legend.
#[component]
pub fn Home() -> impl IntoView {
	let store = expect_context::<RwSignal<SessionState>>();

	// Load the selected dataset; stale completions are dropped by the store.
	let wanted = Memo::new(move |_| {
		store.with(|s| (s.selected_dataset().map(str::to_string), s.status() == &LoadStatus::Idle))
	});
	Effect::new(move |_| {
		let (Some(_), true) = wanted.get() else {
			return;
		};
		let Some(ticket) = store.try_update(|s| s.begin_load()).flatten() else {
			return;
		};
		spawn_local(async move {
			let outcome = load_dataset(&ticket.dataset).await;
			store.update(|s| {
				s.finish_load(&ticket, outcome);
			});
		});
	});

	let status = Memo::new(move |_| store.with(|s| s.status().clone()));
	let dataset = move || store.with(|s| s.selected_dataset().unwrap_or_default().to_string());

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<ForceGraphCanvas fullscreen=true />
				<div class="graph-overlay">
					<h1>"Knowledge Graph"</h1>
					<p class="subtitle">
						"Click a node or edge to select it. Drag nodes to reposition. Scroll to zoom. Drag background to pan."
					</p>
					<DatasetSelector />
					<GraphControls />
				</div>
				<GraphLegend />
				{move || match status.get() {
					LoadStatus::Loading => {
						view! {
							<div class="loading-overlay">
								<div class="spinner"></div>
								<p>{move || format!("Loading {}...", dataset())}</p>
							</div>
						}
							.into_any()
					}
					LoadStatus::Failed(reason) => {
						view! {
							<div class="banner error" role="alert">
								<strong>{move || format!("Could not load {}", dataset())}</strong>
								<p>{reason}</p>
							</div>
						}
							.into_any()
					}
					LoadStatus::Empty => {
						view! {
							<div class="banner">{move || format!("{} has no entities", dataset())}</div>
						}
							.into_any()
					}
					LoadStatus::Idle | LoadStatus::Loaded => ().into_any(),
				}}
			</div>
		</ErrorBoundary>
	}
}
