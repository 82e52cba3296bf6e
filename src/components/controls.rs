use leptos::prelude::*;

use crate::store::{GraphCommand, LayoutMode, SessionState};

/// Camera and layout buttons.
#[component]
pub fn GraphControls() -> impl IntoView {
	let store = expect_context::<RwSignal<SessionState>>();
	let mode = Memo::new(move |_| store.with(|s| s.layout_mode()));
	let has_graph = move || store.with(|s| s.graph().is_some());

	view! {
		<div class="graph-controls">
			<button
				title="Fit the whole graph in view"
				prop:disabled=move || !has_graph()
				on:click=move |_| store.update(|s| s.request(GraphCommand::FitView))
			>
				"Fit view"
			</button>
			<div class="layout-modes" role="group" aria-label="Layout">
				{LayoutMode::ALL
					.into_iter()
					.map(|m| {
						view! {
							<button
								class:active=move || mode.get() == m
								on:click=move |_| {
									if mode.get_untracked() != m {
										store.update(|s| s.set_layout_mode(m));
									}
								}
							>
								{m.display_name()}
							</button>
						}
					})
					.collect_view()}
			</div>
			<button
				title="Run the current layout again from the current positions"
				prop:disabled=move || !has_graph()
				on:click=move |_| store.update(|s| s.request(GraphCommand::Rerun))
			>
				"Re-run layout"
			</button>
			<button
				title="Scatter nodes randomly, then run the current layout"
				prop:disabled=move || !has_graph()
				on:click=move |_| store.update(|s| s.request(GraphCommand::Reshuffle))
			>
				"Reshuffle"
			</button>
		</div>
	}
}
