use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::graph::loader::list_datasets;
use crate::store::SessionState;

/// Dropdown of the datasets listed in the manifest.
///
/// Fetches the manifest once on mount; the first dataset is chosen automatically.
#[component]
pub fn DatasetSelector() -> impl IntoView {
	let store = expect_context::<RwSignal<SessionState>>();

	Effect::new(move |_| {
		if !store.try_update(|s| s.begin_dataset_list()).unwrap_or(false) {
			return;
		}
		spawn_local(async move {
			let datasets = list_datasets().await;
			store.update(|s| s.finish_dataset_list(datasets));
		});
	});

	let handle_change = move |evt: ev::Event| {
		let value = event_target_value(&evt);
		if !value.is_empty() {
			store.update(|s| {
				s.select_dataset(value);
			});
		}
	};

	let datasets = Memo::new(move |_| store.with(|s| s.available_datasets().to_vec()));
	let listing = Memo::new(move |_| store.with(|s| s.is_loading_datasets()));
	let selected = move || store.with(|s| s.selected_dataset().unwrap_or_default().to_string());
	let busy = move || store.with(|s| s.is_fetching());

	view! {
		<div class="dataset-selector">
			<label for="dataset-select">"Dataset"</label>
			{move || {
				if listing.get() {
					view! { <span class="muted">"Loading datasets..."</span> }.into_any()
				} else if datasets.with(|d| d.is_empty()) {
					view! { <span class="muted">"No datasets available"</span> }.into_any()
				} else {
					view! {
						<select
							id="dataset-select"
							prop:value=selected
							prop:disabled=busy
							on:change=handle_change
						>
							{datasets
								.get()
								.into_iter()
								.map(|name| view! { <option value=name.clone()>{name.clone()}</option> })
								.collect_view()}
						</select>
					}
						.into_any()
				}
			}}
		</div>
	}
}
