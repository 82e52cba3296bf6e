use leptos::prelude::*;

use crate::graph::EntityType;
use crate::store::SessionState;

/// Nodes listed under "Most connected".
const TOP_NODES: usize = 5;

#[derive(Clone, Debug, Default, PartialEq)]
struct GraphStats {
	nodes: usize,
	edges: usize,
	categories: Vec<(EntityType, &'static str, usize)>,
	top: Vec<(String, usize)>,
}

fn graph_stats(state: &SessionState) -> GraphStats {
	let Some(graph) = state.graph() else {
		return GraphStats::default();
	};
	let categories = graph
		.category_counts()
		.into_iter()
		.map(|(ty, count)| (ty, state.type_colors().get(&ty).copied().unwrap_or(ty.color()), count))
		.collect();
	let mut top: Vec<(String, usize)> = graph
		.nodes()
		.iter()
		.filter(|n| n.degree > 0)
		.map(|n| (n.id.clone(), n.degree))
		.collect();
	top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
	top.truncate(TOP_NODES);
	GraphStats {
		nodes: graph.nodes().len(),
		edges: graph.edges().len(),
		categories,
		top,
	}
}

/// Node and edge counts, category legend and the best connected entities.
#[component]
pub fn GraphLegend() -> impl IntoView {
	let store = expect_context::<RwSignal<SessionState>>();
	let version = Memo::new(move |_| store.with(|s| s.graph_version()));
	let stats = Memo::new(move |_| {
		version.track();
		store.with_untracked(graph_stats)
	});
	let selected = Memo::new(move |_| store.with(|s| s.selection.selected_node.clone()));

	view! {
		<Show when=move || stats.with(|s| s.nodes > 0)>
			<aside class="graph-legend">
				<section class="stats">
					<h3>"Graph"</h3>
					<p>{move || format!("{} nodes", stats.with(|s| s.nodes))}</p>
					<p>{move || format!("{} edges", stats.with(|s| s.edges))}</p>
				</section>
				<section class="categories">
					<h3>"Categories"</h3>
					<ul>
						{move || {
							stats
								.get()
								.categories
								.into_iter()
								.map(|(ty, color, count)| {
									view! {
										<li>
											<span class="swatch" style=format!("background-color: {color}")></span>
											{format!("{} ({count})", ty.display_name())}
										</li>
									}
								})
								.collect_view()
						}}
					</ul>
				</section>
				<section class="top-nodes">
					<h3>"Most connected"</h3>
					<ul>
						{move || {
							stats
								.get()
								.top
								.into_iter()
								.map(|(id, degree)| {
									let target = id.clone();
									let is_selected = {
										let id = id.clone();
										move || selected.with(|s| s.as_deref() == Some(id.as_str()))
									};
									view! {
										<li
											class:selected=is_selected
											on:click=move |_| {
												let target = target.clone();
												store.update(|s| s.selection.set_selected_node(Some(target), true));
											}
										>
											{format!("{id} ({degree})")}
										</li>
									}
								})
								.collect_view()
						}}
					</ul>
				</section>
			</aside>
		</Show>
	}
}
