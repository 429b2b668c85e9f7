use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use leptos::ev::{Event, MouseEvent};
use leptos::prelude::*;
use log::{error, info};

use crate::components::force_graph::{ForceGraphCanvas, GraphData};
use crate::engine::{
	DetailSubgraph, FilterCategory, FilterChange, FilterEngine, GraphSnapshot, ReciprocalMode,
	Interval, SizeOp, SizePredicate,
};

const SAMPLE_GRAPH: &str = include_str!("../../assets/sample_graph.json");

fn next_mode(mode: ReciprocalMode) -> ReciprocalMode {
	match mode {
		ReciprocalMode::All => ReciprocalMode::ReciprocalOnly,
		ReciprocalMode::ReciprocalOnly => ReciprocalMode::NonReciprocalOnly,
		ReciprocalMode::NonReciprocalOnly => ReciprocalMode::All,
	}
}

fn next_op(op: SizeOp) -> SizeOp {
	match op {
		SizeOp::Equal => SizeOp::AtLeast,
		SizeOp::AtLeast => SizeOp::AtMost,
		SizeOp::AtMost => SizeOp::Equal,
	}
}

fn describe(predicate: SizePredicate) -> String {
	let op = match predicate.op {
		SizeOp::Equal => "=",
		SizeOp::AtLeast => "≥",
		SizeOp::AtMost => "≤",
	};
	format!("{op} {}", predicate.size)
}

/// Next size to try within `[min, max]`, wrapping back to `min`.
fn next_size(size: usize, (min, max): (usize, usize)) -> usize {
	if size < min || size >= max { min } else { size + 1 }
}

fn with_bound(range: Interval, upper: bool, value: f64) -> Interval {
	if upper {
		Interval::new(range.min, value)
	} else {
		Interval::new(value, range.max)
	}
}

/// Fold a canvas click into the selection. In multi-select mode a click
/// toggles the node and a background click keeps the selection; otherwise
/// the click replaces it.
fn toggle_selection(selection: &mut Vec<String>, clicked: Option<String>, multi: bool) {
	match (clicked, multi) {
		(Some(id), true) => match selection.iter().position(|s| *s == id) {
			Some(at) => {
				selection.remove(at);
			}
			None => selection.push(id),
		},
		(Some(id), false) => *selection = vec![id],
		(None, true) => {}
		(None, false) => selection.clear(),
	}
}

/// The option after `current`, wrapping around.
fn next_option(options: &[String], current: &str) -> Option<String> {
	let at = options.iter().position(|o| o == current);
	let next = at.map_or(0, |i| (i + 1) % options.len());
	options.get(next).cloned()
}

/// Main view, filter controls and the detail view over one snapshot.
#[component]
fn Explorer(snapshot: GraphSnapshot) -> impl IntoView {
	let methods: Vec<String> = snapshot.community_methods().map(String::from).collect();
	let metrics: Vec<String> = snapshot.centrality_metrics().map(String::from).collect();
	let directory = Arc::new(snapshot.clone());
	let engine = Rc::new(RefCell::new(FilterEngine::new(snapshot)));

	let (view_model, set_view_model) = signal(engine.borrow().view());
	let (filters, set_filters) = signal(engine.borrow().filters().clone());
	let (selected, set_selected) = signal(None::<String>);
	let (multi, set_multi) = signal(false);
	let (selection, set_selection) = signal(Vec::<String>::new());
	let (term, set_term) = signal(String::new());
	let (detail, set_detail) = signal(None::<DetailSubgraph>);

	let graph_data = Signal::derive(move || GraphData::from_view(&view_model.get()));
	let detail_data = Signal::derive(move || {
		detail
			.get()
			.map(|sub| GraphData::from_detail(&sub))
			.unwrap_or_default()
	});

	let apply = {
		let engine = engine.clone();
		move |change: FilterChange| {
			let update = engine.borrow_mut().apply_change(change);
			info!(
				"{:?} {:?}, revision {}",
				update.category, update.transition, update.publication.view.revision
			);
			set_filters.set(engine.borrow().filters().clone());
			set_view_model.set(update.publication.view);
		}
	};

	Effect::new(move |_| {
		let clicked = selected.get();
		let multi = multi.get_untracked();
		set_selection.update(|selection| toggle_selection(selection, clicked, multi));
	});

	let engine_select = engine.clone();
	Effect::new(move |_| {
		let nodes = selection.get();
		if nodes.is_empty() {
			set_detail.set(None);
			return;
		}
		match engine_select.borrow().extract_from_selection(nodes.as_slice(), &[]) {
			Ok(sub) => {
				info!("Opening {}", sub.title());
				set_detail.set(Some(sub));
			}
			Err(e) => error!("Cannot open detail view: {e}"),
		}
	});

	let toggle = {
		let apply = apply.clone();
		move |category: FilterCategory| {
			let apply = apply.clone();
			move |_: MouseEvent| {
				let active = !filters.get_untracked().is_active(category);
				apply(FilterChange::SetActive { category, active });
			}
		}
	};
	let switch = move |category: FilterCategory| {
		move || if filters.get().is_active(category) { "on" } else { "off" }
	};

	let cycle_mode = {
		let apply = apply.clone();
		move |_: MouseEvent| {
			let mode = filters.get_untracked().node_filters.reciprocal_mode;
			apply(FilterChange::ReciprocalMode(next_mode(mode)));
		}
	};
	let cycle_method = {
		let apply = apply.clone();
		move |_: MouseEvent| {
			if let Some(method) = next_option(&methods, &filters.get_untracked().community.method) {
				apply(FilterChange::CommunityMethod(method));
			}
		}
	};
	let cycle_op = {
		let apply = apply.clone();
		move |_: MouseEvent| {
			let mut predicate = filters.get_untracked().community.size_predicate;
			predicate.op = next_op(predicate.op);
			apply(FilterChange::SizePredicate(predicate));
		}
	};
	let cycle_size = {
		let apply = apply.clone();
		let engine = engine.clone();
		move |_: MouseEvent| {
			let community = filters.get_untracked().community;
			let Some(bounds) = engine.borrow().snapshot().community_size_bounds(&community.method) else {
				return;
			};
			let mut predicate = community.size_predicate;
			predicate.size = next_size(predicate.size, bounds);
			apply(FilterChange::SizePredicate(predicate));
		}
	};
	let edit_range = {
		let apply = apply.clone();
		move |ratio: bool, upper: bool| {
			let apply = apply.clone();
			move |ev: Event| {
				let Ok(value) = event_target_value(&ev).trim().parse::<f64>() else {
					return;
				};
				let node_filters = filters.get_untracked().node_filters;
				apply(if ratio {
					FilterChange::ReciprocalWeightRatioRange(with_bound(
						node_filters.reciprocal_weight_ratio_range,
						upper,
						value,
					))
				} else {
					FilterChange::EdgeWeightRange(with_bound(node_filters.edge_weight_range, upper, value))
				});
			}
		}
	};
	let bound = move |ratio: bool, upper: bool| {
		move || {
			let node_filters = filters.get().node_filters;
			let range = if ratio {
				node_filters.reciprocal_weight_ratio_range
			} else {
				node_filters.edge_weight_range
			};
			let value = if upper { range.max } else { range.min };
			value.to_string()
		}
	};
	let cycle_metric = move |_: MouseEvent| {
		if let Some(metric) = next_option(&metrics, &filters.get_untracked().centrality.metric) {
			apply(FilterChange::CentralityMetric(metric));
		}
	};

	let matches = move || {
		let term = term.get();
		if term.is_empty() {
			return Vec::new();
		}
		directory
			.search(&term)
			.into_iter()
			.map(|n| (n.id.clone(), n.label.clone()))
			.collect::<Vec<_>>()
	};

	let stats_line = move || {
		let stats = view_model.get().stats.clone();
		format!(
			"{} nodes, {} edges visible. Average weight {:.2}, {:.2}% reciprocal.",
			stats.visible_nodes, stats.visible_edges, stats.avg_edge_weight, stats.reciprocity_percent
		)
	};

	view! {
		<div class="fullscreen-graph">
			<ForceGraphCanvas data=graph_data fullscreen=true on_select=set_selected />
			<div class="graph-overlay">
				<h1>"Answerer Graph"</h1>
				<p class="subtitle">{stats_line}</p>
				<div class="filters">
					<button on:click=toggle(FilterCategory::NodeFilters)>
						"Weight filters: " {switch(FilterCategory::NodeFilters)}
					</button>
					<label>
						"Weight "
						<input type="number" prop:value=bound(false, false) on:change=edit_range(false, false) />
						<input type="number" prop:value=bound(false, true) on:change=edit_range(false, true) />
					</label>
					<label>
						"Ratio "
						<input type="number" step="0.01" prop:value=bound(true, false) on:change=edit_range(true, false) />
						<input type="number" step="0.01" prop:value=bound(true, true) on:change=edit_range(true, true) />
					</label>
					<button on:click=cycle_mode>
						"Reciprocity: " {move || format!("{:?}", filters.get().node_filters.reciprocal_mode)}
					</button>
					<button on:click=toggle(FilterCategory::Community)>
						"Communities: " {switch(FilterCategory::Community)}
					</button>
					<button on:click=cycle_method>
						"Method: " {move || filters.get().community.method}
					</button>
					<button on:click=cycle_op>"Size op"</button>
					<button on:click=cycle_size>
						"Size: " {move || describe(filters.get().community.size_predicate)}
					</button>
					<button on:click=toggle(FilterCategory::Centrality)>
						"Centrality: " {switch(FilterCategory::Centrality)}
					</button>
					<button on:click=cycle_metric>
						"Metric: " {move || filters.get().centrality.metric}
					</button>
				</div>
				<div class="node-search">
					<input
						type="text"
						placeholder="Search for a node"
						prop:value=move || term.get()
						on:input=move |ev: Event| set_term.set(event_target_value(&ev))
					/>
					<button on:click=move |_: MouseEvent| set_multi.update(|m| *m = !*m)>
						"Multi-select: " {move || if multi.get() { "on" } else { "off" }}
					</button>
					<ul>
						{move || {
							matches()
								.into_iter()
								.map(|(id, label)| {
									view! {
										<li on:click=move |_: MouseEvent| set_selected.set(Some(id.clone()))>
											{label}
										</li>
									}
								})
								.collect_view()
						}}
					</ul>
				</div>
			</div>
			<div class="detail-view">
				<h2>{move || detail.get().map(|sub| sub.title())}</h2>
				<ForceGraphCanvas data=detail_data width=Some(400.0) height=Some(300.0) />
			</div>
		</div>
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let snapshot = GraphSnapshot::from_json(SAMPLE_GRAPH).inspect_err(|e| {
		error!("Bundled graph did not load: {e}");
	});

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
			{snapshot.map(|snapshot| view! { <Explorer snapshot /> })}
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn options_cycle_and_wrap() {
		let options = vec!["cliques".to_string(), "modularity".to_string()];
		assert_eq!(next_option(&options, "cliques").as_deref(), Some("modularity"));
		assert_eq!(next_option(&options, "modularity").as_deref(), Some("cliques"));
		assert_eq!(next_option(&options, "unknown").as_deref(), Some("cliques"));
		assert_eq!(next_option(&[], "cliques"), None);
	}

	#[test]
	fn clicks_fold_into_the_selection() {
		let mut selection = Vec::new();
		toggle_selection(&mut selection, Some("1".into()), false);
		toggle_selection(&mut selection, Some("2".into()), false);
		assert_eq!(selection, vec!["2"]);

		toggle_selection(&mut selection, Some("5".into()), true);
		toggle_selection(&mut selection, None, true);
		toggle_selection(&mut selection, Some("3".into()), true);
		assert_eq!(selection, vec!["2", "5", "3"]);

		toggle_selection(&mut selection, Some("5".into()), true);
		assert_eq!(selection, vec!["2", "3"]);

		toggle_selection(&mut selection, None, false);
		assert!(selection.is_empty());
	}

	#[test]
	fn multi_selection_opens_a_shared_detail_view() {
		let engine = FilterEngine::new(GraphSnapshot::from_json(SAMPLE_GRAPH).unwrap());
		let mut selection = Vec::new();
		for id in ["8", "1"] {
			toggle_selection(&mut selection, Some(id.into()), true);
		}
		let detail = engine.extract_from_selection(selection.as_slice(), &[]).unwrap();
		assert_eq!(detail.title(), "hiro, ada");
		assert_eq!(detail.nodes.len(), 2);
	}

	#[test]
	fn range_edits_move_one_bound() {
		let range = Interval::new(2.0, 50.0);
		assert_eq!(with_bound(range, false, 10.0), Interval::new(10.0, 50.0));
		assert_eq!(with_bound(range, true, 30.0), Interval::new(2.0, 30.0));
	}

	#[test]
	fn size_control_stays_within_bounds() {
		assert_eq!(next_size(2, (2, 4)), 3);
		assert_eq!(next_size(4, (2, 4)), 2);
		assert_eq!(next_size(7, (2, 4)), 2);
		assert_eq!(describe(SizePredicate::new(next_op(SizeOp::Equal), 3)), "≥ 3");
	}

	#[test]
	fn bundled_graph_loads() {
		let snapshot = GraphSnapshot::from_json(SAMPLE_GRAPH).unwrap();
		assert_eq!(snapshot.nodes().len(), 10);
		assert_eq!(snapshot.community_methods().count(), 3);
	}
}
