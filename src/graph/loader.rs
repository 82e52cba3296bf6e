//! Fetching and assembling datasets.
//!
//! A dataset is two documents under `DATA_ROOT/<id>/`: an entities document
//! mapping document ids to `{ "entity_names": [...] }` and a relations
//! document mapping document ids to `{ "relation_pairs": [[src, tgt], ...] }`.
//! A document that is unreachable or lacks its list field fails the load.
//! Individual names or pairs that are not strings are skipped with a warning.

use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use super::classify::classify;
use super::manifest::Manifest;
use super::types::{EdgeProperties, GraphData, GraphLink, GraphNode, NodeProperties};
use crate::config::{DATA_ROOT, ENTITIES_FILE, MANIFEST_URL, RELATIONS_FILE};
use crate::error::{LoadError, Result};

/// Relation type given to every aggregated pair.
pub const RELATION_TYPE: &str = "RELATES_TO";

#[derive(Clone, Debug, Deserialize)]
struct EntityRecord {
	entity_names: Vec<Value>,
}

#[derive(Clone, Debug, Deserialize)]
struct RelationRecord {
	relation_pairs: Vec<Value>,
}

/// Parsed entities document, in document order.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct EntitiesDocument(IndexMap<String, EntityRecord>);

/// Parsed relations document, in document order.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct RelationsDocument(IndexMap<String, RelationRecord>);

impl EntitiesDocument {
	/// Parse the entities document.
	pub fn parse(text: &str) -> Result<Self> {
		serde_json::from_str(text).map_err(LoadError::parse("entities document"))
	}
}

impl RelationsDocument {
	/// Parse the relations document.
	pub fn parse(text: &str) -> Result<Self> {
		serde_json::from_str(text).map_err(LoadError::parse("relations document"))
	}
}

/// URL of one document of a dataset.
pub fn dataset_url(dataset: &str, file: &str) -> String {
	format!("{DATA_ROOT}/{dataset}/{file}")
}

/// Build the loader output from both documents.
///
/// Entity names are deduplicated in first-seen order. Relation pairs are kept
/// only when both endpoints are known entities; repeated ordered pairs collapse
/// into one link whose weight counts the repetitions.
pub fn assemble(entities: &EntitiesDocument, relations: &RelationsDocument) -> GraphData {
	let mut skipped_names = 0usize;
	let names: IndexSet<&str> = entities
		.0
		.values()
		.flat_map(|record| record.entity_names.iter())
		.filter_map(|name| {
			let name = name.as_str();
			if name.is_none() {
				skipped_names += 1;
			}
			name
		})
		.filter(|name| !name.is_empty())
		.collect();
	if skipped_names > 0 {
		warn!("skipped {skipped_names} entity names that are not strings");
	}

	let mut pairs: IndexMap<(&str, &str), u32> = IndexMap::new();
	let (mut malformed, mut dangling) = (0usize, 0usize);
	for record in relations.0.values() {
		for pair in &record.relation_pairs {
			let Some([Value::String(source), Value::String(target)]) =
				pair.as_array().map(Vec::as_slice)
			else {
				malformed += 1;
				continue;
			};
			let (source, target) = (source.as_str(), target.as_str());
			if !names.contains(source) || !names.contains(target) {
				dangling += 1;
				continue;
			}
			*pairs.entry((source, target)).or_insert(0) += 1;
		}
	}
	if malformed > 0 {
		warn!("skipped {malformed} relation pairs without exactly two string endpoints");
	}
	if dangling > 0 {
		warn!("skipped {dangling} relation pairs naming unknown entities");
	}

	let nodes = names
		.iter()
		.map(|&name| {
			let entity_type = classify(name);
			GraphNode {
				id: name.to_string(),
				labels: vec![name.to_string()],
				properties: NodeProperties {
					entity_id: name.to_string(),
					entity_type,
					description: format!("Category: {entity_type}"),
					source_id: String::new(),
					file_path: String::new(),
					extra: BTreeMap::new(),
				},
			}
		})
		.collect();

	let links = pairs
		.into_iter()
		.enumerate()
		.map(|(seq, ((source, target), weight))| GraphLink {
			id: format!("edge-{seq}"),
			source: source.to_string(),
			target: target.to_string(),
			edge_type: RELATION_TYPE.to_string(),
			properties: EdgeProperties {
				weight,
				keywords: String::new(),
				description: String::new(),
				extra: BTreeMap::new(),
			},
		})
		.collect();

	GraphData { nodes, links }
}

fn network_error(url: &str, err: JsValue) -> LoadError {
	LoadError::Network {
		url: url.to_string(),
		reason: err
			.dyn_ref::<js_sys::Error>()
			.map(|e| String::from(e.message()))
			.or_else(|| err.as_string())
			.unwrap_or_else(|| format!("{err:?}")),
	}
}

async fn fetch_text(url: &str) -> Result<String> {
	let window = web_sys::window().ok_or_else(|| LoadError::Network {
		url: url.to_string(),
		reason: "no window".to_string(),
	})?;
	let response = JsFuture::from(window.fetch_with_str(url))
		.await
		.map_err(|err| network_error(url, err))?;
	let response: Response = response
		.dyn_into()
		.map_err(|err| network_error(url, err))?;
	if !response.ok() {
		return Err(LoadError::Status {
			url: url.to_string(),
			status: response.status(),
		});
	}
	let body = response.text().map_err(|err| network_error(url, err))?;
	let text = JsFuture::from(body)
		.await
		.map_err(|err| network_error(url, err))?;
	text.as_string()
		.ok_or_else(|| network_error(url, JsValue::from_str("response body is not text")))
}

/// Dataset ids listed in the manifest. Any failure yields an empty list.
pub async fn list_datasets() -> Vec<String> {
	let manifest = match fetch_text(MANIFEST_URL).await {
		Ok(text) => Manifest::parse(&text),
		Err(err) => Err(err),
	};
	match manifest {
		Ok(manifest) => {
			info!("found {} datasets: {:?}", manifest.datasets.len(), manifest.datasets);
			manifest.datasets
		}
		Err(err) => {
			error!("could not read dataset manifest: {err}");
			Vec::new()
		}
	}
}

/// Fetch and assemble one dataset.
pub async fn load_dataset(dataset: &str) -> Result<GraphData> {
	info!("loading dataset {dataset}");
	let entities = fetch_text(&dataset_url(dataset, ENTITIES_FILE)).await?;
	let relations = fetch_text(&dataset_url(dataset, RELATIONS_FILE)).await?;
	let entities = EntitiesDocument::parse(&entities)?;
	let relations = RelationsDocument::parse(&relations)?;
	Ok(assemble(&entities, &relations))
}
