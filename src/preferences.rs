//! Persisted user preferences.

use log::warn;

use crate::config::LAYOUT_MODE_KEY;
use crate::store::LayoutMode;

/// String key-value storage that survives reloads.
pub trait PreferenceStore {
	/// Stored value for `key`, if any.
	fn load(&self, key: &str) -> Option<String>;
	/// Store `value` under `key`; failures are logged, not returned.
	fn save(&self, key: &str, value: &str);
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for std::sync::Arc<T> {
	fn load(&self, key: &str) -> Option<String> {
		(**self).load(key)
	}

	fn save(&self, key: &str, value: &str) {
		(**self).save(key, value)
	}
}

/// The browser's `localStorage`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
	fn storage() -> Option<web_sys::Storage> {
		web_sys::window()?.local_storage().ok().flatten()
	}
}

impl PreferenceStore for LocalStorage {
	fn load(&self, key: &str) -> Option<String> {
		Self::storage()?.get_item(key).ok().flatten()
	}

	fn save(&self, key: &str, value: &str) {
		match Self::storage() {
			Some(storage) => {
				if storage.set_item(key, value).is_err() {
					warn!("could not persist {key}");
				}
			}
			None => warn!("localStorage unavailable, {key} not persisted"),
		}
	}
}

/// Stored layout mode; absent or unrecognised values give the default mode.
pub fn load_layout_mode(store: &dyn PreferenceStore) -> LayoutMode {
	store
		.load(LAYOUT_MODE_KEY)
		.and_then(|value| value.parse().ok())
		.unwrap_or_default()
}

/// Persist the layout mode.
pub fn save_layout_mode(store: &dyn PreferenceStore, mode: LayoutMode) {
	store.save(LAYOUT_MODE_KEY, mode.as_str());
}

#[cfg(test)]
pub(crate) mod tests {
	use std::collections::HashMap;
	use std::sync::Mutex;

	use super::*;

	/// In-memory stand-in for `localStorage`.
	#[derive(Default)]
	pub(crate) struct MemoryStore(Mutex<HashMap<String, String>>);

	impl PreferenceStore for MemoryStore {
		fn load(&self, key: &str) -> Option<String> {
			self.0.lock().unwrap().get(key).cloned()
		}

		fn save(&self, key: &str, value: &str) {
			self.0.lock().unwrap().insert(key.to_string(), value.to_string());
		}
	}

	#[test]
	fn missing_preference_defaults_to_hybrid() {
		assert_eq!(load_layout_mode(&MemoryStore::default()), LayoutMode::Hybrid);
	}

	#[test]
	fn garbage_preference_defaults_to_hybrid() {
		let store = MemoryStore::default();
		store.save(LAYOUT_MODE_KEY, "circular");
		assert_eq!(load_layout_mode(&store), LayoutMode::Hybrid);
	}

	#[test]
	fn saved_mode_is_read_back() {
		let store = MemoryStore::default();
		save_layout_mode(&store, LayoutMode::Noverlap);
		assert_eq!(store.load(LAYOUT_MODE_KEY).as_deref(), Some("noverlap"));
		assert_eq!(load_layout_mode(&store), LayoutMode::Noverlap);
	}
}
