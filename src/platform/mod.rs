//! Platform abstraction layer
//!
//! Key/value storage: LocalStorage in the browser, an in-memory map
//! natively so the gallery and settings behave the same under test.

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
}

/// Read a raw string value
#[cfg(target_arch = "wasm32")]
pub fn storage_get(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

/// Write a raw string value
#[cfg(target_arch = "wasm32")]
pub fn storage_set(key: &str, value: &str) {
    match local_storage() {
        Some(storage) => {
            if storage.set_item(key, value).is_err() {
                log::warn!("Failed to write '{}' to LocalStorage", key);
            }
        }
        None => log::warn!("LocalStorage unavailable, '{}' not saved", key),
    }
}

/// Delete a value
#[cfg(target_arch = "wasm32")]
pub fn storage_remove(key: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(key);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod memory {
    use std::cell::RefCell;
    use std::collections::HashMap;

    thread_local! {
        pub static STORE: RefCell<HashMap<String, String>> = RefCell::new(HashMap::new());
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn storage_get(key: &str) -> Option<String> {
    memory::STORE.with(|s| s.borrow().get(key).cloned())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn storage_set(key: &str, value: &str) {
    memory::STORE.with(|s| {
        s.borrow_mut().insert(key.to_string(), value.to_string());
    });
}

#[cfg(not(target_arch = "wasm32"))]
pub fn storage_remove(key: &str) {
    memory::STORE.with(|s| {
        s.borrow_mut().remove(key);
    });
}
