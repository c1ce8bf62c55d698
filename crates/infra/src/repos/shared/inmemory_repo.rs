use std::sync::{Mutex, MutexGuard};
use taskflow_domain::{Entity, ID};

/// Useful functions for creating inmemory repositories

// A poisoned lock only means another test thread panicked while holding it,
// the data itself is still usable.
fn lock<T>(collection: &Mutex<Vec<T>>) -> MutexGuard<'_, Vec<T>> {
    collection.lock().unwrap_or_else(|e| e.into_inner())
}

pub fn insert<T: Clone>(val: &T, collection: &Mutex<Vec<T>>) {
    lock(collection).push(val.clone());
}

pub fn find<T: Clone + Entity<ID>>(val_id: &ID, collection: &Mutex<Vec<T>>) -> Option<T> {
    lock(collection)
        .iter()
        .find(|item| item.id() == *val_id)
        .cloned()
}

pub fn find_by<T: Clone, F: FnMut(&T) -> bool>(collection: &Mutex<Vec<T>>, mut compare: F) -> Vec<T> {
    lock(collection)
        .iter()
        .filter(|item| compare(item))
        .cloned()
        .collect()
}

/// Returns the number of updated items
pub fn update_many<T, F: Fn(&T) -> bool, U: Fn(&mut T)>(
    collection: &Mutex<Vec<T>>,
    compare: F,
    update: U,
) -> u64 {
    let mut collection = lock(collection);
    let mut updated = 0;
    for item in collection.iter_mut() {
        if compare(item) {
            update(item);
            updated += 1;
        }
    }
    updated
}
