use std::sync::{Mutex, MutexGuard, PoisonError};

/// Acquire a mutex, recovering the guard if a previous holder panicked.
///
/// Recovery clears the poison without rolling anything back. Batch and
/// validation paths check before they write and stay whole, but a panic
/// part-way through a [`World::modify_entity`] closure or a system hook keeps
/// whatever that code had already written to the entity or system.
///
/// [`World::modify_entity`]: crate::World::modify_entity
pub fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
