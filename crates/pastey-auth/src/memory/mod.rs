//! In-memory implementations for testing and single-process deployments

mod identity;
mod paste;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{AuthError, AuthResult};

pub use identity::InMemoryIdentityStore;
pub use paste::InMemoryPasteStore;

fn read<T>(lock: &RwLock<T>) -> AuthResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| AuthError::LookupFailed("in-memory store lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> AuthResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| AuthError::LookupFailed("in-memory store lock poisoned".into()))
}
