//! Scoped release guard.

use crate::error::Result;
use crate::owner::OwnerToken;
use crate::store::{DocumentStore, RecordFilter, RecordUpdate, TargetSet};
use tracing::{debug, warn};

/// Guard ensuring the target set is released on every exit path of an
/// attempt.
///
/// Constructed *before* the lock write, so the release runs even when the
/// lock call itself failed after claiming a subset (the unlock is
/// conditional on the caller's token and idempotent when nothing is held).
///
/// Call `release` on the normal path to observe the result; the `Drop`
/// backstop covers early returns and panics with a best-effort unlock that
/// logs on failure but never masks an in-flight error.
#[derive(Debug)]
pub struct ReleaseGuard<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    target: &'a TargetSet,
    owner: OwnerToken,
    released: bool,
}

impl<'a, S: DocumentStore + ?Sized> ReleaseGuard<'a, S> {
    /// Register a release for `owner` over `target`.
    pub fn new(store: &'a S, target: &'a TargetSet, owner: OwnerToken) -> Self {
        Self {
            store,
            target,
            owner,
            released: false,
        }
    }

    /// Release the target set, retrying once on a transient failure.
    ///
    /// Returns the number of records released. A failed unlock leaves
    /// orphaned locks behind for the external cleanup sweep, so the first
    /// failure is logged and retried immediately before giving up.
    pub fn release(mut self) -> Result<u64> {
        self.released = true;

        match unlock(self.store, self.target, &self.owner) {
            Ok(released) => Ok(released),
            Err(first) => {
                warn!(owner = %self.owner, target = %self.target, error = %first,
                    "unlock failed, retrying once");
                unlock(self.store, self.target, &self.owner)
            }
        }
    }
}

impl<S: DocumentStore + ?Sized> Drop for ReleaseGuard<'_, S> {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = unlock(self.store, self.target, &self.owner)
        {
            warn!(owner = %self.owner, target = %self.target, error = %e,
                "unlock failed during guard drop; records may be orphaned");
        }
    }
}

/// Conditionally release every record in `target` held by `owner`.
///
/// Records held by other owners (or free) are untouched; releasing an
/// unclaimed set is a no-op returning 0.
fn unlock<S: DocumentStore + ?Sized>(
    store: &S,
    target: &TargetSet,
    owner: &OwnerToken,
) -> Result<u64> {
    let filter = RecordFilter::held_by(target.keys().to_vec(), owner.clone());
    let released = store.update_many(&filter, &RecordUpdate::release())?;
    debug!(%owner, %target, released, "unlock");
    Ok(released)
}
