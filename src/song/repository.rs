//! SongRepository trait definition.

use super::{Song, SongError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

type AbortFn = Box<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct StoreCallState {
    cancelled: AtomicBool,
    abort: Mutex<Option<AbortFn>>,
}

/// Cancellation handle shared between the caller of one repository
/// operation and the thread running it.
#[derive(Clone, Default)]
pub struct StoreCall {
    state: Arc<StoreCallState>,
}

impl StoreCall {
    /// Marks the call as abandoned and aborts the work in flight, if any.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
        if let Ok(abort) = self.state.abort.lock() {
            if let Some(abort) = abort.as_ref() {
                abort();
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Registers how to abort this call while it runs. The registration lasts
    /// until the returned guard is dropped. Fails with `Timeout` if the call
    /// was already cancelled.
    pub fn start(
        &self,
        abort: impl Fn() + Send + Sync + 'static,
    ) -> Result<RunningCall<'_>, SongError> {
        let mut slot = self
            .state
            .abort
            .lock()
            .map_err(|_| SongError::InternalServer)?;
        if self.is_cancelled() {
            return Err(SongError::Timeout);
        }
        *slot = Some(Box::new(abort));
        Ok(RunningCall { call: self })
    }
}

pub struct RunningCall<'a> {
    call: &'a StoreCall,
}

impl Drop for RunningCall<'_> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.call.state.abort.lock() {
            *slot = None;
        }
    }
}

/// Storage backend for songs, keyed by `(group, name)`.
///
/// Every operation receives the [`StoreCall`] it runs under. Once the call is
/// cancelled an operation must fail and must not leave a write behind.
pub trait SongRepository: Send + Sync {
    /// Insert a new song. Returns the row as stored.
    fn add(&self, call: &StoreCall, song: &Song) -> Result<Song, SongError>;

    /// Delete the song with the given key. Deleting a missing song is not an error.
    fn delete(&self, call: &StoreCall, group: &str, name: &str) -> Result<(), SongError>;

    /// Replace every field of the song with the given key. Returns the updated row.
    fn update(
        &self,
        call: &StoreCall,
        group: &str,
        name: &str,
        patch: &Song,
    ) -> Result<Song, SongError>;

    /// Point lookup by key.
    fn get(&self, call: &StoreCall, group: &str, name: &str) -> Result<Song, SongError>;

    /// List songs matching every non-empty field of `filter`, in insertion order.
    /// `offset` is the number of rows to skip.
    fn get_all(
        &self,
        call: &StoreCall,
        filter: &Song,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Song>, SongError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_abort() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let hook = count.clone();
        (count, move || {
            hook.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn cancel_aborts_running_call() {
        let call = StoreCall::default();
        let (aborts, abort) = counting_abort();

        let _running = call.start(abort).unwrap();
        call.clone().cancel();

        assert!(call.is_cancelled());
        assert_eq!(aborts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancel_after_finish_aborts_nothing() {
        let call = StoreCall::default();
        let (aborts, abort) = counting_abort();

        drop(call.start(abort).unwrap());
        call.cancel();

        assert_eq!(aborts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn cancelled_call_cannot_start() {
        let call = StoreCall::default();
        call.cancel();
        assert!(matches!(call.start(|| {}), Err(SongError::Timeout)));
    }
}
