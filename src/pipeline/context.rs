//! Shared run state: first fatal error, admission stop flag and counters.
//! One context per pipeline run; every stage thread holds a clone.

use crossbeam_channel::{Receiver, Sender, bounded};
use log::debug;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::PipelineError;

/// Counters reported when a run drains.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Descriptors written by the collector.
    pub collected: usize,
    /// Items silently excluded (directories, unsupported kinds, hidden paths).
    pub skipped: usize,
}

#[derive(Clone)]
pub struct PipelineContext {
    first_error: Arc<Mutex<Option<PipelineError>>>,
    /// Caller-owned cancel signal (e.g. Ctrl+C). Only read here, never set.
    cancel: Arc<AtomicBool>,
    /// Set on the first fatal error. Together with `cancel`, stops admission of new items.
    failed: Arc<AtomicBool>,
    skipped: Arc<AtomicUsize>,
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineContext {
    pub fn new() -> Self {
        Self::with_cancel_flag(Arc::new(AtomicBool::new(false)))
    }

    /// Use an externally owned flag (e.g. set from a Ctrl+C handler) as the stop signal.
    pub fn with_cancel_flag(flag: Arc<AtomicBool>) -> Self {
        PipelineContext {
            first_error: Arc::new(Mutex::new(None)),
            cancel: flag,
            failed: Arc::new(AtomicBool::new(false)),
            skipped: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Record a fatal error. The first one wins; later ones are logged and dropped.
    pub fn fail(&self, err: PipelineError) {
        let mut slot = self
            .first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            debug!("pipeline failed: {}", err);
            *slot = Some(err);
        } else {
            debug!("pipeline already failed, dropping: {}", err);
        }
        self.failed.store(true, Ordering::Relaxed);
    }

    /// True once no new items should be admitted.
    pub fn is_stopped(&self) -> bool {
        self.failed.load(Ordering::Relaxed) || self.cancel.load(Ordering::Relaxed)
    }

    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn note_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::Relaxed)
    }

    /// Outcome of the run after all stage threads are joined: the first error, `Cancelled`
    /// when stopped externally, or the stats.
    pub fn finish(&self, collected: usize) -> Result<PipelineStats, PipelineError> {
        if let Some(err) = self
            .first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            return Err(err);
        }
        if self.is_stopped() {
            return Err(PipelineError::Cancelled);
        }
        Ok(PipelineStats {
            collected,
            skipped: self.skipped(),
        })
    }
}

/// Bounded channel between two stages. A capacity of the downstream pool size keeps at most
/// that many finished items waiting, so a slow consumer backs up the producers.
pub fn stage_channel<T>(cap: usize) -> (Sender<T>, Receiver<T>) {
    bounded::<T>(cap.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn first_error_wins() {
        let ctx = PipelineContext::new();
        ctx.fail(PipelineError::Hash {
            path: PathBuf::from("a"),
            reason: "first".into(),
        });
        ctx.fail(PipelineError::Hash {
            path: PathBuf::from("b"),
            reason: "second".into(),
        });
        assert!(ctx.is_stopped());
        let err = ctx.finish(0).unwrap_err();
        assert_eq!(err.path(), Some(std::path::Path::new("a")));
    }

    #[test]
    fn failure_leaves_caller_flag_untouched() {
        let flag = Arc::new(AtomicBool::new(false));
        let ctx = PipelineContext::with_cancel_flag(Arc::clone(&flag));
        ctx.fail(PipelineError::config("boom"));
        assert!(ctx.is_stopped());
        assert!(!flag.load(Ordering::Relaxed));

        let next = PipelineContext::with_cancel_flag(flag);
        assert!(!next.is_stopped());
        assert_eq!(next.finish(0).unwrap(), PipelineStats::default());
    }

    #[test]
    fn external_stop_is_cancelled() {
        let ctx = PipelineContext::new();
        ctx.cancel_flag().store(true, Ordering::Relaxed);
        assert!(!ctx.has_failed());
        assert!(matches!(ctx.finish(0), Err(PipelineError::Cancelled)));
    }

    #[test]
    fn clean_run_reports_stats() {
        let ctx = PipelineContext::new();
        ctx.note_skipped();
        assert_eq!(
            ctx.finish(3).unwrap(),
            PipelineStats {
                collected: 3,
                skipped: 1
            }
        );
    }
}
