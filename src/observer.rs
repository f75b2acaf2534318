use crate::logic::ThreeValuedLogic;
use crate::predicate::CfgPredicate;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Hook notified about decided top-level verdicts.
///
/// Only `True` and `False` are reported; `Unknown` is silent.
pub trait EvalObserver: Send + Sync {
    fn on_verdict(&self, predicate: &CfgPredicate, verdict: ThreeValuedLogic);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl EvalObserver for NoopObserver {
    fn on_verdict(&self, _predicate: &CfgPredicate, _verdict: ThreeValuedLogic) {}
}

/// Thread-safe counter of decided verdicts.
#[derive(Debug, Default)]
pub struct HitCounter {
    enabled: AtomicUsize,
    disabled: AtomicUsize,
}

impl HitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(&self) -> usize {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn disabled(&self) -> usize {
        self.disabled.load(Ordering::Relaxed)
    }
}

impl EvalObserver for HitCounter {
    fn on_verdict(&self, _predicate: &CfgPredicate, verdict: ThreeValuedLogic) {
        match verdict {
            ThreeValuedLogic::True => {
                self.enabled.fetch_add(1, Ordering::Relaxed);
            }
            ThreeValuedLogic::False => {
                self.disabled.fetch_add(1, Ordering::Relaxed);
            }
            ThreeValuedLogic::Unknown => {}
        }
    }
}
