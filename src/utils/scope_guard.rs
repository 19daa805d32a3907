/// Runs a closure when dropped, unless it was already consumed
pub struct ScopeGuard<F: FnOnce()>(Option<F>);

impl<F: FnOnce()> ScopeGuard<F> {
    pub fn new(f: F) -> Self {
        Self(Some(f))
    }
}

impl<F: FnOnce()> Drop for ScopeGuard<F> {
    fn drop(&mut self) {
        if let Some(f) = self.0.take() {
            f();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn runs_exactly_once_on_drop() {
        let runs = Cell::new(0);
        {
            let _guard = ScopeGuard::new(|| runs.set(runs.get() + 1));
            assert_eq!(runs.get(), 0);
        }
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn runs_when_moved_into_a_closure_that_is_dropped() {
        let runs = Cell::new(0);
        let guard = ScopeGuard::new(|| runs.set(runs.get() + 1));
        let never_called = move || drop(guard);
        drop(never_called);
        assert_eq!(runs.get(), 1);
    }
}
