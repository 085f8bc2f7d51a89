use flatphys_core::ObserverId;

/// Simulation-lifecycle observer, notified at fixed-step boundaries so
/// external systems can sample consistent state.
pub trait ContextObserver {
    fn on_pre_tick(&mut self, tick: u64);
    fn on_post_tick(&mut self, tick: u64);
}

/// Registration-ordered observer slots with deferred removal: unregistering
/// marks the id and the slot is dropped at the next dispatch boundary, never
/// while the list is being walked. Freed slots go on a free list and are
/// handed out again, so register/unregister churn does not grow the vector.
pub(crate) struct ObserverRegistry {
    slots: Vec<Option<Box<dyn ContextObserver>>>,
    free: Vec<u32>,
    pending_remove: Vec<ObserverId>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self { slots: Vec::new(), free: Vec::new(), pending_remove: Vec::new() }
    }

    pub fn register(&mut self, observer: Box<dyn ContextObserver>) -> ObserverId {
        if let Some(idx) = self.free.pop() {
            self.slots[idx as usize] = Some(observer);
            ObserverId(idx)
        } else {
            self.slots.push(Some(observer));
            ObserverId((self.slots.len() - 1) as u32)
        }
    }

    pub fn unregister(&mut self, id: ObserverId) {
        self.pending_remove.push(id);
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    fn apply_pending(&mut self) {
        for id in self.pending_remove.drain(..) {
            if let Some(slot) = self.slots.get_mut(id.0 as usize) {
                // take() guards the free list against duplicate unregisters.
                if slot.take().is_some() {
                    self.free.push(id.0);
                }
            }
        }
    }

    pub fn dispatch_pre(&mut self, tick: u64) {
        self.apply_pending();
        for obs in self.slots.iter_mut().flatten() {
            obs.on_pre_tick(tick);
        }
    }

    pub fn dispatch_post(&mut self, tick: u64) {
        self.apply_pending();
        for obs in self.slots.iter_mut().flatten() {
            obs.on_post_tick(tick);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Counter {
        pre: Rc<RefCell<u32>>,
        post: Rc<RefCell<u32>>,
    }

    impl ContextObserver for Counter {
        fn on_pre_tick(&mut self, _tick: u64) { *self.pre.borrow_mut() += 1; }
        fn on_post_tick(&mut self, _tick: u64) { *self.post.borrow_mut() += 1; }
    }

    #[test]
    fn dispatch_runs_in_registration_order_and_removal_is_deferred() {
        let pre = Rc::new(RefCell::new(0));
        let post = Rc::new(RefCell::new(0));
        let mut reg = ObserverRegistry::new();
        let id = reg.register(Box::new(Counter { pre: pre.clone(), post: post.clone() }));
        reg.dispatch_pre(0);
        reg.dispatch_post(1);
        assert_eq!((*pre.borrow(), *post.borrow()), (1, 1));

        reg.unregister(id);
        // Still registered until the next dispatch boundary applies removal.
        assert_eq!(reg.len(), 1);
        reg.dispatch_pre(1);
        assert_eq!(reg.len(), 0);
        assert_eq!(*pre.borrow(), 1);
    }

    #[test]
    fn churn_reuses_freed_slots() {
        let pre = Rc::new(RefCell::new(0));
        let post = Rc::new(RefCell::new(0));
        let mut reg = ObserverRegistry::new();
        let first = reg.register(Box::new(Counter { pre: pre.clone(), post: post.clone() }));

        for _ in 0..10 {
            reg.unregister(first);
            reg.dispatch_pre(0);
            let again = reg.register(Box::new(Counter { pre: pre.clone(), post: post.clone() }));
            assert_eq!(again, first);
        }
        assert_eq!(reg.slots.len(), 1);

        // Unregistering the same id twice frees the slot once.
        reg.unregister(first);
        reg.unregister(first);
        reg.dispatch_pre(0);
        assert_eq!(reg.free.len(), 1);
    }
}
