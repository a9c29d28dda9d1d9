use crate::proc::{Cpu, mycpu};
use crate::riscv::{__sync_lock_release, __sync_lock_test_and_set, __sync_synchronize, intr_get, intr_off, intr_on};

// Mutual exclusion spin locks. Acquiring one disables interrupts on this
// CPU: a spinning interrupt handler on the same hart can never wait for
// a lock only that hart can release.
#[derive(Copy, Clone)]
pub struct Spinlock {
    locked: u64,

    // for debugging:
    name: &'static str,
    cpu: Option<*mut Cpu<'static>>,
}

unsafe impl Sync for Spinlock {}

impl Spinlock {
    pub const fn init_lock(name: &'static str) -> Self {
        Spinlock {
            locked: 0,
            name,
            cpu: None,
        }
    }

    /// Acquire the lock. Spins until it is acquired.
    pub fn acquire(self: &mut Self) {
        push_off(); // disable interrupts to avoid deadlock.
        if self.holding() {
            panic!("acquire {}", self.name);
        }

        // amoswap.w.aq a5, a5, (s1)
        while __sync_lock_test_and_set(&mut self.locked, 1) != 0 {}

        // fence: critical-section loads/stores happen strictly after
        // the lock is visibly held.
        __sync_synchronize();

        self.cpu = Some(mycpu());
    }

    pub fn release(self: &mut Self) {
        if !self.holding() {
            panic!("release {}", self.name);
        }

        self.cpu = None;

        // fence: critical-section stores are visible to other cores
        // before the lock is visibly free.
        __sync_synchronize();

        __sync_lock_release(&self.locked);

        pop_off();
    }

    /// whether the current cpu holds the lock. interrupts must be off.
    pub fn holding(self: &Self) -> bool {
        self.locked == 1 && self.cpu == Some(mycpu())
    }
}

/// push_off/pop_off are like intr_off()/intr_on() except matched: it
/// takes two pop_off()s to undo two push_off()s. if interrupts were
/// already off, push_off/pop_off leaves them off.
pub fn push_off() {
    let old = intr_get();

    intr_off();
    let cpu = mycpu();
    cpu.begin_nested_disable(old);
}

pub fn pop_off() {
    if intr_get() {
        panic!("pop_off - interruptible");
    }
    let cpu = mycpu();
    if cpu.end_nested_disable() {
        intr_on();
    }
}

#[cfg(test)]
mod tests {
    use crate::proc::Cpu;

    #[test]
    fn nested_disable_restores_prior_enabled_state() {
        let mut cpu = Cpu::for_test();
        cpu.begin_nested_disable(true);
        cpu.begin_nested_disable(false); // nested call, prior-state ignored
        assert!(!cpu.end_nested_disable()); // still one level deep
        assert!(cpu.end_nested_disable()); // back to depth 0, re-enable
    }

    #[test]
    fn nested_disable_stays_off_if_already_off() {
        let mut cpu = Cpu::for_test();
        cpu.begin_nested_disable(false);
        assert!(!cpu.end_nested_disable());
    }

    #[test]
    #[should_panic]
    fn unbalanced_pop_panics() {
        let mut cpu = Cpu::for_test();
        cpu.end_nested_disable();
    }
}
