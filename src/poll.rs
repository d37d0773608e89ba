//! Deadlines for the busy-wait loops of a transfer.
//!
//! Every blocking wait in [`SpiMaster`](crate::SpiMaster) polls a status flag
//! and asks its [`Deadline`] after each miss whether to give up. [`Forever`]
//! never gives up and compiles down to a bare spin loop, which is what a
//! bare-metal target without a time source wants.

use embedded_hal::blocking::delay::DelayUs;

/// Bounds a single busy-wait.
pub trait Deadline {
    /// Called once before each wait.
    fn start(&mut self);

    /// Called after every unsuccessful poll. Returns `true` once the wait
    /// should be abandoned.
    fn expired(&mut self) -> bool;
}

/// Waits without limit.
#[derive(Debug, Default, Copy, Clone)]
pub struct Forever;

impl Deadline for Forever {
    #[inline(always)]
    fn start(&mut self) {}

    #[inline(always)]
    fn expired(&mut self) -> bool {
        false
    }
}

/// Gives up after a fixed number of polls.
#[derive(Debug, Copy, Clone)]
pub struct SpinBudget {
    limit: u32,
    left: u32,
}

impl SpinBudget {
    pub fn new(polls: u32) -> Self {
        Self {
            limit: polls,
            left: polls,
        }
    }
}

impl Deadline for SpinBudget {
    fn start(&mut self) {
        self.left = self.limit;
    }

    fn expired(&mut self) -> bool {
        self.left = self.left.saturating_sub(1);
        self.left == 0
    }
}

/// Sleeps `step_us` between polls and gives up once `limit_us` have passed.
#[derive(Debug)]
pub struct DelayDeadline<D> {
    delay: D,
    step_us: u32,
    limit_us: u32,
    elapsed_us: u32,
}

impl<D: DelayUs<u32>> DelayDeadline<D> {
    pub fn new(delay: D, step_us: u32, limit_us: u32) -> Self {
        Self {
            delay,
            step_us: step_us.max(1),
            limit_us,
            elapsed_us: 0,
        }
    }

    /// Returns the delay provider.
    pub fn free(self) -> D {
        self.delay
    }
}

impl<D: DelayUs<u32>> Deadline for DelayDeadline<D> {
    fn start(&mut self) {
        self.elapsed_us = 0;
    }

    fn expired(&mut self) -> bool {
        if self.elapsed_us >= self.limit_us {
            return true;
        }
        self.delay.delay_us(self.step_us);
        self.elapsed_us = self.elapsed_us.saturating_add(self.step_us);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingDelay {
        total_us: u32,
    }

    impl DelayUs<u32> for CountingDelay {
        fn delay_us(&mut self, us: u32) {
            self.total_us += us;
        }
    }

    #[test]
    fn spin_budget_restarts() {
        let mut budget = SpinBudget::new(3);
        budget.start();
        assert!(!budget.expired());
        assert!(!budget.expired());
        assert!(budget.expired());

        budget.start();
        assert!(!budget.expired());
    }

    #[test]
    fn delay_deadline_sleeps_until_limit() {
        let mut deadline = DelayDeadline::new(CountingDelay::default(), 10, 25);
        deadline.start();
        let mut misses = 0;
        while !deadline.expired() {
            misses += 1;
        }
        assert_eq!(misses, 3);
        assert_eq!(deadline.free().total_us, 30);
    }

    #[test]
    fn forever_never_expires() {
        let mut forever = Forever;
        forever.start();
        assert!((0..1000).all(|_| !forever.expired()));
    }
}
