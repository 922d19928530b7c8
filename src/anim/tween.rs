//! Eased transitions and a scheduler that runs many of them
//!
//! A `TransitionTask` carries a payload `K` instead of a boxed callback. The
//! scheduler hands the payload back when the task completes, which is the
//! completion hook. Bulk cancellation returns payloads without completing them.

use glam::Vec2;

use super::easing::Easing;

/// Values a transition can interpolate
pub trait Interpolate: Copy {
    fn interpolate(self, to: Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    #[inline]
    fn interpolate(self, to: Self, t: f32) -> Self {
        crate::lerp(self, to, t)
    }
}

impl Interpolate for Vec2 {
    #[inline]
    fn interpolate(self, to: Self, t: f32) -> Self {
        self.lerp(to, t)
    }
}

/// A single timed, eased transition from `start` to `target`
#[derive(Debug, Clone)]
pub struct TransitionTask<T: Interpolate, K> {
    pub start: T,
    pub target: T,
    elapsed: f32,
    duration: f32,
    easing: Easing,
    payload: K,
}

impl<T: Interpolate, K> TransitionTask<T, K> {
    pub fn new(start: T, target: T, duration: f32, easing: Easing, payload: K) -> Self {
        Self {
            start,
            target,
            elapsed: 0.0,
            duration: duration.max(0.0),
            easing,
            payload,
        }
    }

    /// Advance by `dt` seconds. Returns true once the transition has finished.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Linear progress in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }

    /// Current eased value
    pub fn value(&self) -> T {
        self.start.interpolate(self.target, self.easing.apply(self.progress()))
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn payload(&self) -> &K {
        &self.payload
    }
}

/// Runs transitions in start order and reports completions
#[derive(Debug, Clone)]
pub struct TweenScheduler<T: Interpolate, K> {
    tasks: Vec<TransitionTask<T, K>>,
}

impl<T: Interpolate, K> Default for TweenScheduler<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Interpolate, K> TweenScheduler<T, K> {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn start(&mut self, task: TransitionTask<T, K>) {
        self.tasks.push(task);
    }

    /// Advance every task and append the payloads of finished ones to `completed`,
    /// in the order the tasks were started.
    pub fn advance(&mut self, dt: f32, completed: &mut Vec<K>) {
        let mut i = 0;
        while i < self.tasks.len() {
            if self.tasks[i].advance(dt) {
                let task = self.tasks.remove(i);
                completed.push(task.payload);
            } else {
                i += 1;
            }
        }
    }

    /// Drop every running task without completing it.
    ///
    /// Returns each payload with the value the task had reached so the caller
    /// can snap or reassign the animated thing.
    pub fn cancel_all(&mut self) -> Vec<(K, T)> {
        self.tasks
            .drain(..)
            .map(|task| {
                let value = task.value();
                (task.payload, value)
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransitionTask<T, K>> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
