//! Thread-backed remote values, polled from the frame loop.
//!
//! Blocking work (store calls, feed fetches) runs on a spawned worker
//! thread; the frame loop folds finished workers back in with a
//! non-blocking poll. A generation counter lets dependents notice when the
//! value actually changed.

use std::thread::JoinHandle;

pub enum RemoteState<T> {
    Idle,
    Loading(JoinHandle<T>),
    Ready(T, usize),
    Refreshing(T, usize, JoinHandle<T>),
}

impl<T> RemoteState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            RemoteState::Ready(inner, _) => Some(inner),
            RemoteState::Refreshing(inner, _, _) => Some(inner),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            RemoteState::Ready(inner, _) => Some(inner),
            RemoteState::Refreshing(inner, _, _) => Some(inner),
            _ => None,
        }
    }

    pub fn generation(&self) -> Option<usize> {
        match self {
            RemoteState::Ready(_, generation) => Some(*generation),
            RemoteState::Refreshing(_, generation, _) => Some(*generation),
            _ => None,
        }
    }

    /// A worker is currently running.
    pub fn is_busy(&self) -> bool {
        matches!(self, RemoteState::Loading(_) | RemoteState::Refreshing(_, _, _))
    }
}

impl<T: Send + 'static> RemoteState<T> {
    /// Kick off the initial load if nothing has been started yet. Returns
    /// true when a worker was spawned.
    pub fn ensure(&mut self, action: impl FnOnce() -> T + Send + 'static) -> bool {
        if matches!(self, RemoteState::Idle) {
            *self = RemoteState::Loading(std::thread::spawn(action));
            true
        } else {
            false
        }
    }

    /// Recompute a ready value in the background. No-op while a worker is
    /// already running or before the initial load finished.
    pub fn refresh(&mut self, action: impl FnOnce() -> T + Send + 'static) -> bool {
        *self = match std::mem::replace(self, RemoteState::Idle) {
            RemoteState::Ready(current, generation) => RemoteState::Refreshing(
                current,
                generation,
                std::thread::spawn(action),
            ),
            other => other,
        };
        matches!(self, RemoteState::Refreshing(_, _, _))
    }

    /// Fold any finished worker back into the value. Returns true when the
    /// state advanced, which is the caller's cue to request a repaint.
    pub fn poll(&mut self) -> bool {
        let mut advanced = false;
        *self = match std::mem::replace(self, RemoteState::Idle) {
            RemoteState::Loading(handle) if handle.is_finished() => {
                advanced = true;
                RemoteState::Ready(handle.join().expect("remote worker panicked"), 0)
            }
            RemoteState::Refreshing(_, generation, handle) if handle.is_finished() => {
                advanced = true;
                RemoteState::Ready(
                    handle.join().expect("remote worker panicked"),
                    generation + 1,
                )
            }
            other => other,
        };
        advanced
    }
}

impl<T> Default for RemoteState<T> {
    fn default() -> Self {
        RemoteState::Idle
    }
}

impl<T> std::fmt::Debug for RemoteState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteState::Idle => write!(f, "Idle"),
            RemoteState::Loading(_) => write!(f, "Loading"),
            RemoteState::Ready(_, _) => write!(f, "Ready"),
            RemoteState::Refreshing(_, _, _) => write!(f, "Refreshing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settle<T: Send + 'static>(state: &mut RemoteState<T>) {
        for _ in 0..500 {
            if state.poll() {
                return;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        panic!("worker did not finish in time");
    }

    #[test]
    fn ensure_runs_the_action_once() {
        let mut state: RemoteState<u32> = RemoteState::Idle;
        assert!(state.ensure(|| 7));
        assert!(!state.ensure(|| 8));
        settle(&mut state);
        assert_eq!(state.ready(), Some(&7));
        assert_eq!(state.generation(), Some(0));
    }

    #[test]
    fn refresh_bumps_the_generation() {
        let mut state: RemoteState<u32> = RemoteState::Idle;
        state.ensure(|| 1);
        settle(&mut state);
        assert!(state.refresh(|| 2));
        assert!(state.is_busy());
        // The previous value stays readable while the worker runs.
        assert_eq!(state.ready(), Some(&1));
        settle(&mut state);
        assert_eq!(state.ready(), Some(&2));
        assert_eq!(state.generation(), Some(1));
    }

    #[test]
    fn refresh_before_ready_is_a_no_op() {
        let mut state: RemoteState<u32> = RemoteState::Idle;
        assert!(!state.refresh(|| 9));
        assert!(matches!(state, RemoteState::Idle));
    }
}
