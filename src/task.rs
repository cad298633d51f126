//! Cooperative cancellation for background playback tasks.

use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// A clonable cancellation flag with an interruptible wait.
///
/// Playback loops hold a clone and call [`StopFlag::wait`] instead of
/// sleeping, so a cancel lands mid-sleep instead of after it. The flag is
/// reusable: [`StopFlag::clear`] re-arms it for the next run.
#[derive(Clone, Default)]
pub struct StopFlag {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopFlag {
    /// Create a flag in the running (not stopped) state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and wake every waiter.
    pub fn stop(&self) {
        let (lock, cvar) = &*self.inner;
        let mut stopped = lock.lock().unwrap();
        *stopped = true;
        cvar.notify_all();
    }

    /// Re-arm the flag for a new run.
    pub fn clear(&self) {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap() = false;
    }

    /// Check whether cancellation was requested.
    pub fn is_stopped(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap()
    }

    /// Block for up to `duration`, waking early on [`StopFlag::stop`].
    ///
    /// Returns `true` if stopped, `false` if the wait timed out. Loops on
    /// spurious wakeups until the condition is met or the time is spent.
    pub fn wait(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut stopped = lock.lock().unwrap();
        if *stopped {
            return true;
        }

        let start = Instant::now();
        let mut remaining = duration;
        loop {
            let (guard, result) = cvar.wait_timeout(stopped, remaining).unwrap();
            stopped = guard;
            if *stopped {
                return true;
            }
            if result.timed_out() {
                return false;
            }
            let elapsed = start.elapsed();
            if elapsed >= duration {
                return false;
            }
            remaining = duration - elapsed;
        }
    }
}

/// A spawned background task that can be cancelled and joined.
///
/// Dropping the handle cancels the task, so an owner replacing one task
/// with another never leaks a thread.
pub struct TaskHandle {
    flag: StopFlag,
    thread: Option<thread::JoinHandle<()>>,
}

impl TaskHandle {
    /// Spawn a named thread running `f` with a fresh [`StopFlag`].
    pub fn spawn<F>(name: &str, f: F) -> Self
    where
        F: FnOnce(StopFlag) + Send + 'static,
    {
        let flag = StopFlag::new();
        let task_flag = flag.clone();
        let thread = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || f(task_flag))
            .expect("failed to spawn task thread");
        Self {
            flag,
            thread: Some(thread),
        }
    }

    /// True once the task body has returned.
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(thread::JoinHandle::is_finished)
    }

    /// Cancel the task and wait for it to finish.
    pub fn cancel(mut self) {
        self.cancel_inner();
    }

    fn cancel_inner(&mut self) {
        self.flag.stop();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel_inner();
    }
}
