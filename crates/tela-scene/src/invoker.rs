use std::cmp::Reverse;
use std::collections::VecDeque;

use tracing::trace;

use crate::clock::Clock;

/// Higher priority runs first within a tick. These bands keep animations
/// updating state before the render pass consumes it.
pub const PRIORITY_ANIMATION: i32 = 20;
pub const PRIORITY_DEFAULT: i32 = 1;
pub const PRIORITY_RENDER: i32 = 0;

/// Rolling window of tick durations used for pacing.
const SAMPLE_WINDOW: usize = 5;

/// What a task wants after running for a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Keep running next tick.
    Continue,
    /// Unregister after this pass completes.
    Remove,
    /// Keep running, but don't count this tick's duration toward pacing
    /// (the task did something unrepresentative, e.g. one-time setup).
    Skip,
}

/// Handle for unregistering a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

struct Task {
    id: TaskId,
    priority: i32,
    callback: Box<dyn FnMut(f64) -> TaskOutcome>,
}

/// Cooperative frame scheduler.
///
/// The invoker owns no thread or timer: the embedder calls [`Invoker::tick`]
/// in its own loop and sleeps for the returned delay. Each tick runs every
/// registered task once, highest priority first (stable within a band), and
/// passes the measured milliseconds elapsed since the previous tick. Tasks
/// asking to be removed are dropped only after the whole pass, so a pass
/// always sees a consistent task set.
///
/// Pacing: the suggested delay is the average of the last few tick durations,
/// floored at `1000 / fps`, so a scene that renders slowly backs off instead
/// of spiraling.
pub struct Invoker {
    clock: Box<dyn Clock>,
    tasks: Vec<Task>,
    next_id: u64,
    samples: VecDeque<f64>,
    fps: u32,
    running: bool,
    last_tick: Option<f64>,
}

impl Invoker {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self::with_fps(clock, 60)
    }

    pub fn with_fps(clock: Box<dyn Clock>, fps: u32) -> Self {
        Self {
            clock,
            tasks: Vec::new(),
            next_id: 0,
            samples: VecDeque::with_capacity(SAMPLE_WINDOW),
            fps: fps.max(1),
            running: false,
            last_tick: None,
        }
    }

    #[inline]
    pub fn min_delay(&self) -> f64 {
        1000.0 / self.fps as f64
    }

    /// Suggested milliseconds until the next tick.
    pub fn next_delay(&self) -> f64 {
        if self.samples.is_empty() {
            return self.min_delay();
        }
        let avg = self.samples.iter().sum::<f64>() / self.samples.len() as f64;
        avg.max(self.min_delay())
    }

    /// Register at [`PRIORITY_DEFAULT`].
    pub fn add(&mut self, callback: impl FnMut(f64) -> TaskOutcome + 'static) -> TaskId {
        self.add_task(PRIORITY_DEFAULT, callback)
    }

    pub fn add_task(
        &mut self,
        priority: i32,
        callback: impl FnMut(f64) -> TaskOutcome + 'static,
    ) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            priority,
            callback: Box::new(callback),
        });
        id
    }

    /// Unregister immediately. Returns whether the task existed.
    pub fn remove_task(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// One-shot that fires on the first tick where the accumulated elapsed
    /// time reaches `delay_ms`. The callback receives the overshoot past the
    /// requested delay.
    pub fn after(
        &mut self,
        delay_ms: f64,
        priority: i32,
        callback: impl FnOnce(f64) + 'static,
    ) -> TaskId {
        let mut remaining = delay_ms;
        let mut callback = Some(callback);
        self.add_task(priority, move |elapsed| {
            remaining -= elapsed;
            if remaining <= 0.0 {
                if let Some(f) = callback.take() {
                    f(-remaining);
                }
                TaskOutcome::Remove
            } else {
                TaskOutcome::Continue
            }
        })
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Pause. The next tick resumes as if it were the first, so a long pause
    /// doesn't land as one giant elapsed interval.
    pub fn stop(&mut self) {
        self.running = false;
        self.last_tick = None;
    }

    /// Drive tick-and-sleep until `should_continue` says otherwise. Meant
    /// for embedders on the system clock; tests tick by hand instead.
    pub fn run(&mut self, mut should_continue: impl FnMut() -> bool) {
        while should_continue() {
            let delay = self.tick();
            std::thread::sleep(std::time::Duration::from_secs_f64(delay / 1000.0));
        }
        self.stop();
    }

    /// Run one pass over the tasks. Returns the suggested delay until the
    /// next tick.
    pub fn tick(&mut self) -> f64 {
        self.running = true;
        let start = self.clock.now_ms();
        let elapsed = match self.last_tick {
            Some(prev) => start - prev,
            None => self.next_delay(),
        };
        self.last_tick = Some(start);

        let mut order: Vec<usize> = (0..self.tasks.len()).collect();
        order.sort_by_key(|&i| Reverse(self.tasks[i].priority));

        let mut removals: Vec<TaskId> = Vec::new();
        let mut skip_sample = false;
        for i in order {
            let task = &mut self.tasks[i];
            match (task.callback)(elapsed) {
                TaskOutcome::Continue => {}
                TaskOutcome::Skip => skip_sample = true,
                TaskOutcome::Remove => removals.push(task.id),
            }
        }
        if !removals.is_empty() {
            self.tasks.retain(|t| !removals.contains(&t.id));
        }

        let duration = self.clock.now_ms() - start;
        if !skip_sample {
            if self.samples.len() == SAMPLE_WINDOW {
                self.samples.pop_front();
            }
            self.samples.push_back(duration);
        }
        trace!(elapsed, duration, tasks = self.tasks.len(), "invoker tick");
        self.next_delay()
    }
}
