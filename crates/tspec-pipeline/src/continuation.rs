//! # Continuations
//!
//! A [`Continuation`] drives an ordered list of step functions over a value.
//! Each step inspects the current value and answers with a [`Flow`]: go on
//! with a new value, stop with a value, or stop by handing the current value
//! to a handler.
//!
//! ## Stack Safety
//!
//! Steps never call each other. Each step's outcome is turned into a
//! [`Bounce`], a thunk for the next step, and [`trampoline`] runs thunks in
//! a loop. A chain of any length runs in constant stack depth.

use std::fmt;

use tracing::trace;

/// What a step wants to happen next.
pub enum Flow<T> {
    /// Continue with this value.
    Next(T),
    /// Stop; this value is the final result.
    Halt(T),
    /// Stop; the handler maps the current value to the final result.
    HaltWith(Box<dyn FnOnce(T) -> T>),
}

impl<T> Flow<T> {
    /// Continue with `value`.
    pub fn next(value: T) -> Self {
        Self::Next(value)
    }

    /// Stop with `value`.
    pub fn halt(value: T) -> Self {
        Self::Halt(value)
    }

    /// Stop, recovering the final result from the current value.
    pub fn halt_with<F>(handler: F) -> Self
    where
        F: FnOnce(T) -> T + 'static,
    {
        Self::HaltWith(Box::new(handler))
    }
}

impl<T: fmt::Debug> fmt::Debug for Flow<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Next(v) => f.debug_tuple("Next").field(v).finish(),
            Self::Halt(v) => f.debug_tuple("Halt").field(v).finish(),
            Self::HaltWith(_) => f.write_str("HaltWith(..)"),
        }
    }
}

/// A deferred computation: either finished, or a thunk producing the next
/// bounce.
pub enum Bounce<'a, T> {
    /// The final value.
    Done(T),
    /// More work remains.
    More(Box<dyn FnOnce() -> Bounce<'a, T> + 'a>),
}

/// Run bounces until one is done.
pub fn trampoline<T>(mut bounce: Bounce<'_, T>) -> T {
    loop {
        match bounce {
            Bounce::Done(value) => return value,
            Bounce::More(thunk) => bounce = thunk(),
        }
    }
}

type Step<T> = Box<dyn Fn(&T) -> Flow<T> + Send + Sync>;

/// An ordered, reusable chain of steps.
pub struct Continuation<T> {
    steps: Vec<Step<T>>,
}

impl<T> Default for Continuation<T> {
    fn default() -> Self {
        Self { steps: Vec::new() }
    }
}

impl<T> Continuation<T> {
    /// A continuation over `steps`.
    pub fn init<I, F>(steps: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Fn(&T) -> Flow<T> + Send + Sync + 'static,
    {
        Self {
            steps: steps
                .into_iter()
                .map(|step| Box::new(step) as Step<T>)
                .collect(),
        }
    }

    /// Append a step.
    pub fn step<F>(mut self, step: F) -> Self
    where
        F: Fn(&T) -> Flow<T> + Send + Sync + 'static,
    {
        self.steps.push(Box::new(step));
        self
    }

    /// Append every step of `other`.
    pub fn chain(mut self, other: Continuation<T>) -> Self {
        self.steps.extend(other.steps);
        self
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether there are no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order starting from `initial`, stopping early when
    /// a step halts.
    pub fn run(&self, initial: T) -> T {
        trampoline(advance(&self.steps, 0, initial))
    }
}

impl<T> fmt::Debug for Continuation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Continuation")
            .field("steps", &self.steps.len())
            .finish()
    }
}

fn advance<'a, T: 'a>(steps: &'a [Step<T>], index: usize, value: T) -> Bounce<'a, T> {
    let Some(step) = steps.get(index) else {
        return Bounce::Done(value);
    };
    trace!(index, "continuation step");
    match step(&value) {
        Flow::Next(next) => Bounce::More(Box::new(move || advance(steps, index + 1, next))),
        Flow::Halt(last) => Bounce::Done(last),
        Flow::HaltWith(handler) => Bounce::Done(handler(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_steps_in_order() {
        let k = Continuation::default()
            .step(|n: &i64| Flow::next(n + 1))
            .step(|n| Flow::next(n * 10))
            .step(|n| Flow::next(n - 3));
        assert_eq!(k.run(1), 17);
        assert_eq!(k.run(0), 7);
    }

    #[test]
    fn empty_continuation_is_identity() {
        let k: Continuation<String> = Continuation::default();
        assert!(k.is_empty());
        assert_eq!(k.run("same".to_string()), "same");
    }

    #[test]
    fn halt_stops_early() {
        let k = Continuation::default()
            .step(|n: &i64| if *n < 0 { Flow::halt(0) } else { Flow::next(*n) })
            .step(|n| Flow::next(n * 2));
        assert_eq!(k.run(-5), 0);
        assert_eq!(k.run(5), 10);
    }

    #[test]
    fn halt_with_recovers_from_current_value() {
        let k = Continuation::default()
            .step(|s: &String| Flow::next(format!("{s}!")))
            .step(|s| {
                if s.starts_with("bad") {
                    Flow::halt_with(|s: String| format!("recovered from {s}"))
                } else {
                    Flow::next(s.clone())
                }
            })
            .step(|s| Flow::next(s.to_uppercase()));
        assert_eq!(k.run("bad".into()), "recovered from bad!");
        assert_eq!(k.run("ok".into()), "OK!");
    }

    #[test]
    fn chain_appends_steps() {
        let a = Continuation::init([|n: &u32| Flow::next(n + 1)]);
        let b = Continuation::init([|n: &u32| Flow::next(n * 3)]);
        let k = a.chain(b);
        assert_eq!(k.len(), 2);
        assert_eq!(k.run(1), 6);
    }

    #[test]
    fn long_chains_are_stack_safe() {
        let k = Continuation::init((0..100_000).map(|_| |n: &u64| Flow::next(n + 1)));
        assert_eq!(k.run(0), 100_000);
    }

    #[test]
    fn trampoline_runs_deferred_work() {
        fn countdown(n: u64) -> Bounce<'static, u64> {
            if n == 0 {
                Bounce::Done(0)
            } else {
                Bounce::More(Box::new(move || countdown(n - 1)))
            }
        }
        assert_eq!(trampoline(countdown(1_000_000)), 0);
    }
}
