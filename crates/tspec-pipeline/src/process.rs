//! # Processes
//!
//! A [`Proc`] is a queue of operations applied in order to a record. Each
//! entry is bound when it is enqueued, so a process can mix synchronous
//! [`Op`]s and [`AsyncOp`]s freely as long as each stage's output satisfies
//! the next stage's input type.
//!
//! ## Queue Semantics
//!
//! `run` removes each entry before executing it. A process that completes
//! is empty afterwards and can be refilled for a value of another type. A
//! process that fails keeps the entries after the failing one.

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use serde_json::Value;
use tracing::{debug, trace};
use tspec_core::TypeSpecError;

use crate::async_op::AsyncOp;
use crate::op::Op;

/// A pipeline stage a [`Proc`] can enqueue.
pub trait Stage: Send + Sync + 'static {
    /// Name used in logs.
    fn label(&self) -> String;

    /// Start running this stage on `state` with the bound environment.
    fn run_stage(
        self: Arc<Self>,
        state: Value,
        env: Option<Value>,
    ) -> BoxFuture<'static, Result<Value, TypeSpecError>>;
}

impl Stage for Op {
    fn label(&self) -> String {
        format!(
            "Op({} -> {})",
            self.input_type().type_name(),
            self.output_type().type_name()
        )
    }

    fn run_stage(
        self: Arc<Self>,
        state: Value,
        env: Option<Value>,
    ) -> BoxFuture<'static, Result<Value, TypeSpecError>> {
        future::ready(self.run(&state, env.as_ref()).map(Value::from)).boxed()
    }
}

impl Stage for AsyncOp {
    fn label(&self) -> String {
        format!(
            "AsyncOp({} -> {})",
            self.input_type().type_name(),
            self.output_type().type_name()
        )
    }

    fn run_stage(
        self: Arc<Self>,
        state: Value,
        env: Option<Value>,
    ) -> BoxFuture<'static, Result<Value, TypeSpecError>> {
        async move { self.run(&state, env.as_ref()).await.map(Value::from) }.boxed()
    }
}

type Job = Box<dyn FnOnce(Value) -> BoxFuture<'static, Result<Value, TypeSpecError>> + Send>;

struct Entry {
    name: String,
    job: Job,
}

/// A draining queue of operations.
#[derive(Default)]
pub struct Proc {
    queue: VecDeque<Entry>,
}

impl Proc {
    /// An empty process.
    pub fn init() -> Self {
        Self::default()
    }

    /// Enqueue `stage`, to be run with `env` as its environment.
    pub fn op<S: Stage>(&mut self, stage: Arc<S>, env: Option<Value>) -> &mut Self {
        let name = stage.label();
        self.queue.push_back(Entry {
            name,
            job: Box::new(move |state| stage.run_stage(state, env)),
        });
        self
    }

    /// Move every entry of `other` to the end of this queue.
    pub fn compose(&mut self, mut other: Proc) -> &mut Self {
        self.queue.append(&mut other.queue);
        self
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Apply queued entries in order to a copy of `state`, draining the
    /// queue. An empty queue returns the copy unchanged.
    ///
    /// # Errors
    ///
    /// `INVALID_VALUE` if `state` is not an object, otherwise the first
    /// error raised by an entry.
    pub async fn run(&mut self, state: &Value) -> Result<Value, TypeSpecError> {
        if !state.is_object() {
            return Err(TypeSpecError::invalid_value("Process state", "an object"));
        }
        debug!(stages = self.queue.len(), "running process");

        let mut state = state.clone();
        while let Some(entry) = self.queue.pop_front() {
            trace!(stage = %entry.name, remaining = self.queue.len(), "running stage");
            state = (entry.job)(state).await?;
        }
        Ok(state)
    }

    /// Await `state`, then [`Proc::run`] it.
    pub async fn run_pending<F>(&mut self, state: F) -> Result<Value, TypeSpecError>
    where
        F: Future<Output = Value>,
    {
        let state = state.await;
        self.run(&state).await
    }
}

impl fmt::Debug for Proc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.queue.iter().map(|entry| &entry.name))
            .finish()
    }
}
