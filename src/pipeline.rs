//! Reorderable middleware pipeline that wraps every dispatched request.
//!
//! A [`Pipeline`] holds an ordered sequence of [`PipelineEntry`] values. Running it
//! composes the sequence right to left over an immutable snapshot, with the terminal
//! [`Sender`] as the base case, so every middleware receives a [`Next`] continuation
//! representing the *entire* remaining chain - transport call included. Registration
//! order equals composition order: the first registered middleware is the outermost.
//!
//! Registry operations ([`push`](Pipeline::push), [`push_before`](Pipeline::push_before),
//! [`push_after`](Pipeline::push_after), [`remove`](Pipeline::remove)) mutate the
//! sequence used by the *next* run; an in-flight run executes its own snapshot and is
//! never affected.

pub mod builtin;

// self
use crate::{
	_prelude::*, error::PipelineError, request::PendingRequest, response::Response, sender::Sender,
};

/// Boxed future returned by every pipeline stage.
pub type MiddlewareFuture<'a> = Pin<Box<dyn Future<Output = Result<Response>> + 'a + Send>>;

/// A unit of behavior inserted into the pipeline.
///
/// A middleware can observe or mutate the request, decide whether to invoke `next`,
/// catch whatever `next` raises, and transform the result on the way back out.
/// Returning without calling `next` short-circuits the remaining chain, terminal
/// sender included.
pub trait Middleware
where
	Self: Send + Sync,
{
	/// Handles one request, optionally delegating to the remaining chain via `next`.
	fn handle<'a>(&'a self, ctx: PendingRequest, next: Next<'a>) -> MiddlewareFuture<'a>;
}
impl<F> Middleware for F
where
	F: Send + Sync + for<'a> Fn(PendingRequest, Next<'a>) -> MiddlewareFuture<'a>,
{
	fn handle<'a>(&'a self, ctx: PendingRequest, next: Next<'a>) -> MiddlewareFuture<'a> {
		self(ctx, next)
	}
}

/// Continuation representing the remaining pipeline stages plus the terminal sender.
///
/// The handle is `Copy`, so a middleware may invoke [`run`](Next::run) any number of
/// times; each invocation independently executes the remaining chain, including
/// another transport call. That is permitted by design and is the source of duplicate
/// side effects when misused (see [`builtin::Retry`] for the intended usage).
#[derive(Clone, Copy)]
pub struct Next<'a> {
	entries: &'a [PipelineEntry],
	sender: &'a dyn Sender,
}
impl<'a> Next<'a> {
	/// Executes the remaining chain against `ctx`.
	///
	/// When no stages remain, this is the terminal transport call.
	pub fn run(self, ctx: PendingRequest) -> MiddlewareFuture<'a> {
		match self.entries.split_first() {
			Some((entry, rest)) =>
				entry.middleware.handle(ctx, Next { entries: rest, sender: self.sender }),
			None => self.sender.send(ctx),
		}
	}
}
impl Debug for Next<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Next").field("remaining", &self.entries.len()).finish()
	}
}

/// One registered middleware, optionally addressable by a unique name.
///
/// Unnamed entries cannot be used as insertion anchors and may appear any number of
/// times; names must be unique within a pipeline.
#[derive(Clone)]
pub struct PipelineEntry {
	name: Option<String>,
	middleware: Arc<dyn Middleware>,
}
impl PipelineEntry {
	/// Creates an unaddressable entry.
	pub fn anonymous<M>(middleware: M) -> Self
	where
		M: 'static + Middleware,
	{
		Self { name: None, middleware: Arc::new(middleware) }
	}

	/// Creates an entry addressable by `name` for later insertion or removal.
	pub fn named<M>(name: impl Into<String>, middleware: M) -> Self
	where
		M: 'static + Middleware,
	{
		Self { name: Some(name.into()), middleware: Arc::new(middleware) }
	}

	/// Name of the entry, when it has one.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}
}
impl Debug for PipelineEntry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PipelineEntry").field("name", &self.name).finish()
	}
}

/// Ordered, reorderable collection of middleware entries.
///
/// Construction, mutation, and execution are independent: a pipeline is built with
/// zero or more entries, optionally reshaped between runs through the registry
/// operations, and run any number of times. Every run composes a fresh snapshot, so
/// no execution state is shared between runs.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
	entries: Vec<PipelineEntry>,
}
impl Pipeline {
	/// Creates an empty pipeline; running it degenerates to the terminal send.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a pipeline from an ordered list of entries.
	///
	/// Fails with [`PipelineError::DuplicateName`] when two entries share a name.
	pub fn with_entries(
		entries: impl IntoIterator<Item = PipelineEntry>,
	) -> Result<Self, PipelineError> {
		let mut pipeline = Self::new();

		for entry in entries {
			pipeline.push_entry(pipeline.entries.len(), entry)?;
		}

		Ok(pipeline)
	}

	/// Appends an anonymous middleware at the end of the sequence.
	pub fn push<M>(&mut self, middleware: M)
	where
		M: 'static + Middleware,
	{
		self.entries.push(PipelineEntry::anonymous(middleware));
	}

	/// Appends a named middleware at the end of the sequence.
	pub fn push_named<M>(
		&mut self,
		name: impl Into<String>,
		middleware: M,
	) -> Result<(), PipelineError>
	where
		M: 'static + Middleware,
	{
		self.push_entry(self.entries.len(), PipelineEntry::named(name, middleware))
	}

	/// Inserts an entry immediately before the entry named `anchor`.
	///
	/// The anchor is resolved first, so an unknown anchor fails with
	/// [`PipelineError::NotFound`] even when the new entry's name would also collide.
	pub fn push_before(&mut self, anchor: &str, entry: PipelineEntry) -> Result<(), PipelineError> {
		let index = self.position(anchor)?;

		self.push_entry(index, entry)
	}

	/// Inserts an entry immediately after the entry named `anchor`.
	pub fn push_after(&mut self, anchor: &str, entry: PipelineEntry) -> Result<(), PipelineError> {
		let index = self.position(anchor)?;

		self.push_entry(index + 1, entry)
	}

	/// Removes the entry named `name`.
	///
	/// Fails with [`PipelineError::NotFound`] when absent; there is no silent no-op.
	pub fn remove(&mut self, name: &str) -> Result<(), PipelineError> {
		let index = self.position(name)?;

		self.entries.remove(index);

		Ok(())
	}

	/// Number of registered entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns whether no entries are registered.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Returns whether an entry named `name` is registered.
	pub fn contains(&self, name: &str) -> bool {
		self.position(name).is_ok()
	}

	/// Names of all addressable entries, in registration order.
	pub fn names(&self) -> Vec<&str> {
		self.entries.iter().filter_map(PipelineEntry::name).collect()
	}

	/// Takes an immutable copy of the current sequence for a single run.
	pub fn snapshot(&self) -> PipelineSnapshot {
		PipelineSnapshot { entries: self.entries.clone() }
	}

	/// Runs the composed chain against `ctx`, with `sender` as the terminal step.
	///
	/// The sequence is borrowed immutably for the duration of the returned future;
	/// shared pipelines that must stay mutable while runs are in flight go through
	/// [`PipelineHandle`] instead.
	pub fn run<'a>(&'a self, ctx: PendingRequest, sender: &'a dyn Sender) -> MiddlewareFuture<'a> {
		Next { entries: &self.entries, sender }.run(ctx)
	}

	fn position(&self, name: &str) -> Result<usize, PipelineError> {
		self.entries
			.iter()
			.position(|entry| entry.name() == Some(name))
			.ok_or_else(|| PipelineError::NotFound { name: name.into() })
	}

	fn push_entry(&mut self, index: usize, entry: PipelineEntry) -> Result<(), PipelineError> {
		if let Some(name) = entry.name()
			&& self.contains(name)
		{
			return Err(PipelineError::DuplicateName { name: name.into() });
		}

		self.entries.insert(index, entry);

		Ok(())
	}
}

/// Immutable copy of a pipeline's sequence, executed by exactly one logical run.
///
/// Registry mutations performed after the snapshot was taken are invisible to it.
#[derive(Clone, Debug)]
pub struct PipelineSnapshot {
	entries: Vec<PipelineEntry>,
}
impl PipelineSnapshot {
	/// Number of entries captured by the snapshot.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns whether the snapshot captured no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Runs the captured chain against `ctx`, with `sender` as the terminal step.
	pub fn run<'a>(&'a self, ctx: PendingRequest, sender: &'a dyn Sender) -> MiddlewareFuture<'a> {
		Next { entries: &self.entries, sender }.run(ctx)
	}
}

/// Shared, internally synchronized pipeline for connectors used across tasks.
///
/// Registry operations take `&self` and lock a [`RwLock`] for the duration of the
/// synchronous mutation only. [`snapshot`](PipelineHandle::snapshot) copies the
/// sequence under the read lock and releases it before any await point, so a
/// concurrent `push`/`remove` can never corrupt an in-flight composition.
#[derive(Clone, Debug, Default)]
pub struct PipelineHandle(Arc<RwLock<Pipeline>>);
impl PipelineHandle {
	/// Wraps an existing pipeline.
	pub fn new(pipeline: Pipeline) -> Self {
		Self(Arc::new(RwLock::new(pipeline)))
	}

	/// Appends an anonymous middleware at the end of the sequence.
	pub fn push<M>(&self, middleware: M)
	where
		M: 'static + Middleware,
	{
		self.0.write().push(middleware);
	}

	/// Appends a named middleware at the end of the sequence.
	pub fn push_named<M>(
		&self,
		name: impl Into<String>,
		middleware: M,
	) -> Result<(), PipelineError>
	where
		M: 'static + Middleware,
	{
		self.0.write().push_named(name, middleware)
	}

	/// Inserts an entry immediately before the entry named `anchor`.
	pub fn push_before(&self, anchor: &str, entry: PipelineEntry) -> Result<(), PipelineError> {
		self.0.write().push_before(anchor, entry)
	}

	/// Inserts an entry immediately after the entry named `anchor`.
	pub fn push_after(&self, anchor: &str, entry: PipelineEntry) -> Result<(), PipelineError> {
		self.0.write().push_after(anchor, entry)
	}

	/// Removes the entry named `name`.
	pub fn remove(&self, name: &str) -> Result<(), PipelineError> {
		self.0.write().remove(name)
	}

	/// Number of registered entries.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns whether no entries are registered.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	/// Returns whether an entry named `name` is registered.
	pub fn contains(&self, name: &str) -> bool {
		self.0.read().contains(name)
	}

	/// Names of all addressable entries, in registration order.
	pub fn names(&self) -> Vec<String> {
		self.0.read().names().into_iter().map(str::to_owned).collect()
	}

	/// Takes an immutable copy of the current sequence for a single run.
	pub fn snapshot(&self) -> PipelineSnapshot {
		self.0.read().snapshot()
	}

	/// Snapshots the current sequence and runs it against `ctx`.
	pub async fn run(&self, ctx: PendingRequest, sender: &dyn Sender) -> Result<Response> {
		let snapshot = self.snapshot();

		snapshot.run(ctx, sender).await
	}
}
