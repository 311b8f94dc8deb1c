//! # Studio Runtime
//!
//! Runtime implementation for the studio booking engine.
//!
//! This crate provides the `Store` that owns feature state and coordinates
//! reducer execution and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: owns state behind a lock and executes dispatched actions
//! - **Effect execution**: drains effect descriptions and feeds any produced
//!   actions back into the reducer
//!
//! Dispatches are serialized: a `send` acquires the state write lock, runs
//! the reducer to completion, and only then executes effects. No caller can
//! observe a partially applied operation.
//!
//! ## Example
//!
//! ```ignore
//! use studio_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use std::sync::Arc;

use studio_core::effect::Effect;
use studio_core::reducer::Reducer;
use tokio::sync::RwLock;

/// Errors that can occur during Store operations
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// An effect execution failed
    ///
    /// This error is logged but does not halt the store; effects are
    /// fire-and-forget from the caller's point of view.
    #[error("Effect execution failed: {0}")]
    EffectFailed(String),

    /// A task join error occurred during parallel effect execution
    ///
    /// This typically means a spawned task panicked.
    #[error("Task failed during parallel execution: {0}")]
    TaskJoinError(#[from] tokio::task::JoinError),
}

/// The Store - owns state and runs the action → reducer → effects loop
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
    A: Send + std::fmt::Debug + 'static,
    S: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
        }
    }

    /// Send an action to the store
    ///
    /// Runs the reducer on the current state, then executes the returned
    /// effects to completion. Actions produced by effects are fed back into
    /// the reducer before `send` returns.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if an effect fails to execute.
    pub async fn send(&self, action: A) -> Result<(), StoreError> {
        let mut pending = vec![action];

        while let Some(action) = pending.pop() {
            tracing::debug!(?action, "dispatching action");

            let effects = {
                let mut state = self.state.write().await;
                self.reducer.reduce(&mut state, action, &self.environment)
            };

            for effect in effects {
                Self::execute_effect(effect, &mut pending).await?;
            }
        }

        Ok(())
    }

    /// Read state through a projection function
    ///
    /// The closure runs under the read lock; return owned data rather than
    /// holding borrows.
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        let state = self.state.read().await;
        f(&state)
    }

    /// Execute a single effect, collecting any produced follow-up actions
    fn execute_effect<'a>(
        effect: Effect<A>,
        pending: &'a mut Vec<A>,
    ) -> futures::future::BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            match effect {
                Effect::None => {},
                Effect::Parallel(effects) | Effect::Sequential(effects) => {
                    // Single-actor model: composite effects run in order.
                    for effect in effects {
                        Self::execute_effect(effect, pending).await?;
                    }
                },
                Effect::Delay { duration, action } => {
                    tokio::time::sleep(duration).await;
                    pending.push(*action);
                },
                Effect::Future(future) => {
                    if let Some(action) = future.await {
                        pending.push(action);
                    }
                },
            }
            Ok(())
        })
    }
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use studio_core::{SmallVec, smallvec};

    #[derive(Clone, Debug, Default)]
    struct TallyState {
        total: u32,
        echoes: u32,
    }

    #[derive(Clone, Debug)]
    enum TallyAction {
        Add(u32),
        AddThenEcho(u32),
        Echo,
    }

    #[derive(Clone)]
    struct TallyReducer;

    impl Reducer for TallyReducer {
        type State = TallyState;
        type Action = TallyAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TallyAction::Add(n) => {
                    state.total += n;
                    smallvec![Effect::None]
                },
                TallyAction::AddThenEcho(n) => {
                    state.total += n;
                    smallvec![Effect::Future(Box::pin(async {
                        Some(TallyAction::Echo)
                    }))]
                },
                TallyAction::Echo => {
                    state.echoes += 1;
                    smallvec![Effect::None]
                },
            }
        }
    }

    #[tokio::test]
    async fn send_applies_reducer() {
        let store = Store::new(TallyState::default(), TallyReducer, ());

        store.send(TallyAction::Add(2)).await.unwrap();
        store.send(TallyAction::Add(3)).await.unwrap();

        assert_eq!(store.state(|s| s.total).await, 5);
    }

    #[tokio::test]
    async fn future_effects_feed_actions_back() {
        let store = Store::new(TallyState::default(), TallyReducer, ());

        store.send(TallyAction::AddThenEcho(1)).await.unwrap();

        let state = store.state(Clone::clone).await;
        assert_eq!(state.total, 1);
        assert_eq!(state.echoes, 1);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = Store::new(TallyState::default(), TallyReducer, ());
        let clone = store.clone();

        store.send(TallyAction::Add(4)).await.unwrap();

        assert_eq!(clone.state(|s| s.total).await, 4);
    }
}
