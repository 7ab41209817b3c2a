//! # Keyed convergence barrier.
//!
//! ## Rules
//! - Participant keys are fixed at construction.
//! - [`Converge::set_action`] may be called once.
//! - [`Converge::supply`] rejects keys outside the set ([`ConvergeError::UnexpectedKey`])
//!   and keys that already have a value ([`ConvergeError::DuplicateKey`]).
//! - [`Supplier::send`] rejects a second value for the same key
//!   ([`ConvergeError::AlreadyConverged`]); the check happens under the same
//!   lock that detects completion.
//! - Storing the last value and taking the action is one critical section:
//!   no double fire, no lost fire.
//! - The action runs on its own tokio task; its outcome is written once to a
//!   `watch` channel shared by all handles.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::watch;

use super::handle::{Handle, Outcome};
use crate::error::ConvergeError;

type Action<V, T> = Box<dyn FnOnce(IndexMap<String, V>) -> BoxFuture<'static, Outcome<T>> + Send>;

enum Slot<V> {
    Empty,
    Filled(V),
    Consumed,
}

impl<V> Slot<V> {
    fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }
}

struct State<V, T> {
    slots: IndexMap<String, Slot<V>>,
    remaining: usize,
    action: Option<Action<V, T>>,
    has_action: bool,
    completed: bool,
    tx: Option<watch::Sender<Option<Outcome<T>>>>,
}

/// N-to-one-to-N barrier with exactly-once action and broadcast outcome.
///
/// ## Example
/// ```rust
/// use bootvisor::Converge;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let cm = Converge::<u32, u32>::new(["a", "b"]);
/// cm.set_action(|values| async move { Ok(values.values().sum()) }).unwrap();
///
/// let ha = cm.supply("a").unwrap().send(1).unwrap();
/// let hb = cm.supply("b").unwrap().send(2).unwrap();
///
/// assert_eq!(ha.wait().await, Ok(3));
/// assert_eq!(hb.wait().await, Ok(3));
/// # }
/// ```
pub struct Converge<V, T> {
    state: Mutex<State<V, T>>,
    rx: watch::Receiver<Option<Outcome<T>>>,
}

impl<V, T> Converge<V, T>
where
    V: Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Creates a barrier over the given participant keys (duplicates collapse).
    pub fn new<I, K>(keys: I) -> Arc<Self>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let slots: IndexMap<String, Slot<V>> = keys
            .into_iter()
            .map(|k| (k.into(), Slot::Empty))
            .collect();
        let (tx, rx) = watch::channel(None);

        Arc::new(Self {
            state: Mutex::new(State {
                remaining: slots.len(),
                slots,
                action: None,
                has_action: false,
                completed: false,
                tx: Some(tx),
            }),
            rx,
        })
    }

    /// Registers the fan-in action.
    ///
    /// Fails with [`ConvergeError::ActionAlreadySet`] on a second call.
    pub fn set_action<F, Fut>(&self, action: F) -> Result<(), ConvergeError>
    where
        F: FnOnce(IndexMap<String, V>) -> Fut + Send + 'static,
        Fut: Future<Output = Outcome<T>> + Send + 'static,
    {
        let mut state = self.lock();
        if state.has_action {
            return Err(ConvergeError::ActionAlreadySet);
        }
        state.has_action = true;
        state.action = Some(Box::new(move |values| action(values).boxed()));
        Ok(())
    }

    /// True once an action has been registered.
    pub fn has_action(&self) -> bool {
        self.lock().has_action
    }

    /// Returns the setter for `key`.
    pub fn supply(self: &Arc<Self>, key: &str) -> Result<Supplier<V, T>, ConvergeError> {
        let state = self.lock();
        match state.slots.get(key) {
            None => Err(ConvergeError::UnexpectedKey {
                key: key.to_string(),
            }),
            Some(slot) if !slot.is_empty() => Err(ConvergeError::DuplicateKey {
                key: key.to_string(),
            }),
            Some(_) => Ok(Supplier {
                barrier: Arc::clone(self),
                key: key.to_string(),
            }),
        }
    }

    /// Returns a handle on the outcome without supplying a value.
    pub fn handle(&self) -> Handle<T> {
        Handle::new(self.rx.clone())
    }

    /// Participant keys, in construction order.
    pub fn keys(&self) -> Vec<String> {
        self.lock().slots.keys().cloned().collect()
    }

    /// Number of participants that have not supplied a value yet.
    pub fn remaining(&self) -> usize {
        self.lock().remaining
    }

    /// True once the last value has arrived.
    pub fn is_completed(&self) -> bool {
        self.lock().completed
    }

    fn lock(&self) -> MutexGuard<'_, State<V, T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `value` for `key`; fires the action if it was the last one.
    fn put(&self, key: &str, value: V) -> Result<Handle<T>, ConvergeError> {
        let fire = {
            let mut state = self.lock();
            let slot = match state.slots.get_mut(key) {
                Some(slot) if slot.is_empty() => slot,
                Some(_) => {
                    return Err(ConvergeError::AlreadyConverged {
                        key: key.to_string(),
                    });
                }
                None => {
                    return Err(ConvergeError::UnexpectedKey {
                        key: key.to_string(),
                    });
                }
            };
            *slot = Slot::Filled(value);
            state.remaining -= 1;

            if state.remaining > 0 {
                None
            } else {
                state.completed = true;
                let values: IndexMap<String, V> = state
                    .slots
                    .iter_mut()
                    .filter_map(|(k, slot)| match std::mem::replace(slot, Slot::Consumed) {
                        Slot::Filled(v) => Some((k.clone(), v)),
                        _ => None,
                    })
                    .collect();
                // Taking the sender means a missing action abandons every waiter.
                Some((state.action.take(), state.tx.take(), values))
            }
        };

        let handle = self.handle();
        match fire {
            None => Ok(handle),
            Some((None, _, _)) => Err(ConvergeError::MissingAction),
            Some((Some(action), tx, values)) => {
                let fut = action(values);
                tokio::spawn(async move {
                    let outcome = fut.await;
                    if let Some(tx) = tx {
                        tx.send_replace(Some(outcome));
                    }
                });
                Ok(handle)
            }
        }
    }
}

/// Per-key setter returned by [`Converge::supply`].
pub struct Supplier<V, T> {
    barrier: Arc<Converge<V, T>>,
    key: String,
}

impl<V, T> Supplier<V, T>
where
    V: Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Key this setter supplies.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Supplies the value and returns a handle on the barrier's outcome.
    pub fn send(self, value: V) -> Result<Handle<T>, ConvergeError> {
        self.barrier.put(&self.key, value)
    }
}
