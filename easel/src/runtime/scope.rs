use std::fmt;
use std::sync::{Arc, LazyLock, Mutex};

use indexmap::IndexMap;
use log::warn;

use super::events::{RuntimeCommand, RuntimeCommandSender};

/// Process-wide ambient scope mirroring global-mode sketch state. One sketch
/// per process writes here; instance-mode sketches never touch it.
static AMBIENT: LazyLock<Mutex<IndexMap<String, ScopeValue>>> =
    LazyLock::new(|| Mutex::new(IndexMap::new()));

fn with_scope<R>(f: impl FnOnce(&mut IndexMap<String, ScopeValue>) -> R) -> R {
    let mut scope = AMBIENT.lock().unwrap_or_else(|e| e.into_inner());
    f(&mut scope)
}

pub fn set(name: &str, value: ScopeValue) {
    with_scope(|scope| {
        scope.insert(name.to_string(), value);
    });
}

pub fn get(name: &str) -> Option<ScopeValue> {
    with_scope(|scope| scope.get(name).cloned())
}

pub fn contains(name: &str) -> bool {
    with_scope(|scope| scope.contains_key(name))
}

pub fn names() -> Vec<String> {
    with_scope(|scope| scope.keys().cloned().collect())
}

/// Assigns a computed export table into the ambient scope. This is the
/// one-time global-mode projection; values exported here are a snapshot and
/// later additions to the instance are not retroactively exported.
pub fn install(table: IndexMap<String, ScopeValue>) {
    with_scope(|scope| {
        for (name, value) in table {
            scope.insert(name, value);
        }
    });
}

/// Empties the ambient scope. The hosting process owns teardown; this exists
/// for tests and for hosts that run sketches back to back.
pub fn clear() {
    with_scope(|scope| scope.clear());
}

/// A value projected onto the ambient scope. Primitives are copied;
/// composite data is shared by reference; behaviors are bound callables
/// that hand invocation back to the owning runtime's command queue.
#[derive(Clone, Debug)]
pub enum ScopeValue {
    Bool(bool),
    UInt(u64),
    Float(f64),
    Text(String),
    Data(Arc<serde_json::Value>),
    Behavior(BehaviorHandle),
}

impl PartialEq for ScopeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::UInt(a), Self::UInt(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Data(a), Self::Data(b)) => a.as_ref() == b.as_ref(),
            (Self::Behavior(a), Self::Behavior(b)) => a.name() == b.name(),
            _ => false,
        }
    }
}

/// A behavior exported in global mode. Invoking it enqueues a command for
/// the runtime that owns the instance, so the callback still runs against
/// the original instance's state.
#[derive(Clone)]
pub struct BehaviorHandle {
    name: String,
    commands: RuntimeCommandSender,
}

impl BehaviorHandle {
    pub fn new(
        name: impl Into<String>,
        commands: RuntimeCommandSender,
    ) -> Self {
        Self {
            name: name.into(),
            commands,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn invoke(&self) {
        let command = RuntimeCommand::InvokeBehavior(self.name.clone());
        if self.commands.send(command).is_err() {
            warn!("behavior '{}' invoked after its runtime ended", self.name);
        }
    }
}

impl fmt::Debug for BehaviorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorHandle")
            .field("name", &self.name)
            .finish()
    }
}
