// ember-core - Dynamic binding frame management
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Thread-local binding frames for dynamic vars.
//!
//! Each thread has its own stack of binding frames, kept as an immutable
//! linked list so a whole stack can be captured and handed to another
//! thread. A var's effective value is its innermost thread binding, or its
//! root when the thread has none.

use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

use ember_value::{Value, Var};
use tracing::trace;

use crate::error::{Error, Result};

/// A binding frame containing var bindings for one dynamic scope.
#[derive(Clone, Default)]
struct BindingFrame {
    /// Map from var id to bound value
    bindings: HashMap<u64, Value>,
    /// Enclosing frame
    prev: Option<Arc<BindingFrame>>,
}

impl BindingFrame {
    fn get(&self, var_id: u64) -> Option<Value> {
        match self.bindings.get(&var_id) {
            Some(val) => Some(val.clone()),
            None => self.prev.as_ref().and_then(|p| p.get(var_id)),
        }
    }

    fn has_binding(&self, var_id: u64) -> bool {
        self.bindings.contains_key(&var_id)
            || self.prev.as_ref().is_some_and(|p| p.has_binding(var_id))
    }

    /// Copy of the chain with the innermost binding of `var_id` replaced.
    /// Frames below the one holding the binding are shared.
    fn with_update(&self, var_id: u64, value: Value) -> BindingFrame {
        if self.bindings.contains_key(&var_id) {
            let mut bindings = self.bindings.clone();
            bindings.insert(var_id, value);
            BindingFrame {
                bindings,
                prev: self.prev.clone(),
            }
        } else {
            BindingFrame {
                bindings: self.bindings.clone(),
                prev: self
                    .prev
                    .as_ref()
                    .map(|p| Arc::new(p.with_update(var_id, value))),
            }
        }
    }
}

thread_local! {
    /// None means no dynamic bindings are active on this thread.
    static CURRENT_FRAME: RefCell<Option<Arc<BindingFrame>>> = const { RefCell::new(None) };
}

fn current_frame() -> Option<Arc<BindingFrame>> {
    CURRENT_FRAME.with(|cell| cell.borrow().clone())
}

fn replace_frame(frame: Option<Arc<BindingFrame>>) -> Option<Arc<BindingFrame>> {
    CURRENT_FRAME.with(|cell| std::mem::replace(&mut *cell.borrow_mut(), frame))
}

fn push_frame(bindings: HashMap<u64, Value>) -> Option<Arc<BindingFrame>> {
    let prev = current_frame();
    let frame = BindingFrame {
        bindings,
        prev: prev.clone(),
    };
    replace_frame(Some(Arc::new(frame)));
    prev
}

fn require_dynamic(var: &Var) -> Result<()> {
    if var.is_dynamic() {
        Ok(())
    } else {
        Err(Error::NotDynamic(var.to_string()))
    }
}

/// Push a frame binding a single var.
///
/// Must be balanced by [`pop_binding`] on the same thread. Prefer
/// [`push_bindings`], whose guard pops on every exit path.
pub fn push_binding(var: &Var, value: Value) -> Result<()> {
    require_dynamic(var)?;
    trace!(var = %var, "push binding");
    push_frame(HashMap::from([(var.id(), value)]));
    Ok(())
}

/// Pop the innermost frame, which must bind `var`.
pub fn pop_binding(var: &Var) -> Result<()> {
    let top = current_frame()
        .filter(|frame| frame.bindings.contains_key(&var.id()))
        .ok_or_else(|| Error::BindingUnderflow(var.to_string()))?;
    trace!(var = %var, "pop binding");
    replace_frame(top.prev.clone());
    Ok(())
}

/// Push one frame binding every var in `bindings`.
///
/// Fails without pushing anything if any var is not dynamic. The returned
/// guard restores the previous frame when dropped, including during unwind.
pub fn push_bindings(bindings: Vec<(&Var, Value)>) -> Result<BindingGuard> {
    for (var, _) in &bindings {
        require_dynamic(var)?;
    }
    let map = bindings
        .into_iter()
        .map(|(var, val)| (var.id(), val))
        .collect();
    Ok(BindingGuard::restoring(push_frame(map)))
}

/// Run `f` with `bindings` in effect.
pub fn with_bindings<R>(bindings: Vec<(&Var, Value)>, f: impl FnOnce() -> R) -> Result<R> {
    let _guard = push_bindings(bindings)?;
    Ok(f())
}

/// Restores the frame that was current when it was created.
///
/// Bound to the creating thread.
#[must_use = "bindings are popped as soon as the guard is dropped"]
pub struct BindingGuard {
    prev: Option<Arc<BindingFrame>>,
    _not_send: PhantomData<Rc<()>>,
}

impl BindingGuard {
    fn restoring(prev: Option<Arc<BindingFrame>>) -> Self {
        BindingGuard {
            prev,
            _not_send: PhantomData,
        }
    }
}

impl Drop for BindingGuard {
    fn drop(&mut self) {
        replace_frame(self.prev.take());
    }
}

/// Get the thread-local binding for a var, if any.
#[inline]
#[must_use]
pub fn get_thread_binding(var: &Var) -> Option<Value> {
    if !var.is_dynamic() {
        return None;
    }
    CURRENT_FRAME.with(|cell| cell.borrow().as_ref().and_then(|f| f.get(var.id())))
}

#[inline]
pub fn has_thread_binding(var: &Var) -> bool {
    var.is_dynamic()
        && CURRENT_FRAME.with(|cell| cell.borrow().as_ref().is_some_and(|f| f.has_binding(var.id())))
}

/// `set!`: replace the innermost thread binding of `var`.
///
/// The root is never touched. Returns the new value.
pub fn set_binding(var: &Var, value: Value) -> Result<Value> {
    require_dynamic(var)?;
    CURRENT_FRAME.with(|cell| {
        let mut slot = cell.borrow_mut();
        match slot.as_ref() {
            Some(frame) if frame.has_binding(var.id()) => {
                let updated = frame.with_update(var.id(), value.clone());
                *slot = Some(Arc::new(updated));
                Ok(value)
            }
            _ => Err(Error::NoThreadBinding(var.to_string())),
        }
    })
}

/// Dereference a var: thread binding first, then root.
#[inline]
pub fn deref(var: &Var) -> Result<Value> {
    if let Some(val) = get_thread_binding(var) {
        return Ok(val);
    }
    var.root()
        .ok_or_else(|| Error::Unbound(var.qualified_name()))
}

/// Number of frames on this thread's stack.
pub fn depth() -> usize {
    let mut n = 0;
    let mut frame = current_frame();
    while let Some(f) = frame {
        n += 1;
        frame = f.prev.clone();
    }
    n
}

/// The calling thread's binding stack, frozen.
///
/// Install it on another thread to give work submitted there the
/// submitter's dynamic context.
#[derive(Clone, Default)]
pub struct BindingSnapshot {
    frame: Option<Arc<BindingFrame>>,
}

impl BindingSnapshot {
    pub fn is_empty(&self) -> bool {
        self.frame.is_none()
    }

    /// Make this snapshot the current thread's binding stack until the guard
    /// is dropped.
    pub fn install(&self) -> BindingGuard {
        BindingGuard::restoring(replace_frame(self.frame.clone()))
    }

    /// Run `f` with this snapshot installed.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.install();
        f()
    }
}

impl std::fmt::Debug for BindingSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingSnapshot")
            .field("empty", &self.is_empty())
            .finish()
    }
}

/// Capture this thread's current bindings.
pub fn capture_bindings() -> BindingSnapshot {
    BindingSnapshot {
        frame: current_frame(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_dynamic_var(name: &str, value: Value) -> Var {
        let var = Var::with_root("test", name, value);
        var.set_dynamic(true);
        var
    }

    fn make_static_var(name: &str, value: Value) -> Var {
        Var::with_root("test", name, value)
    }

    // =========================================================================
    // push_bindings
    // =========================================================================

    #[test]
    fn test_push_bindings_creates_binding() {
        let var = make_dynamic_var("*x*", Value::int(1));
        assert!(!has_thread_binding(&var));
        {
            let _guard = push_bindings(vec![(&var, Value::int(42))]).unwrap();
            assert!(has_thread_binding(&var));
            assert_eq!(get_thread_binding(&var), Some(Value::int(42)));
        }
        assert!(!has_thread_binding(&var));
    }

    #[test]
    fn test_nested_bindings() {
        let var = make_dynamic_var("*x*", Value::int(1));
        let _outer = push_bindings(vec![(&var, Value::int(10))]).unwrap();
        {
            let _inner = push_bindings(vec![(&var, Value::int(20))]).unwrap();
            assert_eq!(deref(&var).unwrap(), Value::int(20));
            assert_eq!(depth(), 2);
        }
        assert_eq!(deref(&var).unwrap(), Value::int(10));
        assert_eq!(depth(), 1);
    }

    #[test]
    fn test_multiple_vars_in_single_frame() {
        let x = make_dynamic_var("*x*", Value::int(1));
        let y = make_dynamic_var("*y*", Value::int(2));
        let _guard = push_bindings(vec![(&x, Value::int(10)), (&y, Value::int(20))]).unwrap();
        assert_eq!(deref(&x).unwrap(), Value::int(10));
        assert_eq!(deref(&y).unwrap(), Value::int(20));
        assert_eq!(depth(), 1);
    }

    #[test]
    fn test_non_dynamic_var_rejected() {
        let dynamic = make_dynamic_var("*d*", Value::int(1));
        let fixed = make_static_var("s", Value::int(2));
        let result = push_bindings(vec![(&dynamic, Value::int(3)), (&fixed, Value::int(4))]);
        assert!(matches!(result, Err(Error::NotDynamic(_))));
        // Nothing was pushed
        assert_eq!(depth(), 0);
        assert_eq!(
            push_binding(&fixed, Value::Nil).unwrap_err(),
            Error::NotDynamic("#'test/s".into())
        );
    }

    // =========================================================================
    // push_binding / pop_binding
    // =========================================================================

    #[test]
    fn test_push_pop_restores_root() {
        let var = make_dynamic_var("*x*", Value::int(0));
        push_binding(&var, Value::int(1)).unwrap();
        push_binding(&var, Value::int(2)).unwrap();
        assert_eq!(deref(&var).unwrap(), Value::int(2));
        pop_binding(&var).unwrap();
        assert_eq!(deref(&var).unwrap(), Value::int(1));
        pop_binding(&var).unwrap();
        assert_eq!(deref(&var).unwrap(), Value::int(0));
    }

    #[test]
    fn test_pop_without_push() {
        let var = make_dynamic_var("*x*", Value::int(0));
        assert!(matches!(pop_binding(&var), Err(Error::BindingUnderflow(_))));
    }

    #[test]
    fn test_pop_of_other_var_is_underflow() {
        let x = make_dynamic_var("*x*", Value::int(0));
        let y = make_dynamic_var("*y*", Value::int(0));
        push_binding(&x, Value::int(1)).unwrap();
        assert!(matches!(pop_binding(&y), Err(Error::BindingUnderflow(_))));
        pop_binding(&x).unwrap();
    }

    // =========================================================================
    // set_binding
    // =========================================================================

    #[test]
    fn test_set_binding_updates_value() {
        let var = make_dynamic_var("*x*", Value::int(1));
        let _guard = push_bindings(vec![(&var, Value::int(10))]).unwrap();
        set_binding(&var, Value::int(99)).unwrap();
        assert_eq!(deref(&var).unwrap(), Value::int(99));
        assert_eq!(var.root(), Some(Value::int(1)));
    }

    #[test]
    fn test_set_binding_fails_without_existing_binding() {
        let var = make_dynamic_var("*x*", Value::int(1));
        assert!(matches!(
            set_binding(&var, Value::int(2)),
            Err(Error::NoThreadBinding(_))
        ));
        assert_eq!(var.root(), Some(Value::int(1)));
    }

    #[test]
    fn test_set_binding_fails_for_non_dynamic() {
        let var = make_static_var("x", Value::int(1));
        assert!(matches!(
            set_binding(&var, Value::int(2)),
            Err(Error::NotDynamic(_))
        ));
    }

    #[test]
    fn test_set_binding_reaches_enclosing_frame() {
        let x = make_dynamic_var("*x*", Value::int(1));
        let y = make_dynamic_var("*y*", Value::int(2));
        let _outer = push_bindings(vec![(&x, Value::int(10))]).unwrap();
        {
            let _inner = push_bindings(vec![(&y, Value::int(20))]).unwrap();
            set_binding(&x, Value::int(11)).unwrap();
            assert_eq!(deref(&x).unwrap(), Value::int(11));
        }
        // The outer frame was the one updated
        assert_eq!(deref(&x).unwrap(), Value::int(11));
    }

    // =========================================================================
    // deref
    // =========================================================================

    #[test]
    fn test_deref_falls_back_to_root() {
        let var = make_dynamic_var("*x*", Value::int(42));
        assert_eq!(deref(&var).unwrap(), Value::int(42));
    }

    #[test]
    fn test_deref_with_nil_binding() {
        let var = make_dynamic_var("*x*", Value::int(42));
        let _guard = push_bindings(vec![(&var, Value::Nil)]).unwrap();
        assert_eq!(deref(&var).unwrap(), Value::Nil);
    }

    #[test]
    fn test_deref_unbound() {
        let var = Var::new("test", "nothing");
        assert_eq!(
            deref(&var).unwrap_err(),
            Error::Unbound("test/nothing".into())
        );
    }

    #[test]
    fn test_thread_binding_satisfies_unbound_dynamic_var() {
        let var = Var::new("test", "*late*");
        var.set_dynamic(true);
        let _guard = push_bindings(vec![(&var, Value::int(5))]).unwrap();
        assert_eq!(deref(&var).unwrap(), Value::int(5));
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    #[test]
    fn test_snapshot_is_send() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BindingSnapshot>();
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(capture_bindings().is_empty());
    }

    #[test]
    fn test_snapshot_install_restores_previous() {
        let var = make_dynamic_var("*x*", Value::int(0));
        let snapshot = {
            let _guard = push_bindings(vec![(&var, Value::int(7))]).unwrap();
            capture_bindings()
        };
        assert_eq!(deref(&var).unwrap(), Value::int(0));
        let seen = snapshot.run(|| deref(&var).unwrap());
        assert_eq!(seen, Value::int(7));
        assert_eq!(deref(&var).unwrap(), Value::int(0));
    }

    #[test]
    fn test_snapshot_unaffected_by_later_set() {
        let var = make_dynamic_var("*x*", Value::int(0));
        let _guard = push_bindings(vec![(&var, Value::int(1))]).unwrap();
        let snapshot = capture_bindings();
        set_binding(&var, Value::int(2)).unwrap();
        assert_eq!(snapshot.run(|| deref(&var).unwrap()), Value::int(1));
        assert_eq!(deref(&var).unwrap(), Value::int(2));
    }
}
