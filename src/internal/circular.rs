//! Re-entrant resolution detection.
//!
//! Cached slots are initialised through a `OnceCell`, so a factory that
//! resolves its own descriptor on the same thread would block forever. The
//! thread-local stack below turns that into an error before it happens.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};

// (scope identity, descriptor position, display name)
type Frame = (usize, usize, String);

thread_local! {
    static RESOLUTION_STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// Marks a descriptor as under construction on this thread.
///
/// The frame is popped when the guard drops, including on unwind.
pub(crate) struct ResolutionGuard {
    scope: usize,
    index: usize,
}

impl ResolutionGuard {
    /// Pushes a frame, failing if the same descriptor of the same scope is
    /// already being built on this thread or the stack is `max_depth` deep.
    pub(crate) fn enter(
        scope: usize,
        index: usize,
        name: &str,
        max_depth: usize,
    ) -> DiResult<Self> {
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();

            if let Some(start) = stack.iter().position(|(s, i, _)| *s == scope && *i == index) {
                let mut path: Vec<String> =
                    stack[start..].iter().map(|(_, _, n)| n.clone()).collect();
                path.push(name.to_string());
                return Err(DiError::Circular(path));
            }

            if stack.len() >= max_depth {
                return Err(DiError::DepthExceeded(max_depth));
            }

            stack.push((scope, index, name.to_string()));
            Ok(Self { scope, index })
        })
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLUTION_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();
            debug_assert!(matches!(popped, Some((s, i, _)) if s == self.scope && i == self.index));
        });
    }
}
