//! Running rule code so that a panic becomes a value.
//!
//! [`isolate`] marks the current thread while the rule body runs. The hook
//! installed by [`install_panic_hook`] stays quiet for panics raised inside
//! such a body (they are reported as `internal error:` offenses instead) and
//! defers to the previous hook for every other panic.

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, catch_unwind, AssertUnwindSafe};
use std::sync::Once;

thread_local! {
    static ISOLATING: Cell<bool> = const { Cell::new(false) };
}

static HOOK: Once = Once::new();

/// Runs `body`, turning a panic into its message.
pub(crate) fn isolate<T>(body: impl FnOnce() -> T) -> Result<T, String> {
    let outer = ISOLATING.with(|flag| flag.replace(true));
    let outcome = catch_unwind(AssertUnwindSafe(body));
    ISOLATING.with(|flag| flag.set(outer));
    outcome.map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "rule panicked".to_string())
}

/// Whether the current thread is running isolated rule code.
#[must_use]
pub fn is_isolating() -> bool {
    ISOLATING.with(Cell::get)
}

/// Silences the default panic output for panics caught from rule code.
///
/// Panics outside rule code still reach the previously installed hook.
/// Installing more than once has no further effect.
pub fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if is_isolating() {
                tracing::debug!("rule panicked: {info}");
            } else {
                previous(info);
            }
        }));
    });
}
