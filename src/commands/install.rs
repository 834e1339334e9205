//! Per-thread authoritative registry.
//!
//! Hosts that want a single registry reachable without threading a
//! reference everywhere can install one here. The first install wins; later
//! candidates are logged and dropped.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};

use super::CommandRegistry;

thread_local! {
    static INSTALLED: RefCell<Option<Rc<CommandRegistry>>> = const { RefCell::new(None) };
}

/// Install `registry` unless one is already installed on this thread.
///
/// Returns the registry that is installed after the call, which is the
/// earlier one if `registry` lost.
pub fn install(registry: Rc<CommandRegistry>) -> Rc<CommandRegistry> {
    INSTALLED.with(|slot| {
        let mut slot = slot.borrow_mut();
        match slot.as_ref() {
            Some(existing) => {
                if !Rc::ptr_eq(existing, &registry) {
                    warn!("Duplicate command registry installed, discarding the new one");
                }
                Rc::clone(existing)
            }
            None => {
                debug!(enabled = registry.is_enabled(), "Installed command registry");
                *slot = Some(Rc::clone(&registry));
                registry
            }
        }
    })
}

/// The registry installed on this thread, if any.
pub fn installed() -> Option<Rc<CommandRegistry>> {
    INSTALLED.with(|slot| slot.borrow().clone())
}

/// Remove and return the installed registry.
pub fn uninstall() -> Option<Rc<CommandRegistry>> {
    INSTALLED.with(|slot| slot.borrow_mut().take())
}
