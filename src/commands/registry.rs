//! Runtime registry of debug commands.
//!
//! Maps command names to the bindings currently registered under them.
//! Owners register themselves when created and deregister when destroyed;
//! several owners may share one name, in which case invoking the name runs
//! every binding in registration order.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::discover::{discover, DebugCommands, DeclaredCommand};
use crate::config::Settings;
use crate::error::{BindingError, BindingFailure, CommandError};

/// What `register` does with an (owner, method) pair that is already bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Keep the existing binding and skip the new one.
    #[default]
    Ignore,
    /// Append the pair again; it will run once per registration.
    Allow,
}

/// What `invoke` does when a binding fails mid fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Run the remaining bindings and report every failure.
    #[default]
    Continue,
    /// Stop at the first failure.
    Abort,
}

/// Tunables for a [`CommandRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryOptions {
    /// Handling of repeated registrations.
    pub duplicates: DuplicatePolicy,
    /// Handling of failing bindings.
    pub failures: FailurePolicy,
}

type Thunk = Rc<dyn Fn() -> Result<(), BindingError>>;

/// One owner method bound under a command name.
///
/// The owner is held weakly and compared by identity.
#[derive(Clone)]
pub struct Binding {
    owner: Weak<dyn Any>,
    owner_type: TypeId,
    owner_type_name: &'static str,
    method: &'static str,
    call: Thunk,
}

impl Binding {
    fn new<T: DebugCommands>(owner: &Rc<RefCell<T>>, command: DeclaredCommand<T>) -> Self {
        let weak = Rc::downgrade(owner);
        let erased: Weak<dyn Any> = weak.clone();
        let method = command.method();
        let callable = command.into_callable();

        let call: Thunk = Rc::new(move || {
            let owner = weak.upgrade().ok_or(BindingError::OwnerDropped)?;
            let mut guard = owner.try_borrow_mut().map_err(|_| BindingError::OwnerBusy)?;
            let result = callable(&mut *guard);
            result.map_err(BindingError::Failed)
        });

        Self {
            owner: erased,
            owner_type: TypeId::of::<T>(),
            owner_type_name: short_type_name::<T>(),
            method,
            call,
        }
    }

    /// Method identifier within the owner type.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Short name of the owner type.
    pub fn owner_type_name(&self) -> &'static str {
        self.owner_type_name
    }

    /// Whether the owner is still alive.
    pub fn is_live(&self) -> bool {
        self.owner.strong_count() > 0
    }

    /// Whether this binding belongs to `owner`.
    pub fn is_bound_to<T: 'static>(&self, owner: &Rc<RefCell<T>>) -> bool {
        self.owner_type == TypeId::of::<T>()
            && self.owner.as_ptr() as *const () == Rc::as_ptr(owner) as *const ()
    }

    fn run(&self) -> Result<(), BindingError> {
        (self.call)()
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("owner", &self.owner_type_name)
            .field("method", &self.method)
            .field("live", &self.is_live())
            .finish()
    }
}

/// A command name and the bindings registered under it.
#[derive(Debug, Clone)]
pub struct CommandEntry {
    /// The command name.
    pub name: String,
    /// Bindings in registration order.
    pub bindings: Vec<Binding>,
}

/// Read-only snapshot of the registry, in first-registration order.
#[derive(Debug, Clone, Default)]
pub struct CommandListing {
    entries: Vec<CommandEntry>,
}

impl CommandListing {
    /// Bindings registered under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&[Binding]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.bindings.as_slice())
    }

    /// Command names in order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Iterate over entries.
    pub fn iter(&self) -> std::slice::Iter<'_, CommandEntry> {
        self.entries.iter()
    }

    /// Number of command names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a CommandListing {
    type Item = &'a CommandEntry;
    type IntoIter = std::slice::Iter<'a, CommandEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Outcome of a fully successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeReport {
    /// The invoked command name.
    pub name: String,
    /// Number of bindings that ran.
    pub invoked: usize,
}

/// Command entries in the order their names were first registered.
#[derive(Default)]
struct CommandTable {
    entries: Vec<CommandEntry>,
}

impl CommandTable {
    fn bindings(&self, name: &str) -> Option<&[Binding]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.bindings.as_slice())
    }

    fn insert(&mut self, name: String, binding: Binding, duplicates: DuplicatePolicy) -> bool {
        let entry = match self.entries.iter().position(|e| e.name == name) {
            Some(idx) => &mut self.entries[idx],
            None => {
                self.entries.push(CommandEntry {
                    name,
                    bindings: Vec::new(),
                });
                let last = self.entries.len() - 1;
                &mut self.entries[last]
            }
        };

        if duplicates == DuplicatePolicy::Ignore
            && entry.bindings.iter().any(|b| same_binding(b, &binding))
        {
            return false;
        }

        entry.bindings.push(binding);
        true
    }

    /// Remove the first binding under `name` accepted by `matches`.
    fn remove_first(&mut self, name: &str, matches: impl Fn(&Binding) -> bool) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) else {
            return false;
        };
        match entry.bindings.iter().position(matches) {
            Some(idx) => {
                entry.bindings.remove(idx);
                true
            }
            None => false,
        }
    }

    fn retain_live(&mut self) -> usize {
        let mut removed = 0;
        for entry in &mut self.entries {
            let before = entry.bindings.len();
            entry.bindings.retain(Binding::is_live);
            removed += before - entry.bindings.len();
        }
        removed
    }

    fn prune(&mut self) {
        self.entries.retain(|e| !e.bindings.is_empty());
    }

    fn binding_count(&self) -> usize {
        self.entries.iter().map(|e| e.bindings.len()).sum()
    }
}

fn same_binding(a: &Binding, b: &Binding) -> bool {
    a.owner_type == b.owner_type
        && a.method == b.method
        && a.owner.as_ptr() as *const () == b.owner.as_ptr() as *const ()
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Registry of debug commands for one thread.
///
/// Every method takes `&self`; the mapping lives behind a `RefCell` that is
/// only borrowed for the duration of each call. [`invoke`](Self::invoke)
/// runs bindings from a snapshot, so a command may register or deregister
/// owners while it runs.
pub struct CommandRegistry {
    table: Option<RefCell<CommandTable>>,
    options: RegistryOptions,
}

impl CommandRegistry {
    /// Create a registry with default options.
    ///
    /// Without the `debug-menu` feature this is the disabled registry.
    pub fn new() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    /// Create a registry with the given options.
    pub fn with_options(options: RegistryOptions) -> Self {
        let table = if cfg!(feature = "debug-menu") {
            Some(RefCell::new(CommandTable::default()))
        } else {
            None
        };
        Self { table, options }
    }

    /// Create the no-op registry.
    ///
    /// Registration and deregistration do nothing, the listing is always
    /// empty and every invocation returns [`CommandError::Disabled`].
    pub fn disabled() -> Self {
        Self {
            table: None,
            options: RegistryOptions::default(),
        }
    }

    /// Create a registry as described by the loaded settings.
    pub fn from_settings(settings: &Settings) -> Self {
        if settings.enabled {
            Self::with_options(settings.registry_options())
        } else {
            debug!("Debug commands disabled by configuration");
            Self::disabled()
        }
    }

    /// Whether this registry records anything.
    pub fn is_enabled(&self) -> bool {
        self.table.is_some()
    }

    /// The options this registry was built with.
    pub fn options(&self) -> RegistryOptions {
        self.options
    }

    /// Bind every command declared by `T` to `owner`.
    ///
    /// Returns the number of bindings added.
    pub fn register<T: DebugCommands>(&self, owner: &Rc<RefCell<T>>) -> usize {
        let Some(table) = &self.table else {
            return 0;
        };

        let mut table = table.borrow_mut();
        let mut added = 0;
        for command in discover::<T>() {
            let name = command.name().to_string();
            let method = command.method();
            if table.insert(name, Binding::new(owner, command), self.options.duplicates) {
                added += 1;
            } else {
                trace!(
                    owner = short_type_name::<T>(),
                    method,
                    "Skipping already registered binding"
                );
            }
        }

        debug!(owner = short_type_name::<T>(), added, "Registered debug commands");
        added
    }

    /// Remove the bindings `register` created for `owner`.
    ///
    /// Pairs that are not registered are ignored. Returns the number of
    /// bindings removed.
    pub fn deregister<T: DebugCommands>(&self, owner: &Rc<RefCell<T>>) -> usize {
        let Some(table) = &self.table else {
            return 0;
        };

        let mut table = table.borrow_mut();
        let mut removed = 0;
        for command in discover::<T>() {
            let method = command.method();
            if table.remove_first(command.name(), |b| b.method == method && b.is_bound_to(owner)) {
                removed += 1;
            }
        }
        table.prune();

        debug!(owner = short_type_name::<T>(), removed, "Deregistered debug commands");
        removed
    }

    /// Drop bindings whose owner was destroyed without deregistering.
    pub fn purge_dropped(&self) -> usize {
        let Some(table) = &self.table else {
            return 0;
        };

        let mut table = table.borrow_mut();
        let removed = table.retain_live();
        table.prune();

        if removed > 0 {
            debug!(removed, "Purged bindings of dropped owners");
        }
        removed
    }

    /// Snapshot of every command name and its bindings.
    pub fn list(&self) -> CommandListing {
        match &self.table {
            Some(table) => CommandListing {
                entries: table.borrow().entries.clone(),
            },
            None => CommandListing::default(),
        }
    }

    /// Whether `name` has at least one binding.
    pub fn contains(&self, name: &str) -> bool {
        self.table
            .as_ref()
            .is_some_and(|t| t.borrow().bindings(name).is_some())
    }

    /// Number of command names.
    pub fn len(&self) -> usize {
        self.table.as_ref().map_or(0, |t| t.borrow().entries.len())
    }

    /// Whether no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of bindings across all names.
    pub fn binding_count(&self) -> usize {
        self.table.as_ref().map_or(0, |t| t.borrow().binding_count())
    }

    /// Run every binding registered under `name`, in registration order.
    ///
    /// # Errors
    ///
    /// - [`CommandError::Disabled`] for the no-op registry.
    /// - [`CommandError::UnknownCommand`] if nothing is bound to `name`.
    /// - [`CommandError::FanOut`] if any binding failed. Under
    ///   [`FailurePolicy::Continue`] the remaining bindings still ran.
    ///
    /// A panicking command is not caught and unwinds through this call,
    /// skipping the bindings after it.
    pub fn invoke(&self, name: &str) -> Result<InvokeReport, CommandError> {
        let table = self.table.as_ref().ok_or(CommandError::Disabled)?;
        let bindings = table.borrow().bindings(name).map(<[Binding]>::to_vec);
        let bindings = bindings.ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;

        let mut invoked = 0;
        let mut failures = Vec::new();
        for binding in &bindings {
            trace!(
                command = name,
                owner = binding.owner_type_name,
                method = binding.method,
                "Invoking binding"
            );
            match binding.run() {
                Ok(()) => invoked += 1,
                Err(error) => {
                    warn!(
                        command = name,
                        owner = binding.owner_type_name,
                        method = binding.method,
                        error = %error,
                        "Debug command failed"
                    );
                    failures.push(BindingFailure {
                        owner: binding.owner_type_name,
                        method: binding.method,
                        error,
                    });
                    if self.options.failures == FailurePolicy::Abort {
                        break;
                    }
                }
            }
        }

        if failures.is_empty() {
            debug!(command = name, invoked, "Invoked debug command");
            return Ok(InvokeReport {
                name: name.to_string(),
                invoked,
            });
        }

        let skipped = bindings.len() - invoked - failures.len();
        Err(CommandError::FanOut {
            name: name.to_string(),
            invoked,
            skipped,
            failures,
        })
    }

    /// Register `owner` and keep it registered until the returned guard drops.
    pub fn attach<T: DebugCommands>(self: &Rc<Self>, owner: Rc<RefCell<T>>) -> Registration<T> {
        self.register(&owner);
        Registration {
            registry: Rc::downgrade(self),
            owner,
        }
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("enabled", &self.is_enabled())
            .field("commands", &self.len())
            .field("bindings", &self.binding_count())
            .field("options", &self.options)
            .finish()
    }
}

/// Keeps an owner registered for as long as it lives.
///
/// Dropping the guard deregisters the owner. If the registry is already
/// gone the drop does nothing.
pub struct Registration<T: DebugCommands> {
    registry: Weak<CommandRegistry>,
    owner: Rc<RefCell<T>>,
}

impl<T: DebugCommands> Registration<T> {
    /// The registered owner.
    pub fn owner(&self) -> &Rc<RefCell<T>> {
        &self.owner
    }
}

impl<T: DebugCommands> Drop for Registration<T> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.deregister(&self.owner);
        }
    }
}

#[cfg(test)]
#[cfg_attr(not(feature = "debug-menu"), allow(dead_code, unused_imports))]
mod tests {
    use std::panic::{self, AssertUnwindSafe};

    use super::*;
    use crate::commands::CommandSet;
    use crate::debug_commands;

    type CallLog = Rc<RefCell<Vec<String>>>;

    struct Player {
        id: &'static str,
        calls: CallLog,
        broken: bool,
    }

    impl Player {
        fn shared(id: &'static str, calls: &CallLog) -> Rc<RefCell<Self>> {
            Rc::new(RefCell::new(Self {
                id,
                calls: Rc::clone(calls),
                broken: false,
            }))
        }

        fn heal(&mut self) -> anyhow::Result<()> {
            if self.broken {
                anyhow::bail!("{} cannot heal", self.id);
            }
            self.calls.borrow_mut().push(format!("{}.heal", self.id));
            Ok(())
        }

        fn jump(&mut self) {
            self.calls.borrow_mut().push(format!("{}.jump", self.id));
        }
    }

    debug_commands!(Player {
        "Heal" => heal,
        "Jump" => jump,
    });

    struct Medic {
        calls: CallLog,
    }

    impl Medic {
        fn heal(&mut self) {
            self.calls.borrow_mut().push("medic.heal".to_string());
        }
    }

    debug_commands!(Medic {
        "Heal" => heal,
    });

    struct Crate;

    impl DebugCommands for Crate {
        fn describe_commands(_commands: &mut CommandSet<Self>) {}
    }

    fn enabled() -> CommandRegistry {
        CommandRegistry::with_options(RegistryOptions::default())
    }

    fn log() -> CallLog {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn shape(registry: &CommandRegistry) -> Vec<(String, Vec<&'static str>)> {
        registry
            .list()
            .iter()
            .map(|e| (e.name.clone(), e.bindings.iter().map(|b| b.method()).collect()))
            .collect()
    }

    #[cfg(feature = "debug-menu")]
    #[test]
    fn test_register_creates_names() {
        let registry = enabled();
        let calls = log();
        let player = Player::shared("p1", &calls);

        assert_eq!(registry.register(&player), 2);
        assert_eq!(registry.list().names(), vec!["Heal", "Jump"]);
        assert_eq!(registry.binding_count(), 2);
        assert!(registry.contains("Heal"));
        assert!(!registry.contains("heal"));
    }

    #[cfg(feature = "debug-menu")]
    #[test]
    fn test_register_owner_without_commands() {
        let registry = enabled();
        let owner = Rc::new(RefCell::new(Crate));

        assert_eq!(registry.register(&owner), 0);
        assert!(registry.is_empty());
    }

    #[cfg(feature = "debug-menu")]
    #[test]
    fn test_register_then_deregister_restores_state() {
        let registry = enabled();
        let calls = log();
        let p1 = Player::shared("p1", &calls);
        let medic = Rc::new(RefCell::new(Medic {
            calls: Rc::clone(&calls),
        }));
        registry.register(&medic);
        let before = shape(&registry);

        registry.register(&p1);
        assert_eq!(registry.deregister(&p1), 2);

        assert_eq!(shape(&registry), before);
    }

    #[cfg(feature = "debug-menu")]
    #[test]
    fn test_fan_out_runs_every_owner_in_order() {
        let registry = enabled();
        let calls = log();
        let a = Player::shared("a", &calls);
        let b = Player::shared("b", &calls);
        registry.register(&a);
        registry.register(&b);

        let report = registry.invoke("Heal").unwrap();

        assert_eq!(report.invoked, 2);
        assert_eq!(*calls.borrow(), vec!["a.heal", "b.heal"]);
    }

    #[cfg(feature = "debug-menu")]
    #[test]
    fn test_order_preserved_across_types() {
        let registry = enabled();
        let calls = log();
        let a = Player::shared("a", &calls);
        let medic = Rc::new(RefCell::new(Medic {
            calls: Rc::clone(&calls),
        }));
        let c = Player::shared("c", &calls);
        registry.register(&a);
        registry.register(&medic);
        registry.register(&c);

        let listing = registry.list();
        let heal = listing.get("Heal").unwrap();
        assert!(heal[0].is_bound_to(&a));
        assert!(heal[1].is_bound_to(&medic));
        assert!(heal[2].is_bound_to(&c));
        assert_eq!(heal[1].owner_type_name(), "Medic");

        registry.invoke("Heal").unwrap();
        assert_eq!(*calls.borrow(), vec!["a.heal", "medic.heal", "c.heal"]);
    }

    #[cfg(feature = "debug-menu")]
    #[test]
    fn test_pruning_after_sole_owner_leaves() {
        let registry = enabled();
        let calls = log();
        let player = Player::shared("p1", &calls);
        let medic = Rc::new(RefCell::new(Medic {
            calls: Rc::clone(&calls),
        }));
        registry.register(&player);
        registry.register(&medic);

        registry.deregister(&player);

        assert_eq!(registry.list().names(), vec!["Heal"]);
        assert!(registry.list().get("Jump").is_none());
        assert!(matches!(
            registry.invoke("Jump"),
            Err(CommandError::UnknownCommand(name)) if name == "Jump"
        ));
    }

    #[cfg(feature = "debug-menu")]
    #[test]
    fn test_deregister_unknown_owner_is_noop() {
        let registry = enabled();
        let calls = log();
        let registered = Player::shared("p1", &calls);
        let stranger = Player::shared("p2", &calls);
        registry.register(&registered);
        let before = shape(&registry);

        assert_eq!(registry.deregister(&stranger), 0);
        assert_eq!(shape(&registry), before);
        assert!(registry.list().get("Heal").unwrap()[0].is_bound_to(&registered));
    }

    #[cfg(feature = "debug-menu")]
    #[test]
    fn test_reregister_ignored_by_default() {
        let registry = enabled();
        let calls = log();
        let player = Player::shared("p1", &calls);

        assert_eq!(registry.register(&player), 2);
        assert_eq!(registry.register(&player), 0);
        registry.invoke("Heal").unwrap();

        assert_eq!(*calls.borrow(), vec!["p1.heal"]);
    }

    #[cfg(feature = "debug-menu")]
    #[test]
    fn test_reregister_duplicates_when_allowed() {
        let registry = CommandRegistry::with_options(RegistryOptions {
            duplicates: DuplicatePolicy::Allow,
            ..RegistryOptions::default()
        });
        let calls = log();
        let player = Player::shared("p1", &calls);

        registry.register(&player);
        registry.register(&player);
        let report = registry.invoke("Heal").unwrap();
        assert_eq!(report.invoked, 2);

        // One deregister removes one copy of each pair.
        registry.deregister(&player);
        assert_eq!(registry.list().get("Heal").unwrap().len(), 1);
        registry.deregister(&player);
        assert!(registry.is_empty());
    }

    #[cfg(feature = "debug-menu")]
    #[test]
    fn test_failure_isolated_by_default() {
        let registry = enabled();
        let calls = log();
        let a = Player::shared("a", &calls);
        let b = Player::shared("b", &calls);
        a.borrow_mut().broken = true;
        registry.register(&a);
        registry.register(&b);

        let err = registry.invoke("Heal").unwrap_err();

        match err {
            CommandError::FanOut {
                invoked,
                skipped,
                failures,
                ..
            } => {
                assert_eq!(invoked, 1);
                assert_eq!(skipped, 0);
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].owner, "Player");
                assert!(failures[0].to_string().contains("a cannot heal"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(*calls.borrow(), vec!["b.heal"]);
    }

    #[cfg(feature = "debug-menu")]
    #[test]
    fn test_failure_aborts_when_configured() {
        let registry = CommandRegistry::with_options(RegistryOptions {
            failures: FailurePolicy::Abort,
            ..RegistryOptions::default()
        });
        let calls = log();
        let a = Player::shared("a", &calls);
        let b = Player::shared("b", &calls);
        a.borrow_mut().broken = true;
        registry.register(&a);
        registry.register(&b);

        let err = registry.invoke("Heal").unwrap_err();

        assert!(matches!(
            err,
            CommandError::FanOut {
                invoked: 0,
                skipped: 1,
                ..
            }
        ));
        assert!(calls.borrow().is_empty());
    }

    #[cfg(feature = "debug-menu")]
    #[test]
    fn test_dropped_owner_reported_and_purged() {
        let registry = enabled();
        let calls = log();
        let kept = Player::shared("kept", &calls);
        let gone = Player::shared("gone", &calls);
        registry.register(&gone);
        registry.register(&kept);
        drop(gone);

        let err = registry.invoke("Jump").unwrap_err();
        match err {
            CommandError::FanOut { failures, .. } => {
                assert!(matches!(failures[0].error, BindingError::OwnerDropped));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(*calls.borrow(), vec!["kept.jump"]);

        assert_eq!(registry.purge_dropped(), 2);
        assert_eq!(registry.binding_count(), 2);
        assert!(registry.invoke("Jump").is_ok());
    }

    #[cfg(feature = "debug-menu")]
    #[test]
    fn test_busy_owner_reported() {
        let registry = enabled();
        let calls = log();
        let player = Player::shared("p1", &calls);
        registry.register(&player);

        let _held = player.borrow_mut();
        let err = registry.invoke("Jump").unwrap_err();

        match err {
            CommandError::FanOut { failures, .. } => {
                assert!(matches!(failures[0].error, BindingError::OwnerBusy));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(feature = "debug-menu")]
    #[test]
    fn test_registration_guard_deregisters_on_drop() {
        let registry = Rc::new(enabled());
        let calls = log();

        let guard = registry.attach(Player::shared("p1", &calls));
        assert_eq!(registry.len(), 2);
        assert!(registry.list().get("Heal").unwrap()[0].is_bound_to(guard.owner()));

        drop(guard);
        assert!(registry.is_empty());
    }

    #[cfg(feature = "debug-menu")]
    #[test]
    fn test_registration_guard_outlives_registry() {
        let registry = Rc::new(enabled());
        let calls = log();
        let guard = registry.attach(Player::shared("p1", &calls));

        drop(registry);
        drop(guard);
    }

    #[test]
    fn test_disabled_registry_is_noop() {
        let registry = CommandRegistry::disabled();
        let calls = log();
        let player = Player::shared("p1", &calls);

        assert!(!registry.is_enabled());
        assert_eq!(registry.register(&player), 0);
        assert!(registry.list().is_empty());
        assert_eq!(registry.deregister(&player), 0);
        assert_eq!(registry.purge_dropped(), 0);
        assert!(matches!(registry.invoke("Heal"), Err(CommandError::Disabled)));
    }

    #[test]
    fn test_from_settings_respects_enabled_flag() {
        let mut settings = Settings::default();
        settings.enabled = false;
        assert!(!CommandRegistry::from_settings(&settings).is_enabled());

        settings.enabled = true;
        settings.failures = FailurePolicy::Abort;
        let registry = CommandRegistry::from_settings(&settings);
        assert_eq!(registry.is_enabled(), cfg!(feature = "debug-menu"));
        assert_eq!(registry.options().failures, FailurePolicy::Abort);
    }

    struct Bomb;

    impl Bomb {
        fn explode(&mut self) {
            panic!("bomb went off");
        }
    }

    debug_commands!(Bomb {
        "Jump" => explode,
    });

    #[cfg(feature = "debug-menu")]
    #[test]
    fn test_panicking_command_unwinds_and_registry_stays_usable() {
        let registry = enabled();
        let calls = log();
        let bomb = Rc::new(RefCell::new(Bomb));
        let after = Player::shared("after", &calls);
        registry.register(&bomb);
        registry.register(&after);

        let result = panic::catch_unwind(AssertUnwindSafe(|| registry.invoke("Jump")));

        assert!(result.is_err());
        assert!(calls.borrow().is_empty());
        assert!(bomb.try_borrow_mut().is_ok());

        assert_eq!(registry.deregister(&bomb), 1);
        let report = registry.invoke("Jump").unwrap();
        assert_eq!(report.invoked, 1);
        assert_eq!(*calls.borrow(), vec!["after.jump"]);
    }

    #[cfg(not(feature = "debug-menu"))]
    #[test]
    fn test_registry_compiled_out_without_feature() {
        let registry = CommandRegistry::new();
        let calls = log();
        let player = Player::shared("p1", &calls);

        assert!(!registry.is_enabled());
        assert_eq!(registry.register(&player), 0);
        assert!(registry.list().is_empty());
        assert_eq!(registry.deregister(&player), 0);
        assert!(matches!(registry.invoke("Heal"), Err(CommandError::Disabled)));

        let settings = Settings {
            enabled: true,
            ..Settings::default()
        };
        assert!(!CommandRegistry::from_settings(&settings).is_enabled());
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<Player>(), "Player");
        assert_eq!(short_type_name::<Vec<Player>>(), "Vec");
    }

    #[test]
    fn test_policy_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            duplicates: DuplicatePolicy,
            failures: FailurePolicy,
        }

        let parsed: Wrapper = toml::from_str("duplicates = \"allow\"\nfailures = \"abort\"").unwrap();
        assert_eq!(parsed.duplicates, DuplicatePolicy::Allow);
        assert_eq!(parsed.failures, FailurePolicy::Abort);
    }
}
