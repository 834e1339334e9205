//! debugmenu - runtime debug commands behind a toggleable terminal overlay.
//!
//! Owner types declare debug commands with [`debug_commands!`], register
//! their instances with a [`CommandRegistry`](commands::CommandRegistry) and
//! the overlay lists and invokes them on demand. Several owners can share a
//! command name; invoking it runs every binding in registration order.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use debugmenu::commands::CommandRegistry;
//! use debugmenu::debug_commands;
//!
//! struct Counter {
//!     hits: u32,
//! }
//!
//! impl Counter {
//!     fn bump(&mut self) {
//!         self.hits += 1;
//!     }
//! }
//!
//! debug_commands!(Counter { "Bump" => bump });
//!
//! let registry = CommandRegistry::new();
//! let a = Rc::new(RefCell::new(Counter { hits: 0 }));
//! let b = Rc::new(RefCell::new(Counter { hits: 0 }));
//! # if !registry.is_enabled() {
//! #     return;
//! # }
//! registry.register(&a);
//! registry.register(&b);
//!
//! registry.invoke("Bump").unwrap();
//! assert_eq!(a.borrow().hits + b.borrow().hits, 2);
//!
//! registry.deregister(&a);
//! registry.deregister(&b);
//! assert!(registry.list().is_empty());
//! ```

pub mod app;
pub mod commands;
pub mod config;
pub mod demo;
pub mod error;
pub mod events;
pub mod logging;
pub mod ui;

pub use error::{AppError, Result};
