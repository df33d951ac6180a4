//! Shared helpers for editor service scenario tests.
//!
//! Lives in `helpers/mod.rs` so Cargo does not compile it as a standalone test.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use xtext_web_client::testing::init_logging;
use xtext_web_client::{ServiceOptions, Tester, test_editor};

/// Build a tester for `options`, with logging routed to the harness.
pub fn tester(options: ServiceOptions) -> Tester {
    init_logging();
    test_editor(options).expect("options should configure")
}

/// Shared, growable record for values observed inside callbacks.
pub struct Recorder<T> {
    items: Rc<RefCell<Vec<T>>>,
}

impl<T: Clone + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self {
            items: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// A closure-friendly handle that appends to this record.
    pub fn sink(&self) -> impl Fn(T) + 'static {
        let items = Rc::clone(&self.items);
        move |item| items.borrow_mut().push(item)
    }

    pub fn items(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }
}
