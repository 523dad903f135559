//! Memory-mapped I/O dispatch.
//!
//! Grounded on `original_source/controller.py`'s `vmem` dict, which maps
//! individual addresses to a handler object, and `plugins.py`'s
//! `BitmapDisplay.register`, which installs the *same* handler object at
//! every address in a range. The Rust shape keeps that: a handler is
//! reference-counted so one device can own several addresses, and
//! registering over an address already claimed by another device replaces
//! it, matching the Python dict's "last write wins" semantics.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A device addressable from CPU `read`/`write` traffic.
///
/// `read`/`write` take `&mut self` even though most of the bus API exposes
/// shared access, because devices like a pseudo-random source or a keyboard
/// buffer mutate internal state on every access.
pub trait IoHandler {
    fn read(&mut self, address: u16) -> u8;
    fn write(&mut self, address: u16, value: u8);
}

/// Routes reads and writes that fall inside a device's registered address
/// range to that device; everything else reaches plain RAM.
#[derive(Default)]
pub struct IoDispatcher {
    handlers: HashMap<u16, Rc<RefCell<dyn IoHandler>>>,
}

impl IoDispatcher {
    pub fn new() -> IoDispatcher {
        IoDispatcher {
            handlers: HashMap::new(),
        }
    }

    /// Installs `handler` at a single address, replacing whatever (if
    /// anything) was registered there before.
    pub fn register(&mut self, address: u16, handler: Rc<RefCell<dyn IoHandler>>) {
        self.handlers.insert(address, handler);
    }

    /// Installs the same handler across an inclusive address range.
    pub fn register_range(&mut self, start: u16, end: u16, handler: Rc<RefCell<dyn IoHandler>>) {
        for address in start..=end {
            self.handlers.insert(address, Rc::clone(&handler));
        }
    }

    pub fn is_mapped(&self, address: u16) -> bool {
        self.handlers.contains_key(&address)
    }

    pub fn read(&self, address: u16) -> Option<u8> {
        self.handlers
            .get(&address)
            .map(|h| h.borrow_mut().read(address))
    }

    /// Returns `true` if a handler was mapped and took the write.
    pub fn write(&self, address: u16, value: u8) -> bool {
        match self.handlers.get(&address) {
            Some(h) => {
                h.borrow_mut().write(address, value);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(u8);
    impl IoHandler for Counter {
        fn read(&mut self, _address: u16) -> u8 {
            self.0 += 1;
            self.0
        }
        fn write(&mut self, _address: u16, value: u8) {
            self.0 = value;
        }
    }

    #[test]
    fn unmapped_addresses_pass_through() {
        let dispatcher = IoDispatcher::new();
        assert!(!dispatcher.is_mapped(0x2000));
        assert_eq!(dispatcher.read(0x2000), None);
        assert!(!dispatcher.write(0x2000, 1));
    }

    #[test]
    fn a_single_handler_can_own_a_range() {
        let mut dispatcher = IoDispatcher::new();
        let handler = Rc::new(RefCell::new(Counter(0)));
        dispatcher.register_range(0x4000, 0x4003, handler.clone());

        dispatcher.write(0x4001, 9);
        assert_eq!(handler.borrow().0, 9);
        assert_eq!(dispatcher.read(0x4002), Some(10));
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let mut dispatcher = IoDispatcher::new();
        dispatcher.register(0x5000, Rc::new(RefCell::new(Counter(1))));
        dispatcher.register(0x5000, Rc::new(RefCell::new(Counter(100))));
        assert_eq!(dispatcher.read(0x5000), Some(101));
    }
}
