//! embedded-hal mocks recording every bus event into one shared log

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use embedded_hal::blocking::{delay::DelayUs, spi::Write};
use embedded_hal::digital::v2::OutputPin;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Event {
    Word(u32),
    Ce(bool),
    Le(bool),
    Delay(u32),
}

pub type Log = Rc<RefCell<Vec<Event>>>;

pub struct Spi {
    log: Log,
    fail: Rc<Cell<bool>>,
    /// Words still accepted before the bus starts failing
    fail_after: Rc<Cell<Option<usize>>>,
}

impl Write<u8> for Spi {
    type Error = ();

    fn write(&mut self, words: &[u8]) -> Result<(), ()> {
        if self.fail.get() {
            return Err(());
        }
        match self.fail_after.get() {
            Some(0) => return Err(()),
            Some(n) => self.fail_after.set(Some(n - 1)),
            None => {}
        }
        assert_eq!(words.len(), 4);
        let w = u32::from_be_bytes([words[0], words[1], words[2], words[3]]);
        self.log.borrow_mut().push(Event::Word(w));
        Ok(())
    }
}

pub struct Pin {
    log: Log,
    event: fn(bool) -> Event,
    fail: Rc<Cell<bool>>,
}

impl OutputPin for Pin {
    type Error = ();

    fn set_low(&mut self) -> Result<(), ()> {
        if self.fail.get() {
            return Err(());
        }
        self.log.borrow_mut().push((self.event)(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), ()> {
        if self.fail.get() {
            return Err(());
        }
        self.log.borrow_mut().push((self.event)(true));
        Ok(())
    }
}

pub struct Delay {
    log: Log,
}

impl DelayUs<u32> for Delay {
    fn delay_us(&mut self, us: u32) {
        self.log.borrow_mut().push(Event::Delay(us));
    }
}

pub struct Bus {
    pub log: Log,
    pub fail: Rc<Cell<bool>>,
    pub fail_after: Rc<Cell<Option<usize>>>,
    pub ce_fail: Rc<Cell<bool>>,
    pub le_fail: Rc<Cell<bool>>,
}

impl Bus {
    pub fn new() -> (Bus, Spi, Pin, Pin, Delay) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let fail = Rc::new(Cell::new(false));
        let fail_after = Rc::new(Cell::new(None));
        let ce_fail = Rc::new(Cell::new(false));
        let le_fail = Rc::new(Cell::new(false));
        let spi = Spi { log: log.clone(), fail: fail.clone(), fail_after: fail_after.clone() };
        let ce = Pin { log: log.clone(), event: Event::Ce, fail: ce_fail.clone() };
        let le = Pin { log: log.clone(), event: Event::Le, fail: le_fail.clone() };
        let delay = Delay { log: log.clone() };
        (Bus { log, fail, fail_after, ce_fail, le_fail }, spi, ce, le, delay)
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.borrow().clone()
    }

    pub fn words(&self) -> Vec<u32> {
        self.log
            .borrow()
            .iter()
            .filter_map(|e| match e { Event::Word(w) => Some(*w), _ => None })
            .collect()
    }

    pub fn addrs(&self) -> Vec<u8> {
        self.words().iter().map(|w| (w & 0xF) as u8).collect()
    }
}
