use std::sync::Arc;

use nsioc::prelude::*;

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

trait Named: Send + Sync {
    fn label(&self) -> &'static str;
}

#[derive(Autowire)]
#[ioc(provides(dyn Clock, dyn Named))]
struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        42
    }
}

impl Named for FixedClock {
    fn label(&self) -> &'static str {
        "fixed"
    }
}

impl Object for FixedClock {
    fn name(&self) -> &str {
        "clock"
    }
}

fn main() {
    let container = Container::new();
    container.default_namespace().registry(FixedClock).unwrap();

    let clock: Arc<dyn Clock> = container.require("default", "clock").unwrap();
    assert_eq!(clock.now(), 42);
    let named: Arc<dyn Named> = container.require("default", "clock").unwrap();
    assert_eq!(named.label(), "fixed");
    let concrete: Arc<FixedClock> = container.require("default", "clock").unwrap();
    assert_eq!(concrete.now(), 42);
}
