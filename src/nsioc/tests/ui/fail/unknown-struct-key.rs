#[derive(nsioc::Autowire)]
#[ioc(exposes(dyn std::fmt::Debug))]
struct Clock;

fn main() {
    let _ = Clock;
}
