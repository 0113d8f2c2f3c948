#[derive(nsioc::Autowire)]
#[ioc(provides(String))]
struct Clock;

fn main() {
    let _ = Clock;
}
