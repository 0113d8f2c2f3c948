#[derive(nsioc::Autowire)]
struct Handler {
    #[ioc(autowire)]
    service: u32,
}

fn main() {
    let handler = Handler { service: 0 };
    let _ = handler.service;
}
