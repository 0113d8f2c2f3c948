#[derive(nsioc::Autowire)]
struct Handler {
    #[ioc("autowire=true;name=first")]
    #[ioc("autowire=true;name=second")]
    service: u32,
}

fn main() {
    let handler = Handler { service: 0 };
    let _ = handler.service;
}
