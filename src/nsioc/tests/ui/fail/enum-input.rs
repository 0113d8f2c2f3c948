#[derive(nsioc::Autowire)]
enum Shape {
    Circle,
}

fn main() {
    let _ = Shape::Circle;
}
