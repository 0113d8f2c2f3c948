use std::marker::PhantomData;

use nsioc::prelude::*;

#[derive(Autowire)]
struct Empty {}

#[derive(Autowire)]
struct Unit;

#[derive(Autowire)]
struct Tuple(
    #[ioc("autowire=true;name=unit")] Autowired<Unit>,
    u32,
);

#[derive(Autowire)]
struct Raw {
    #[ioc("autowire=true")]
    r#type: Autowired<Unit>,
    plain: String,
}

#[derive(Autowire)]
struct Generic<T> {
    #[ioc("autowire=true;namespace=api")]
    unit: Autowired<Unit>,
    marker: PhantomData<fn() -> T>,
}

fn main() {
    assert!(Empty {}.inject_points().is_empty());
    assert!(Unit.inject_points().is_empty());

    let tuple = Tuple(Autowired::new(), 7);
    let points = tuple.inject_points();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].field(), "0");
    assert_eq!(points[0].tag(), "autowire=true;name=unit");
    assert_eq!(tuple.1, 7);

    let raw = Raw {
        r#type: Autowired::new(),
        plain: String::new(),
    };
    assert_eq!(raw.inject_points()[0].field(), "type");
    assert!(raw.plain.is_empty());

    let generic = Generic::<u8> {
        unit: Autowired::new(),
        marker: PhantomData,
    };
    assert_eq!(generic.inject_points()[0].field(), "unit");
}
