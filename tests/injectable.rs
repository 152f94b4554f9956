use std::sync::Arc;

use bottle::{service, Bottle, Container, Injectable, Provider, Providers};

#[derive(Default)]
struct Water;

#[derive(Injectable)]
struct Hops {
    #[inject]
    water: Arc<Water>,
}

#[derive(Injectable)]
struct Beer {
    #[inject("hops")]
    hops: Arc<Hops>,
    #[inject(name = "water")]
    base: Arc<Water>,
    pours: u32,
}

#[derive(Injectable)]
struct Keg<T> {
    #[inject("beer")]
    beer: Arc<T>,
}

#[derive(Injectable)]
struct Nothing;

fn brewery() -> Arc<Bottle> {
    Bottle::new(
        Providers::new()
            .with("water", Provider::from_fn(|_| Water))
            .with("hops", service::<Hops>())
            .with("beer", service::<Beer>())
            .with("keg", service::<Keg<Beer>>())
            .with("nothing", service::<Nothing>()),
    )
}

#[test]
fn test_derived_fields_are_resolved() {
    let bottle = brewery();

    let beer = bottle.get::<Beer>("beer").unwrap();
    assert_eq!(beer.pours, 0);
    assert!(Arc::ptr_eq(&beer.base, &beer.hops.water));
    assert!(Arc::ptr_eq(&beer.hops, &bottle.get::<Hops>("hops").unwrap()));
}

#[test]
fn test_derived_services_are_tracked() {
    let bottle = brewery();

    let keg = bottle.get::<Keg<Beer>>("keg").unwrap();
    assert!(Arc::ptr_eq(&keg.beer, &bottle.get::<Beer>("beer").unwrap()));

    assert!(bottle.remove("hops"));
    let built: Vec<String> = bottle.list_built().iter().map(|n| n.to_string()).collect();
    assert_eq!(built, vec!["water"]);
}

#[test]
fn test_unit_struct() {
    let bottle = brewery();
    assert!(bottle.get::<Nothing>("nothing").is_ok());
}

#[test]
fn test_inject_by_hand() {
    let bottle = brewery();
    let hops = Hops::inject(&*bottle as &dyn Container).unwrap();
    assert!(Arc::ptr_eq(&hops.water, &bottle.get::<Water>("water").unwrap()));
    // Injecting directly does not cache anything under the struct's name.
    assert_eq!(bottle.list_built().len(), 1);
}
