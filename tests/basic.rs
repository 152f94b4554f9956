use std::sync::{Arc, Mutex};

use bottle::{Bottle, BottleError, Container, Provider, Providers};

struct Water;

struct Barley {
    water: Arc<Water>,
}

struct Hops {
    water: Arc<Water>,
}

struct Beer {
    name: String,
    barley: Arc<Barley>,
    hops: Arc<Hops>,
    water: Arc<Water>,
}

#[derive(Clone, Default)]
struct Log(Arc<Mutex<Vec<&'static str>>>);

impl Log {
    fn push(&self, name: &'static str) {
        self.0.lock().unwrap().push(name);
    }

    fn take(&self) -> Vec<&'static str> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }

    fn count(&self, name: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|n| **n == name).count()
    }
}

fn providers(log: &Log) -> Providers {
    let (water, barley, hops, beer, now) = (log.clone(), log.clone(), log.clone(), log.clone(), log.clone());
    Providers::new()
        .with(
            "water",
            Provider::from_fn(move |_| {
                water.push("water");
                Water
            }),
        )
        .with(
            "barley",
            Provider::new(move |c| {
                let water = c.get::<Water>("water")?;
                barley.push("barley");
                Ok(Barley { water })
            }),
        )
        .with(
            "hops",
            Provider::new(move |c| {
                let water = c.get::<Water>("water")?;
                hops.push("hops");
                Ok(Hops { water })
            }),
        )
        .with(
            "beer",
            Provider::new(move |c| {
                let barley = c.get::<Barley>("barley")?;
                let hops = c.get::<Hops>("hops")?;
                let water = c.get::<Water>("water")?;
                beer.push("beer");
                Ok(Beer {
                    name: "San Miguel".to_string(),
                    barley,
                    hops,
                    water,
                })
            }),
        )
        .with(
            "now",
            Provider::from_fn(move |_| {
                now.push("now");
                std::time::SystemTime::now()
            }),
        )
}

fn names(bottle: &Bottle) -> Vec<String> {
    bottle.list_built().iter().map(|name| name.to_string()).collect()
}

#[test]
fn test_presence_does_not_instantiate() {
    let log = Log::default();
    let bottle = Bottle::new(providers(&log));

    assert!(bottle.has("beer"));
    assert!(!bottle.has("malt"));
    assert!(names(&bottle).is_empty());
    assert!(log.take().is_empty());

    bottle.get::<Water>("water").unwrap();
    assert_eq!(names(&bottle), vec!["water"]);
    assert_eq!(log.take(), vec!["water"]);
}

#[test]
fn test_unknown_service() {
    let bottle = Bottle::new(providers(&Log::default()));

    let err = bottle.resolve("malt").unwrap_err();
    assert!(matches!(err, BottleError::UnknownService(_)));
    assert_eq!(err.to_string(), "Unknown service \"malt\"");
    assert!(bottle.delete("malt", true));
}

#[test]
fn test_brewery() {
    let log = Log::default();
    let bottle = Bottle::new(providers(&log));

    let beer = bottle.get::<Beer>("beer").unwrap();
    assert_eq!(beer.name, "San Miguel");
    assert_eq!(log.take(), vec!["water", "barley", "hops", "beer"]);

    assert!(Arc::ptr_eq(&beer.water, &beer.barley.water));
    assert!(Arc::ptr_eq(&beer.water, &beer.hops.water));
    assert!(Arc::ptr_eq(&beer, &bottle.get::<Beer>("beer").unwrap()));
    assert!(Arc::ptr_eq(&beer.barley, &bottle.get::<Barley>("barley").unwrap()));
    assert!(log.take().is_empty());

    // hops is gone and so is the beer brewed from it.
    assert!(bottle.remove("hops"));
    assert_eq!(names(&bottle), vec!["water", "barley"]);

    let fresh = bottle.get::<Beer>("beer").unwrap();
    assert_eq!(log.take(), vec!["hops", "beer"]);
    assert!(!Arc::ptr_eq(&beer, &fresh));
    assert!(!Arc::ptr_eq(&beer.hops, &fresh.hops));
    assert!(Arc::ptr_eq(&beer.barley, &fresh.barley));
    assert!(Arc::ptr_eq(&beer.water, &fresh.water));

    assert!(bottle.delete("malt", true));
    assert_eq!(log.count("now"), 0);
}

#[test]
fn test_shallow_delete_keeps_dependents() {
    let log = Log::default();
    let bottle = Bottle::new(providers(&log));

    let beer = bottle.get::<Beer>("beer").unwrap();
    log.take();

    assert!(bottle.delete("hops", false));
    assert_eq!(names(&bottle), vec!["water", "barley", "beer"]);
    assert!(Arc::ptr_eq(&beer, &bottle.get::<Beer>("beer").unwrap()));
    assert!(log.take().is_empty());

    let hops = bottle.get::<Hops>("hops").unwrap();
    assert_eq!(log.take(), vec!["hops"]);
    assert!(!Arc::ptr_eq(&hops, &beer.hops));
}

#[test]
fn test_deleting_the_root_dependency_empties_the_bottle() {
    let log = Log::default();
    let bottle = Bottle::new(providers(&log));

    bottle.get::<Beer>("beer").unwrap();
    bottle.get::<std::time::SystemTime>("now").unwrap();
    log.take();

    assert!(bottle.remove("water"));
    assert_eq!(names(&bottle), vec!["now"]);

    bottle.get::<Beer>("beer").unwrap();
    assert_eq!(log.take(), vec!["water", "barley", "hops", "beer"]);
}
