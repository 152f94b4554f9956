use std::sync::Arc;
use std::time::SystemTime;

use bottle::{service_factory, Bottle, Container, Provider, Providers};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct Water;

struct Barley {
    #[allow(dead_code)]
    water: Arc<Water>,
}

struct Hops {
    #[allow(dead_code)]
    water: Arc<Water>,
}

struct Beer {
    name: String,
    #[allow(dead_code)]
    barley: Arc<Barley>,
    #[allow(dead_code)]
    hops: Arc<Hops>,
    water: Arc<Water>,
}

impl Beer {
    fn brew(barley: Arc<Barley>, hops: Arc<Hops>, water: Arc<Water>) -> Self {
        Beer {
            name: "San Miguel".to_string(),
            barley,
            hops,
            water,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "bottle=debug".to_string());
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let some_bottle = Bottle::new(
        Providers::new()
            .with("barley", service_factory(|water| Barley { water }, ["water"]))
            .with("hops", service_factory(|water| Hops { water }, ["water"]))
            .with("water", Provider::from_fn(|_| Water)),
    );

    let other_bottle = Bottle::with_ancestor(
        Providers::new()
            .with("now", Provider::from_fn(|_| SystemTime::now))
            .with("beer", service_factory(Beer::brew, ["barley", "hops", "water"])),
        some_bottle.clone(),
    );

    let beer = other_bottle.get::<Beer>("beer")?;
    println!("{}", beer.name);

    let water = some_bottle.get::<Water>("water")?;
    println!("{}", Arc::ptr_eq(&water, &beer.water));

    println!("built: {:?}", other_bottle.list_built());
    Ok(())
}
