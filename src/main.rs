//! Scripted demo session against an in-memory store.
//!
//! `PET_DATA_DIR` points at a directory with `species.ron`/`shop.ron` (the
//! bundled catalog is used otherwise), `PET_CONFIG` at an engine RON file,
//! `PET_SEED` fixes the dice and `PET_SNAPSHOT` saves the store as JSON at the end.

use chrono::{Duration, Utc};
use pet_adventure::economy::{format_backpack, format_shop};
use pet_adventure::{
    Catalog, EngineConfig, GameRng, MemoryStore, PetError, PetGame, PetKey, RenderedStatus,
    StatusRenderer, TextStatusCard,
};
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

const DEFAULT_SEED: u64 = 20240601;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        tracing::error!(error = %e, "demo session failed");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let catalog = match std::env::var("PET_DATA_DIR") {
        Ok(dir) => Catalog::load(Path::new(&dir))?,
        Err(_) => Catalog::builtin()?,
    };
    let config = match std::env::var("PET_CONFIG") {
        Ok(path) => EngineConfig::load(Path::new(&path))?,
        Err(_) => EngineConfig::default(),
    };
    let seed = std::env::var("PET_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);
    tracing::info!(seed, species = catalog.all_species().len(), "starting demo session");

    let game = PetGame::new(Arc::new(catalog), config, MemoryStore::new());
    let mut rng = GameRng::from_seed(seed);
    let start = Utc::now();

    let alice = PetKey::new("10001", "group-1");
    let bob = alice.neighbour("10002");

    section("领养宠物");
    for (key, name) in [(&alice, Some("小火".to_string())), (&bob, None)] {
        let pet = reply(game.adopt(key, name, &mut rng, start))?;
        if let Some(pet) = pet {
            let species = game.catalog().species(pet.species).map(|s| s.attribute);
            println!(
                "恭喜你，{}！命运让你邂逅了「{}」({})！",
                key.owner_id,
                pet.name,
                species.map(|a| format!("{}系", a)).unwrap_or_default()
            );
        }
    }

    section("我的宠物");
    if let Some(view) = reply(game.status_view(&alice, "Alice", start))? {
        match TextStatusCard.render(&view) {
            RenderedStatus::Text(card) => println!("{}", card),
            RenderedStatus::Image(path) => println!("[image] {}", path.display()),
        }
    }

    section("散步");
    if let Some(outcome) = reply(game.walk(&alice, &mut rng, start))? {
        print_lines(&outcome.messages());
    }
    // Too soon for another walk.
    reply(game.walk(&alice, &mut rng, start + Duration::minutes(1)))?;

    section("商店");
    print!("{}", format_shop(game.shop_listing()));
    if let Some(purchase) = reply(game.purchase(&alice, "普通口粮", 2))? {
        println!("{}", purchase);
    }
    reply(game.purchase(&alice, "美味罐头", 10))?;

    section("投喂");
    let fed_at = start + Duration::minutes(10);
    if let Some(feeding) = reply(game.consume(&alice, "普通口粮", fed_at))? {
        println!("{}", feeding);
    }
    if let Some(entries) = reply(game.backpack(&alice, fed_at))? {
        print!("{}", format_backpack("Alice", &entries));
    }

    section("对决");
    let duel_at = start + Duration::minutes(20);
    if let Some(outcome) = reply(game.duel(&alice, &bob, &mut rng, duel_at))? {
        print_lines(&outcome.messages());
    }
    reply(game.duel(&bob, &alice, &mut rng, duel_at + Duration::minutes(5)))?;

    section("进化");
    reply(game.evolve(&alice, &mut rng, duel_at))?;

    section("三小时后");
    if let Some(observation) = reply(game.status(&bob, start + Duration::hours(3)))? {
        if let Some(decay) = observation.decay {
            println!(
                "过去了 {} 小时，「{}」的饱食度下降了 {}，心情值下降了 {}。",
                decay.hours, observation.record.name, decay.satiety_lost, decay.mood_lost
            );
        }
    }

    if let Ok(path) = std::env::var("PET_SNAPSHOT") {
        game.store().save_snapshot(Path::new(&path))?;
    }
    Ok(())
}

/// Prints a user-facing rejection and carries on; anything else aborts the session.
fn reply<T>(result: Result<T, PetError>) -> Result<Option<T>, PetError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_user_facing() => {
            println!("{}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn section(title: &str) {
    println!("\n=== {} ===", title);
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
