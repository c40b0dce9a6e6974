//! hkgi Headless Simulation Harness
//!
//! Validates the game logic, content and engine end to end.
//! Runs entirely in-process: no server, no save files, no networking.
//!
//! Usage:
//!   cargo run -p hkgi-simtest
//!   cargo run -p hkgi-simtest -- --verbose

use std::collections::BTreeMap;

use hkgi_core::persistence::{load, save};
use hkgi_core::prelude::*;
use hkgi_logic::config::DEFAULT_LEVEL_CURVE;
use hkgi_logic::inventory::Inventory;
use hkgi_logic::leveling::{level_from_xp, xp_per_yield_cycle};
use hkgi_logic::manifest::{MakeItem, UseEffect};
use hkgi_logic::recipes::pick_weighted;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== hkgi Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Manifest content
    results.extend(validate_manifest(verbose));

    // 2. Leveling curve
    results.extend(validate_leveling(verbose));

    // 3. Inventory ledger
    results.extend(validate_ledger(verbose));

    // 4. Weighted outcomes
    results.extend(validate_weighted_outcomes(verbose));

    // 5. Growth & yields
    results.extend(validate_growth(verbose));

    // 6. Multi-user session
    results.extend(validate_session(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

fn new_engine() -> Option<Engine> {
    let manifest = Manifest::bundled().ok()?;
    Engine::new(EngineConfig::default(), manifest).ok()
}

// ── 1. Manifest ─────────────────────────────────────────────────────────

fn validate_manifest(verbose: bool) -> Vec<TestResult> {
    println!("--- Manifest ---");
    let mut results = Vec::new();

    let manifest = match Manifest::bundled() {
        Ok(m) => m,
        Err(e) => {
            results.push(check("manifest_parse", false, format!("{}", e)));
            return results;
        }
    };
    results.push(check(
        "manifest_parse",
        true,
        format!(
            "{} items, {} plant kinds with recipes",
            manifest.items.len(),
            manifest.plant_recipes.len()
        ),
    ));

    // Every plant kind has a title and recipes
    let missing: Vec<String> = PlantKind::ALL
        .iter()
        .filter(|k| !manifest.plant_titles.contains_key(*k) || manifest.recipes(**k).is_empty())
        .map(|k| k.to_string())
        .collect();
    results.push(check(
        "manifest_plants_complete",
        missing.is_empty(),
        if missing.is_empty() {
            "every plant kind has a title and recipes".into()
        } else {
            format!("incomplete: {}", missing.join(", "))
        },
    ));

    // Every item a recipe or effect mentions is defined
    let mut referenced: Vec<ItemKind> = Vec::new();
    for recipes in manifest.plant_recipes.values() {
        for recipe in recipes {
            referenced.extend(recipe.needs.keys().copied());
            match &recipe.make_item {
                Some(MakeItem::Item(item)) => referenced.push(*item),
                Some(MakeItem::OneOf { one_of }) => {
                    referenced.extend(one_of.iter().map(|(_, item)| *item))
                }
                None => {}
            }
        }
    }
    for def in manifest.items.values() {
        match &def.on_use {
            Some(UseEffect::Grant(items)) => referenced.extend(items.keys().copied()),
            Some(UseEffect::Roll { candidates, .. }) => {
                referenced.extend(candidates.iter().map(|(item, _)| *item))
            }
            _ => {}
        }
    }
    let undefined: Vec<String> = referenced
        .iter()
        .filter(|item| manifest.item(**item).is_none())
        .map(|item| item.to_string())
        .collect();
    results.push(check(
        "manifest_references_defined",
        undefined.is_empty(),
        if undefined.is_empty() {
            format!("{} item references resolve", referenced.len())
        } else {
            format!("undefined: {}", undefined.join(", "))
        },
    ));

    // Weighted tables sum to 1
    let mut bad_tables = Vec::new();
    for (kind, recipes) in &manifest.plant_recipes {
        for (index, recipe) in recipes.iter().enumerate() {
            if let Some(MakeItem::OneOf { one_of }) = &recipe.make_item {
                let total: f64 = one_of.iter().map(|(p, _)| p).sum();
                if (total - 1.0).abs() > 1e-6 {
                    bad_tables.push(format!("{}[{}]={:.3}", kind, index, total));
                }
            }
        }
    }
    results.push(check(
        "manifest_weights_sum_to_one",
        bad_tables.is_empty(),
        if bad_tables.is_empty() {
            "all weighted tables sum to 1".into()
        } else {
            bad_tables.join(", ")
        },
    ));

    // Seeds plant their family
    let dirt = manifest.recipes(PlantKind::Dirt);
    let plants_all = Family::ALL.iter().all(|family| {
        dirt.iter().any(|r| {
            r.change_plant_to == Some(PlantKind::Grown(*family))
                && r.needs.contains_key(&ItemKind::Seed(*family))
        })
    });
    results.push(check(
        "manifest_seeds_plant",
        plants_all,
        "each family's seed plants it on dirt",
    ));

    if verbose {
        for (kind, title) in &manifest.plant_titles {
            println!("    {} = {:?} ({} recipes)", kind, title, manifest.recipes(*kind).len());
        }
    }
    results
}

// ── 2. Leveling ─────────────────────────────────────────────────────────

fn validate_leveling(verbose: bool) -> Vec<TestResult> {
    println!("--- Leveling ---");
    let mut results = Vec::new();
    let config = EngineConfig::default();

    // Monotonic sweep
    let mut last = 0;
    let mut monotonic = true;
    let mut xp = 0.0;
    while xp < 600_000.0 {
        let level = level_from_xp(&DEFAULT_LEVEL_CURVE, xp).level;
        if level < last {
            monotonic = false;
        }
        last = level;
        xp += 37.0;
    }
    results.push(check(
        "level_monotonic",
        monotonic,
        format!("swept to 600k xp, reached level {}", last),
    ));
    results.push(check(
        "level_capped",
        last as usize == DEFAULT_LEVEL_CURVE.len(),
        format!("cap {} (curve has {})", last, DEFAULT_LEVEL_CURVE.len()),
    ));

    // Cycle shrinks as level grows
    let thresholds: Vec<f64> = DEFAULT_LEVEL_CURVE
        .iter()
        .scan(0.0, |acc, t| {
            *acc += t;
            Some(*acc)
        })
        .collect();
    let cycles: Vec<f64> = std::iter::once(0.0)
        .chain(thresholds)
        .map(|xp| xp_per_yield_cycle(&config, xp))
        .collect();
    let shrinking = cycles.windows(2).all(|w| w[1] < w[0]);
    results.push(check(
        "cycle_shrinks",
        shrinking,
        format!(
            "{:.1} xp at level 0 down to {:.1} at the cap",
            cycles[0],
            cycles[cycles.len() - 1]
        ),
    ));

    // Known point
    let p = level_from_xp(&DEFAULT_LEVEL_CURVE, 130.0);
    results.push(check(
        "level_known_point",
        p.level == 2 && p.xp_to_go == 270.0,
        format!("130 xp → level {}, {} to go", p.level, p.xp_to_go),
    ));

    if verbose {
        for (level, cycle) in cycles.iter().enumerate().step_by(6) {
            println!("    level {:>2}: {:.1} xp/yield", level, cycle);
        }
    }
    results
}

// ── 3. Ledger ───────────────────────────────────────────────────────────

fn validate_ledger(_verbose: bool) -> Vec<TestResult> {
    println!("--- Inventory Ledger ---");
    let mut results = Vec::new();

    let essence = ItemKind::Essence(Family::Hvv);
    let mut inv: Inventory = [(essence, 7), (ItemKind::NestEgg, 1)].into_iter().collect();
    let before = inv.clone();

    let too_much = BTreeMap::from([(essence, 5), (ItemKind::LandDeed, 1)]);
    let refused = !inv.try_debit(&too_much) && inv == before;
    results.push(check(
        "ledger_atomic_refusal",
        refused,
        "unaffordable bundle leaves inventory untouched",
    ));

    let affordable = BTreeMap::from([(essence, 7)]);
    let debited = inv.try_debit(&affordable);
    let cleared = inv.count(essence) == 0 && inv.iter().all(|(item, _)| *item != essence);
    results.push(check(
        "ledger_debit_clears_zero",
        debited && cleared,
        "debiting to zero removes the entry",
    ));

    inv.credit(&affordable);
    results.push(check(
        "ledger_roundtrip",
        inv == before,
        "debit then credit restores",
    ));
    results
}

// ── 4. Weighted outcomes ────────────────────────────────────────────────

fn validate_weighted_outcomes(verbose: bool) -> Vec<TestResult> {
    println!("--- Weighted Outcomes ---");
    let mut results = Vec::new();
    let table = [
        (0.70, ItemKind::Powder(Tier::T1)),
        (0.25, ItemKind::Powder(Tier::T2)),
        (0.05, ItemKind::Powder(Tier::T3)),
    ];

    let draws: u32 = 20_000;
    let mut rng = StdRng::seed_from_u64(0xBEEF);
    let mut counts: BTreeMap<ItemKind, u32> = BTreeMap::new();
    let mut misses = 0;
    for _ in 0..draws {
        match pick_weighted(&table, rng.gen::<f64>()) {
            Some(item) => *counts.entry(item).or_insert(0) += 1,
            None => misses += 1,
        }
    }
    results.push(check(
        "weighted_always_selects",
        misses == 0,
        format!("{} draws, {} misses", draws, misses),
    ));

    let mut skewed = Vec::new();
    for (p, item) in &table {
        let observed = f64::from(counts.get(item).copied().unwrap_or(0)) / f64::from(draws);
        if (observed - p).abs() > 0.02 {
            skewed.push(format!("{} {:.3} vs {:.2}", item, observed, p));
        }
        if verbose {
            println!("    {}: {:.3} (expected {:.2})", item, observed, p);
        }
    }
    results.push(check(
        "weighted_distribution",
        skewed.is_empty(),
        if skewed.is_empty() {
            "observed frequencies within 2% of weights".into()
        } else {
            skewed.join(", ")
        },
    ));

    let short = [(0.5, ItemKind::Bag(Tier::T2)), (0.1, ItemKind::Bag(Tier::T3))];
    results.push(check(
        "weighted_short_table_fallback",
        pick_weighted(&short, 0.99) == Some(ItemKind::Bag(Tier::T3)),
        "draw past a short table picks the last candidate",
    ));
    results
}

// ── 5. Growth ───────────────────────────────────────────────────────────

fn validate_growth(verbose: bool) -> Vec<TestResult> {
    println!("--- Growth & Yields ---");
    let mut results = Vec::new();
    let Some(engine) = new_engine() else {
        results.push(check("growth_engine", false, "engine failed to start"));
        return results;
    };
    let mut rng = StdRng::seed_from_u64(11);

    let planted = engine.signup("grower").is_ok() && engine.craft("grower", 0, 0, &mut rng).is_ok();
    results.push(check("growth_plant_seed", planted, "bbc planted on dirt"));
    let Ok(handle) = engine.stead("grower") else {
        return results;
    };

    // First yield lands when the first cycle fills
    let first_cycle = xp_per_yield_cycle(engine.config(), 0.0);
    let mut ticks = 0;
    let mut yields = 0;
    while handle.lock().plants[0].xp <= first_cycle {
        yields += engine.tick(&mut rng).yields;
        ticks += 1;
    }
    let essence = handle.lock().inventory.count(ItemKind::Essence(Family::Bbc));
    results.push(check(
        "growth_first_yield",
        yields == 1 && essence == 1,
        format!("{} ticks, {} yields, {} essence", ticks, yields, essence),
    ));

    // One hour of growth at 1x
    let hour = 3_600_000 / engine.config().tick_ms;
    for _ in 0..hour {
        engine.tick(&mut rng);
    }
    let (xp, essence) = {
        let stead = handle.lock();
        (
            stead.plants[0].xp,
            stead.inventory.count(ItemKind::Essence(Family::Bbc)),
        )
    };
    let level = level_from_xp(&engine.config().level_curve, xp).level;
    results.push(check(
        "growth_hour",
        essence > 100 && level > 5,
        format!("{:.0} xp, level {}, {} essence", xp, level, essence),
    ));

    // A t3 powder speeds growth 101x while it lasts
    handle.lock().inventory.credit_one(ItemKind::Powder(Tier::T3), 1);
    let before = handle.lock().plants[0].xp;
    let boosted = engine
        .use_item("grower", ItemKind::Powder(Tier::T3), &mut rng)
        .is_ok();
    engine.tick(&mut rng);
    let gained = handle.lock().plants[0].xp - before;
    let expected = 101.0 * engine.config().base_xp_per_tick;
    results.push(check(
        "growth_powder_boost",
        boosted && (gained - expected).abs() < 1e-6,
        format!("gained {:.1} xp in one tick (expected {:.1})", gained, expected),
    ));

    // ...and wears off within 30 s
    for _ in 0..(30_000 / engine.config().tick_ms) {
        engine.tick(&mut rng);
    }
    let active = handle.lock().effects.len();
    results.push(check(
        "growth_powder_expires",
        active == 0,
        format!("{} effects left after 30 s", active),
    ));

    if verbose {
        if let Ok(view) = engine.serialize_stead("grower") {
            if let Ok(json) = serde_json::to_string(&view) {
                println!("    {}", json);
            }
        }
    }
    results
}

// ── 6. Session ──────────────────────────────────────────────────────────

fn validate_session(verbose: bool) -> Vec<TestResult> {
    println!("--- Multi-user Session ---");
    let mut results = Vec::new();
    let Some(engine) = new_engine() else {
        results.push(check("session_engine", false, "engine failed to start"));
        return results;
    };
    let mut rng = StdRng::seed_from_u64(23);

    let names = ["orpheus", "heidi", "zeus"];
    let signed_up = names.iter().all(|n| engine.signup(n).is_ok());
    let duplicate = engine.signup("orpheus") == Err(EngineError::UserExists("orpheus".into()));
    results.push(check(
        "session_signup",
        signed_up && duplicate,
        format!("{} users, duplicate refused", engine.user_count()),
    ));

    // Everyone opens their nest egg and plants a seed
    let mut opened = true;
    for (i, name) in names.iter().enumerate() {
        opened &= engine.use_item(name, ItemKind::NestEgg, &mut rng).is_ok();
        opened &= engine.craft(name, 0, i, &mut rng).is_ok();
    }
    results.push(check(
        "session_nest_eggs",
        opened,
        "nest eggs opened and seeds planted",
    ));

    // Gifts move items and refuse what isn't there
    let seeds = BTreeMap::from([(ItemKind::Seed(Family::Cyl), 2)]);
    let gifted = engine.gift("orpheus", "heidi", &seeds).is_ok();
    let greedy = BTreeMap::from([(ItemKind::Seed(Family::Cyl), 99)]);
    let refused = engine.gift("orpheus", "heidi", &greedy) == Err(EngineError::InsufficientFunds);
    let heidi_cyl = engine
        .stead("heidi")
        .map(|h| h.lock().inventory.count(ItemKind::Seed(Family::Cyl)))
        .unwrap_or(0);
    results.push(check(
        "session_gift",
        gifted && refused && heidi_cyl == 6,
        format!("heidi holds {} cyl seeds", heidi_cyl),
    ));

    for _ in 0..2_000 {
        engine.tick(&mut rng);
    }

    // Save and restore in memory
    let data = engine.save_data();
    let mut buffer = Vec::new();
    let restored = save(&data, &mut buffer)
        .ok()
        .and_then(|()| load(buffer.as_slice()).ok())
        .and_then(|loaded| Manifest::bundled().ok().map(|m| (loaded, m)))
        .and_then(|(loaded, m)| Engine::from_save(EngineConfig::default(), m, loaded).ok());
    let same = restored
        .as_ref()
        .is_some_and(|r| r.save_data() == data && r.clock_ms() == engine.clock_ms());
    results.push(check(
        "session_save_restore",
        same,
        format!("{} bytes for {} steads", buffer.len(), data.steads.len()),
    ));

    let feed = engine.recent_activity(0);
    results.push(check(
        "session_activity_pruned",
        feed.is_empty(),
        format!(
            "{} entries left after {} s of ticks",
            feed.len(),
            engine.clock_ms() / 1000
        ),
    ));

    if verbose {
        for name in names {
            if let Ok(handle) = engine.stead(name) {
                let stead = handle.lock();
                let total: u64 = stead.inventory.iter().map(|(_, n)| *n).sum();
                println!("    {}: {} plots, {} items", name, stead.plants.len(), total);
            }
        }
    }
    results
}
