//! Player actions: using items and crafting on plots.
//!
//! Each action locks the user's stead for its whole validate-then-apply step,
//! so a concurrent tick sees the stead either before or after it.

use hkgi_logic::kinds::ItemKind;
use hkgi_logic::recipes::{apply_craft, apply_use_item, CraftOutcome, UseOutcome};
use hkgi_logic::GameError;
use rand::Rng;
use serde_json::json;

use crate::activity::ActivityKind;
use crate::engine::Engine;

impl Engine {
    /// Consume one `item` from `username`'s stead and apply its effect.
    pub fn use_item(
        &self,
        username: &str,
        item: ItemKind,
        rng: &mut impl Rng,
    ) -> Result<UseOutcome, GameError> {
        let handle = self.stead(username)?;
        let outcome = {
            let mut stead = handle.lock();
            apply_use_item(&mut stead, self.manifest(), item, rng)?
        };

        log::info!("{username} used {item}: {outcome:?}");
        self.activity_push(
            ActivityKind::UseItem,
            json!({ "who": username, "item": item.to_string() }),
        );
        Ok(outcome)
    }

    /// Craft recipe `recipe_index` on plot `plot_index` of `username`'s stead.
    pub fn craft(
        &self,
        username: &str,
        plot_index: usize,
        recipe_index: usize,
        rng: &mut impl Rng,
    ) -> Result<CraftOutcome, GameError> {
        let handle = self.stead(username)?;
        let outcome = {
            let mut stead = handle.lock();
            apply_craft(
                &mut stead,
                self.manifest(),
                self.config(),
                plot_index,
                recipe_index,
                rng,
            )?
        };

        log::info!("{username} crafted recipe {recipe_index} on plot {plot_index}: {outcome:?}");
        self.activity_push(
            ActivityKind::Craft,
            json!({ "who": username, "plot": plot_index, "recipe": recipe_index }),
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hkgi_logic::config::EngineConfig;
    use hkgi_logic::kinds::{Family, PlantKind, Tier};
    use hkgi_logic::manifest::Manifest;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn engine_with(user: &str) -> Engine {
        let engine = Engine::new(EngineConfig::default(), Manifest::bundled().unwrap()).unwrap();
        engine.signup(user).unwrap();
        engine
    }

    #[test]
    fn test_nest_egg_grants_bundle() {
        let engine = engine_with("a");
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = engine.use_item("a", ItemKind::NestEgg, &mut rng).unwrap();
        assert!(matches!(outcome, UseOutcome::Granted { .. }));

        let handle = engine.stead("a").unwrap();
        let stead = handle.lock();
        assert_eq!(stead.inventory.count(ItemKind::NestEgg), 0);
        assert_eq!(stead.inventory.count(ItemKind::Powder(Tier::T1)), 5);
        assert_eq!(stead.inventory.count(ItemKind::Seed(Family::Hvv)), 4);
    }

    #[test]
    fn test_use_item_failures_log_nothing() {
        let engine = engine_with("a");
        let mut rng = StdRng::seed_from_u64(3);
        let before = engine.recent_activity(0).len();

        assert_eq!(
            engine.use_item("a", ItemKind::Seed(Family::Bbc), &mut rng),
            Err(GameError::NotUsable)
        );
        assert_eq!(
            engine.use_item("a", ItemKind::LandDeed, &mut rng),
            Err(GameError::InsufficientFunds)
        );
        assert!(matches!(
            engine.use_item("nobody", ItemKind::NestEgg, &mut rng),
            Err(GameError::UnknownUser(_))
        ));
        assert_eq!(engine.recent_activity(0).len(), before);
    }

    #[test]
    fn test_craft_plants_seed() {
        let engine = engine_with("a");
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = engine.craft("a", 0, 0, &mut rng).unwrap();
        assert_eq!(
            outcome,
            CraftOutcome::Transformed {
                plot: 0,
                kind: PlantKind::Grown(Family::Bbc)
            }
        );
        let kinds: Vec<_> = engine
            .recent_activity(0)
            .iter()
            .map(|e| e.kind)
            .collect();
        assert_eq!(kinds, vec![ActivityKind::Signup, ActivityKind::Craft]);
    }

    #[test]
    fn test_craft_bad_plot() {
        let engine = engine_with("a");
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            engine.craft("a", 9, 0, &mut rng),
            Err(GameError::InvalidReference(_))
        ));
    }
}
