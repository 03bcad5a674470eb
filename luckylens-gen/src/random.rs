use anyhow::{Result, bail};

use luckylens_db::games::Game;
use luckylens_db::models::NumberSet;

use crate::rng::{RandomSource, random_int};

/// Plafond de la boucle de collecte : atteint seulement si la
/// configuration rend la collecte impossible ou quasi impossible, auquel
/// cas on préfère une erreur à un blocage silencieux.
const MAX_DRAW_ATTEMPTS: u32 = 10_000;

/// Tire `count` numéros distincts, uniformes sur [1, max], par
/// tirage-rejet sur les doublons. L'ordre retourné est l'ordre de tirage.
pub(crate) fn draw_distinct(
    rng: &mut dyn RandomSource,
    count: usize,
    max: u8,
) -> Result<Vec<u8>> {
    let mut picked: Vec<u8> = Vec::with_capacity(count);
    let mut attempts = 0u32;
    while picked.len() < count {
        if attempts >= MAX_DRAW_ATTEMPTS {
            bail!(
                "Collecte de {} numéros distincts sur [1, {}] non convergente",
                count,
                max
            );
        }
        attempts += 1;
        let n = random_int(rng, 1, max as u32)? as u8;
        if !picked.contains(&n) {
            picked.push(n);
        }
    }
    Ok(picked)
}

/// Génère une grille uniforme : numéros principaux sans remise puis
/// triés croissant, numéros bonus sans remise dans l'ordre de tirage
/// (vide pour les jeux sans bonus).
pub fn generate_set(game: &Game, rng: &mut dyn RandomSource) -> Result<NumberSet> {
    game.validate()?;

    let mut primary = draw_distinct(rng, game.primary_count, game.primary_max)?;
    primary.sort_unstable();

    let secondary = if game.secondary_count == 0 {
        Vec::new()
    } else {
        draw_distinct(rng, game.secondary_count, game.secondary_max)?
    };

    Ok(NumberSet { primary, secondary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededSource;
    use chrono::Weekday;
    use luckylens_db::games::all_games;

    fn custom_game(
        primary_count: usize,
        primary_max: u8,
        secondary_count: usize,
        secondary_max: u8,
    ) -> Game {
        Game {
            id: "test",
            name: "Test",
            region: "",
            primary_count,
            primary_max,
            secondary_count,
            secondary_max,
            bonus_label: "",
            draw_days: &[Weekday::Mon],
            description: "",
        }
    }

    fn assert_set_shape(set: &NumberSet, game: &Game) {
        assert_eq!(set.primary.len(), game.primary_count);
        assert_eq!(set.secondary.len(), game.secondary_count);
        assert!(
            set.primary.windows(2).all(|w| w[0] < w[1]),
            "numéros principaux non triés strictement : {:?}",
            set.primary
        );
        assert!(set.primary.iter().all(|&n| n >= 1 && n <= game.primary_max));
        assert!(
            set.secondary
                .iter()
                .all(|&n| n >= 1 && n <= game.secondary_max)
        );
        for i in 0..set.secondary.len() {
            for j in (i + 1)..set.secondary.len() {
                assert_ne!(set.secondary[i], set.secondary[j], "bonus en double");
            }
        }
    }

    #[test]
    fn test_set_shape_for_every_catalog_game() {
        let mut rng = SeededSource::new(42);
        for game in all_games() {
            for _ in 0..50 {
                let set = generate_set(game, &mut rng).unwrap();
                assert_set_shape(&set, game);
            }
        }
    }

    #[test]
    fn test_powerball_concrete_shape() {
        let game = custom_game(5, 69, 1, 26);
        let mut rng = SeededSource::new(8);
        let set = generate_set(&game, &mut rng).unwrap();
        assert_eq!(set.primary.len(), 5);
        assert_eq!(set.secondary.len(), 1);
        assert!(set.secondary[0] >= 1 && set.secondary[0] <= 26);
    }

    #[test]
    fn test_no_bonus_game_has_empty_secondary() {
        let game = custom_game(5, 39, 0, 0);
        let mut rng = SeededSource::new(3);
        let set = generate_set(&game, &mut rng).unwrap();
        assert_eq!(set.primary.len(), 5);
        assert!(set.secondary.is_empty());
    }

    #[test]
    fn test_exhausted_pool_enumerates_fully() {
        // Bassin épuisé : chaque valeur sort exactement une fois.
        let game = custom_game(9, 9, 0, 0);
        let mut rng = SeededSource::new(11);
        for _ in 0..20 {
            let set = generate_set(&game, &mut rng).unwrap();
            assert_eq!(set.primary, (1..=9).collect::<Vec<u8>>());
        }
    }

    #[test]
    fn test_multiple_bonus_numbers_are_distinct() {
        let game = custom_game(3, 9, 3, 5);
        let mut rng = SeededSource::new(21);
        for _ in 0..200 {
            let set = generate_set(&game, &mut rng).unwrap();
            assert_set_shape(&set, &game);
        }
    }

    #[test]
    fn test_impossible_pool_fails_fast() {
        // Sans la validation, la collecte bouclerait sans fin.
        let game = custom_game(10, 9, 0, 0);
        let mut rng = SeededSource::new(1);
        assert!(generate_set(&game, &mut rng).is_err());

        let game = custom_game(3, 9, 4, 3);
        assert!(generate_set(&game, &mut rng).is_err());
    }
}
