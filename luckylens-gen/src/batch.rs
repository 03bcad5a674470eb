use anyhow::Result;

use luckylens_db::games::Game;
use luckylens_db::models::NumberSet;

use crate::random::generate_set;
use crate::rng::RandomSource;
use crate::weighted::{FrequencyMaps, generate_weighted_set};

/// Tentatives de régénération par grille avant d'accepter un doublon.
const MAX_RETRIES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    Random,
    Trend,
}

/// Génère un lot de `count` grilles.
///
/// Avec `no_repeat`, chaque candidate est comparée à la dernière grille
/// sauvegardée et aux grilles déjà acceptées dans le lot ; en cas de
/// doublon elle est retirée jusqu'à `MAX_RETRIES` fois, puis acceptée
/// telle quelle : la politique est un meilleur effort, jamais une
/// garantie stricte d'unicité, et n'échoue donc jamais pour cette raison.
///
/// En mode tendance, le repli uniforme se décide une seule fois à
/// l'entrée du lot : sans la moindre donnée historique, tout le lot est
/// généré uniformément.
pub fn generate_batch(
    game: &Game,
    count: usize,
    no_repeat: bool,
    last_saved: Option<&NumberSet>,
    mode: GenerationMode,
    frequencies: Option<&FrequencyMaps>,
    rng: &mut dyn RandomSource,
) -> Result<Vec<NumberSet>> {
    game.validate()?;
    if count == 0 {
        return Ok(Vec::new());
    }

    let weights = match mode {
        GenerationMode::Trend => frequencies.filter(|f| f.has_data()),
        GenerationMode::Random => None,
    };

    let mut sets: Vec<NumberSet> = Vec::with_capacity(count);
    for _ in 0..count {
        let mut candidate = draw_one(game, weights, rng)?;
        if no_repeat {
            let mut retries = 0;
            while retries < MAX_RETRIES && is_duplicate(&candidate, last_saved, &sets) {
                candidate = draw_one(game, weights, rng)?;
                retries += 1;
            }
        }
        sets.push(candidate);
    }
    Ok(sets)
}

fn draw_one(
    game: &Game,
    weights: Option<&FrequencyMaps>,
    rng: &mut dyn RandomSource,
) -> Result<NumberSet> {
    match weights {
        Some(frequencies) => generate_weighted_set(game, frequencies, rng),
        None => generate_set(game, rng),
    }
}

/// Égalité de séquences exacte : suffisante pour les principaux (déjà
/// triés) ; pour les bonus l'ordre de tirage compte, comportement
/// conservé tel quel.
fn is_duplicate(
    candidate: &NumberSet,
    last_saved: Option<&NumberSet>,
    accepted: &[NumberSet],
) -> bool {
    if let Some(last) = last_saved {
        if candidate == last {
            return true;
        }
    }
    accepted.iter().any(|set| set == candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededSource;
    use chrono::Weekday;

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

    #[test]
    fn test_batch_length_matches_count() {
        let game = custom_game(5, 69, 1, 26);
        let mut rng = SeededSource::new(42);
        for count in [1usize, 3, 5] {
            let sets = generate_batch(
                &game,
                count,
                false,
                None,
                GenerationMode::Random,
                None,
                &mut rng,
            )
            .unwrap();
            assert_eq!(sets.len(), count);
        }
    }

    #[test]
    fn test_zero_count_yields_empty_batch() {
        let game = custom_game(5, 69, 1, 26);
        let mut rng = SeededSource::new(1);
        let sets = generate_batch(
            &game,
            0,
            true,
            None,
            GenerationMode::Random,
            None,
            &mut rng,
        )
        .unwrap();
        assert!(sets.is_empty());
    }

    #[test]
    fn test_concrete_powerball_scenario() {
        let game = custom_game(5, 69, 1, 26);
        let mut rng = SeededSource::new(77);
        let sets = generate_batch(
            &game,
            1,
            false,
            None,
            GenerationMode::Random,
            None,
            &mut rng,
        )
        .unwrap();
        assert_eq!(sets.len(), 1);
        let set = &sets[0];
        assert_eq!(set.primary.len(), 5);
        assert!(set.primary.windows(2).all(|w| w[0] < w[1]));
        assert!(set.primary.iter().all(|&n| (1..=69).contains(&n)));
        assert_eq!(set.secondary.len(), 1);
        assert!((1..=26).contains(&set.secondary[0]));
    }

    #[test]
    fn test_no_repeat_avoids_last_saved_set() {
        let game = custom_game(3, 9, 0, 0);
        let last = NumberSet {
            primary: vec![2, 5, 8],
            secondary: vec![],
        };
        for seed in 0..100u64 {
            let mut rng = SeededSource::new(seed);
            let sets = generate_batch(
                &game,
                5,
                true,
                Some(&last),
                GenerationMode::Random,
                None,
                &mut rng,
            )
            .unwrap();
            assert!(
                sets.iter().all(|s| s != &last),
                "la dernière grille sauvegardée a été reproduite (seed {})",
                seed
            );
        }
    }

    #[test]
    fn test_no_repeat_keeps_batch_distinct() {
        let game = custom_game(3, 9, 0, 0);
        for seed in 0..50u64 {
            let mut rng = SeededSource::new(seed);
            let sets = generate_batch(
                &game,
                5,
                true,
                None,
                GenerationMode::Random,
                None,
                &mut rng,
            )
            .unwrap();
            for i in 0..sets.len() {
                for j in (i + 1)..sets.len() {
                    assert_ne!(
                        sets[i], sets[j],
                        "doublon dans le lot (seed {})",
                        seed
                    );
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_batch() {
        let game = custom_game(5, 69, 1, 26);
        let mut frequencies = FrequencyMaps::default();
        frequencies.main.insert(12, 30);

        let mut rng_a = SeededSource::new(2026);
        let mut rng_b = SeededSource::new(2026);
        let a = generate_batch(
            &game,
            5,
            true,
            None,
            GenerationMode::Trend,
            Some(&frequencies),
            &mut rng_a,
        )
        .unwrap();
        let b = generate_batch(
            &game,
            5,
            true,
            None,
            GenerationMode::Trend,
            Some(&frequencies),
            &mut rng_b,
        )
        .unwrap();
        assert_eq!(a, b, "mêmes entrées et même seed : lots identiques");
    }

    #[test]
    fn test_trend_without_history_equals_random() {
        // Tables vides : le repli est décidé à l'entrée du lot, le mode
        // tendance consomme alors exactement les mêmes tirages que le
        // mode aléatoire.
        let game = custom_game(5, 69, 1, 26);
        let empty = FrequencyMaps::default();

        let mut rng_a = SeededSource::new(55);
        let mut rng_b = SeededSource::new(55);
        let trend = generate_batch(
            &game,
            3,
            false,
            None,
            GenerationMode::Trend,
            Some(&empty),
            &mut rng_a,
        )
        .unwrap();
        let random = generate_batch(
            &game,
            3,
            false,
            None,
            GenerationMode::Random,
            None,
            &mut rng_b,
        )
        .unwrap();
        assert_eq!(trend, random);
    }

    #[test]
    fn test_trend_mode_follows_frequencies() {
        // Les numéros 1 à 5 écrasent le reste : l'essentiel des numéros
        // tirés doit en provenir.
        let game = custom_game(5, 69, 0, 0);
        let mut frequencies = FrequencyMaps::default();
        for n in 1..=5u8 {
            frequencies.main.insert(n, 1_000);
        }

        let mut rng = SeededSource::new(99);
        let mut heavy_hits = 0u32;
        let mut total = 0u32;
        for _ in 0..50 {
            let sets = generate_batch(
                &game,
                1,
                false,
                None,
                GenerationMode::Trend,
                Some(&frequencies),
                &mut rng,
            )
            .unwrap();
            for &n in &sets[0].primary {
                total += 1;
                if n <= 5 {
                    heavy_hits += 1;
                }
            }
        }
        let ratio = heavy_hits as f64 / total as f64;
        assert!(
            ratio > 0.8,
            "pondération inopérante : {:.2} de numéros lourds",
            ratio
        );
    }

    #[test]
    fn test_invalid_pool_propagates() {
        let game = custom_game(10, 9, 0, 0);
        let mut rng = SeededSource::new(1);
        assert!(
            generate_batch(
                &game,
                1,
                false,
                None,
                GenerationMode::Random,
                None,
                &mut rng
            )
            .is_err()
        );
    }
}
