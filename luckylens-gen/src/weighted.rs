use std::collections::HashMap;

use anyhow::Result;

use luckylens_db::games::Game;
use luckylens_db::models::NumberSet;

use crate::rng::{RandomSource, random_int};

/// Instantanés des fréquences historiques, une table par bassin. Seuls
/// les numéros déjà sortis y figurent : des tables vides signifient
/// qu'aucun historique n'existe.
#[derive(Debug, Clone, Default)]
pub struct FrequencyMaps {
    pub main: HashMap<u8, u32>,
    pub bonus: HashMap<u8, u32>,
}

impl FrequencyMaps {
    pub fn has_data(&self) -> bool {
        !self.main.is_empty() || !self.bonus.is_empty()
    }
}

struct WeightedEntry {
    value: u8,
    weight: f64,
}

/// Bassin de travail complet : chaque numéro de [1, max] pèse
/// fréquence + 1, pour que les numéros jamais sortis gardent une
/// probabilité non nulle. Sans historique, tous les poids valent 1 et
/// la sélection redevient uniforme.
fn weighted_pool(max: u8, frequencies: &HashMap<u8, u32>) -> Vec<WeightedEntry> {
    (1..=max)
        .map(|value| WeightedEntry {
            value,
            weight: f64::from(frequencies.get(&value).copied().unwrap_or(0)) + 1.0,
        })
        .collect()
}

/// Sélection pondérée sans remise par CDF inverse : tirage de
/// r ∈ [0, ⌊total⌋ - 1] puis balayage des poids cumulés ; l'entrée
/// choisie est retirée du bassin par échange avec la dernière (O(1),
/// l'ordre du bassin restant est sans effet sur la sélection).
/// Si le total résiduel est nul, repli sur un choix uniforme.
fn weighted_select(
    rng: &mut dyn RandomSource,
    pool: &mut Vec<WeightedEntry>,
    count: usize,
) -> Result<Vec<u8>> {
    let count = count.min(pool.len());
    let mut selected = Vec::with_capacity(count);

    for _ in 0..count {
        let total: f64 = pool.iter().map(|e| e.weight).sum();

        let index = if total <= 0.0 {
            random_int(rng, 0, pool.len() as u32 - 1)? as usize
        } else {
            let bound = (total.floor() as u32).max(1);
            let r = f64::from(random_int(rng, 0, bound - 1)?);
            let mut accumulated = 0.0;
            let mut found = pool.len() - 1;
            for (i, entry) in pool.iter().enumerate() {
                accumulated += entry.weight;
                if r < accumulated {
                    found = i;
                    break;
                }
            }
            found
        };

        selected.push(pool.swap_remove(index).value);
    }

    Ok(selected)
}

/// Génère une grille pondérée par les fréquences historiques :
/// principaux triés croissant, bonus dans l'ordre de tirage.
pub fn generate_weighted_set(
    game: &Game,
    frequencies: &FrequencyMaps,
    rng: &mut dyn RandomSource,
) -> Result<NumberSet> {
    game.validate()?;

    let mut main_pool = weighted_pool(game.primary_max, &frequencies.main);
    let mut primary = weighted_select(rng, &mut main_pool, game.primary_count)?;
    primary.sort_unstable();

    let secondary = if game.secondary_count == 0 {
        Vec::new()
    } else {
        let mut bonus_pool = weighted_pool(game.secondary_max, &frequencies.bonus);
        weighted_select(rng, &mut bonus_pool, game.secondary_count)?
    };

    Ok(NumberSet { primary, secondary })
}
