use chrono::NaiveDate;

use luckylens_db::games::Game;
use luckylens_db::models::HistoricalDraw;

use crate::weighted::FrequencyMaps;

/// Fréquence d'un numéro sur l'historique, avec sa dernière date de
/// sortie (`None` : jamais sorti).
#[derive(Debug, Clone)]
pub struct FrequencyEntry {
    pub number: u8,
    pub count: u32,
    pub last_drawn: Option<NaiveDate>,
}

/// Tables de fréquences destinées au générateur pondéré. Seuls les
/// numéros observés y figurent : un historique vide donne des tables
/// vides, ce qui déclenche le repli uniforme en aval.
pub fn frequency_maps(draws: &[HistoricalDraw]) -> FrequencyMaps {
    let mut maps = FrequencyMaps::default();
    for draw in draws {
        for &n in &draw.numbers.primary {
            *maps.main.entry(n).or_insert(0) += 1;
        }
        for &n in &draw.numbers.secondary {
            *maps.bonus.entry(n).or_insert(0) += 1;
        }
    }
    maps
}

/// Fréquences complètes des deux bassins d'un jeu, triées par effectif
/// décroissant (à égalité, numéro croissant).
pub fn compute_frequencies(
    draws: &[HistoricalDraw],
    game: &Game,
) -> (Vec<FrequencyEntry>, Vec<FrequencyEntry>) {
    (
        pool_frequencies(draws, game.primary_max, false),
        pool_frequencies(draws, game.secondary_max, true),
    )
}

fn pool_frequencies(draws: &[HistoricalDraw], pool_max: u8, is_bonus: bool) -> Vec<FrequencyEntry> {
    let mut entries: Vec<FrequencyEntry> = (1..=pool_max)
        .map(|number| FrequencyEntry {
            number,
            count: 0,
            last_drawn: None,
        })
        .collect();

    for draw in draws {
        let numbers = if is_bonus {
            &draw.numbers.secondary
        } else {
            &draw.numbers.primary
        };
        for &n in numbers {
            let idx = (n - 1) as usize;
            if idx < entries.len() {
                entries[idx].count += 1;
                match entries[idx].last_drawn {
                    Some(d) if d >= draw.date => {}
                    _ => entries[idx].last_drawn = Some(draw.date),
                }
            }
        }
    }

    entries.sort_by(|a, b| b.count.cmp(&a.count).then(a.number.cmp(&b.number)));
    entries
}

/// Les `count` numéros les plus fréquents.
pub fn hot_numbers(frequencies: &[FrequencyEntry], count: usize) -> Vec<FrequencyEntry> {
    frequencies.iter().take(count).cloned().collect()
}

/// Les `count` numéros les moins fréquents : d'abord les moins sortis
/// parmi ceux déjà observés, complétés par les numéros jamais sortis.
pub fn cold_numbers(frequencies: &[FrequencyEntry], count: usize) -> Vec<FrequencyEntry> {
    let appeared: Vec<FrequencyEntry> = frequencies
        .iter()
        .filter(|f| f.count > 0)
        .cloned()
        .collect();
    let never: Vec<FrequencyEntry> = frequencies
        .iter()
        .filter(|f| f.count == 0)
        .cloned()
        .collect();

    let start = appeared.len().saturating_sub(count);
    let mut combined: Vec<FrequencyEntry> = appeared[start..].to_vec();
    combined.extend(never);
    let start = combined.len().saturating_sub(count);
    combined.split_off(start)
}

/// Moyennes par tirage de numéros principaux pairs et impairs,
/// arrondies au dixième.
pub fn even_odd_average(draws: &[HistoricalDraw]) -> (f64, f64) {
    if draws.is_empty() {
        return (0.0, 0.0);
    }
    let mut even = 0u32;
    let mut odd = 0u32;
    for draw in draws {
        for &n in &draw.numbers.primary {
            if n % 2 == 0 {
                even += 1;
            } else {
                odd += 1;
            }
        }
    }
    let n = draws.len() as f64;
    (round_tenth(even as f64 / n), round_tenth(odd as f64 / n))
}

/// Moyennes par tirage de numéros hauts et bas ; la médiane du bassin
/// (`primary_max / 2`) sépare les deux moitiés.
pub fn high_low_average(draws: &[HistoricalDraw], game: &Game) -> (f64, f64) {
    if draws.is_empty() {
        return (0.0, 0.0);
    }
    let midpoint = game.primary_max / 2;
    let mut high = 0u32;
    let mut low = 0u32;
    for draw in draws {
        for &n in &draw.numbers.primary {
            if n > midpoint {
                high += 1;
            } else {
                low += 1;
            }
        }
    }
    let n = draws.len() as f64;
    (round_tenth(high as f64 / n), round_tenth(low as f64 / n))
}

/// Bornes de dates couvertes par l'historique.
pub fn date_range(draws: &[HistoricalDraw]) -> Option<(NaiveDate, NaiveDate)> {
    let earliest = draws.iter().map(|d| d.date).min()?;
    let latest = draws.iter().map(|d| d.date).max()?;
    Some((earliest, latest))
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
