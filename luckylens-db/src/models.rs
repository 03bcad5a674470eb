use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};

use crate::games::Game;

/// Une combinaison de numéros : numéros principaux triés croissant,
/// numéros bonus dans l'ordre de tirage.
///
/// L'égalité dérivée compare les séquences exactement, ce qui sert
/// directement de test de doublon pour la politique anti-répétition
/// (les principaux étant toujours triés, c'est une égalité d'ensembles
/// pour eux ; pour les bonus l'ordre de tirage compte, comportement
/// conservé tel quel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberSet {
    pub primary: Vec<u8>,
    pub secondary: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationType {
    Random,
    Trend,
    Manual,
}

impl std::fmt::Display for GenerationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationType::Random => write!(f, "random"),
            GenerationType::Trend => write!(f, "trend"),
            GenerationType::Manual => write!(f, "manual"),
        }
    }
}

impl std::str::FromStr for GenerationType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "random" => Ok(GenerationType::Random),
            "trend" => Ok(GenerationType::Trend),
            "manual" => Ok(GenerationType::Manual),
            other => bail!("Type de génération inconnu : '{}'", other),
        }
    }
}

/// Grille générée (ou saisie manuellement), telle que persistée.
#[derive(Debug, Clone)]
pub struct GeneratedSet {
    pub id: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub game_id: String,
    pub numbers: NumberSet,
    pub generation_type: GenerationType,
    pub saved: bool,
    pub notes: String,
    pub batch_id: Option<String>,
}

/// Résultat de tirage officiel importé depuis un fichier de données.
#[derive(Debug, Clone)]
pub struct HistoricalDraw {
    pub id: Option<i64>,
    pub game_id: String,
    pub date: NaiveDate,
    pub numbers: NumberSet,
    pub jackpot: String,
    pub winners: u32,
}

/// Préférences utilisateur (une seule ligne en base).
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub default_game_id: String,
    pub no_repeat: bool,
    pub auto_save: bool,
    pub default_set_count: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            default_game_id: crate::games::default_game().id.to_string(),
            no_repeat: false,
            auto_save: false,
            default_set_count: 1,
        }
    }
}

/// Vérifie qu'une combinaison respecte la configuration d'un jeu :
/// effectifs exacts, numéros dans les bornes, pas de doublons.
pub fn validate_set(game: &Game, set: &NumberSet) -> Result<()> {
    if set.primary.len() != game.primary_count {
        bail!(
            "{} : {} numéros principaux attendus, {} fournis",
            game.name,
            game.primary_count,
            set.primary.len()
        );
    }
    if set.secondary.len() != game.secondary_count {
        bail!(
            "{} : {} numéros bonus attendus, {} fournis",
            game.name,
            game.secondary_count,
            set.secondary.len()
        );
    }
    for &n in &set.primary {
        if n < 1 || n > game.primary_max {
            bail!("Numéro {} hors limites (1-{})", n, game.primary_max);
        }
    }
    for &n in &set.secondary {
        if n < 1 || n > game.secondary_max {
            bail!("Numéro bonus {} hors limites (1-{})", n, game.secondary_max);
        }
    }
    for i in 0..set.primary.len() {
        for j in (i + 1)..set.primary.len() {
            if set.primary[i] == set.primary[j] {
                bail!("Numéro en double : {}", set.primary[i]);
            }
        }
    }
    for i in 0..set.secondary.len() {
        for j in (i + 1)..set.secondary.len() {
            if set.secondary[i] == set.secondary[j] {
                bail!("Numéro bonus en double : {}", set.secondary[i]);
            }
        }
    }
    Ok(())
}

/// Sérialise une liste de numéros en TEXT ("5 12 23 41 66").
pub fn join_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Relit une liste de numéros depuis sa forme TEXT.
pub fn parse_numbers(s: &str) -> Result<Vec<u8>> {
    s.split_whitespace()
        .map(|part| {
            part.parse::<u8>()
                .with_context(|| format!("Numéro illisible : '{}'", part))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::game_by_id;

    fn powerball() -> &'static Game {
        game_by_id("powerball").unwrap()
    }

    #[test]
    fn test_validate_set_ok() {
        let set = NumberSet {
            primary: vec![1, 2, 3, 4, 5],
            secondary: vec![26],
        };
        assert!(validate_set(powerball(), &set).is_ok());
    }

    #[test]
    fn test_validate_set_wrong_count() {
        let set = NumberSet {
            primary: vec![1, 2, 3, 4],
            secondary: vec![1],
        };
        assert!(validate_set(powerball(), &set).is_err());
    }

    #[test]
    fn test_validate_set_out_of_range() {
        let set = NumberSet {
            primary: vec![1, 2, 3, 4, 70],
            secondary: vec![1],
        };
        assert!(validate_set(powerball(), &set).is_err());

        let set = NumberSet {
            primary: vec![1, 2, 3, 4, 5],
            secondary: vec![27],
        };
        assert!(validate_set(powerball(), &set).is_err());
    }

    #[test]
    fn test_validate_set_duplicates() {
        let set = NumberSet {
            primary: vec![1, 1, 3, 4, 5],
            secondary: vec![2],
        };
        assert!(validate_set(powerball(), &set).is_err());
    }

    #[test]
    fn test_validate_set_no_bonus_game() {
        let fantasy5 = game_by_id("fantasy5").unwrap();
        let set = NumberSet {
            primary: vec![3, 9, 17, 28, 39],
            secondary: vec![],
        };
        assert!(validate_set(fantasy5, &set).is_ok());

        let with_bonus = NumberSet {
            primary: vec![3, 9, 17, 28, 39],
            secondary: vec![1],
        };
        assert!(validate_set(fantasy5, &with_bonus).is_err());
    }

    #[test]
    fn test_number_set_equality_is_sequence_equality() {
        let a = NumberSet {
            primary: vec![1, 2, 3],
            secondary: vec![4, 5],
        };
        let b = NumberSet {
            primary: vec![1, 2, 3],
            secondary: vec![5, 4],
        };
        assert_ne!(a, b, "l'ordre des bonus doit compter");
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_join_parse_numbers() {
        let numbers = vec![5u8, 12, 23, 41, 66];
        let text = join_numbers(&numbers);
        assert_eq!(text, "5 12 23 41 66");
        assert_eq!(parse_numbers(&text).unwrap(), numbers);
        assert!(parse_numbers("").unwrap().is_empty());
        assert!(parse_numbers("1 x 3").is_err());
    }

    #[test]
    fn test_generation_type_roundtrip() {
        for t in [
            GenerationType::Random,
            GenerationType::Trend,
            GenerationType::Manual,
        ] {
            let parsed: GenerationType = t.to_string().parse().unwrap();
            assert_eq!(parsed, t);
        }
        assert!("autre".parse::<GenerationType>().is_err());
    }
}
