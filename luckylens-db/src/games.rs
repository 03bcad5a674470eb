use anyhow::{Result, bail};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Configuration d'un jeu de loterie : effectifs et bornes des deux
/// bassins de numéros, plus le calendrier des tirages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub id: &'static str,
    pub name: &'static str,
    pub region: &'static str,
    pub primary_count: usize,
    pub primary_max: u8,
    pub secondary_count: usize,
    pub secondary_max: u8,
    pub bonus_label: &'static str,
    pub draw_days: &'static [Weekday],
    pub description: &'static str,
}

impl Game {
    /// Vérifie la cohérence de la configuration avant toute boucle de
    /// tirage : demander plus de numéros distincts que le bassin n'en
    /// contient rendrait la collecte sans remise impossible.
    pub fn validate(&self) -> Result<()> {
        if self.primary_count > self.primary_max as usize {
            bail!(
                "Configuration invalide pour {} : {} numéros demandés dans un bassin de {}",
                self.name,
                self.primary_count,
                self.primary_max
            );
        }
        if self.secondary_count > self.secondary_max as usize {
            bail!(
                "Configuration invalide pour {} : {} bonus demandés dans un bassin de {}",
                self.name,
                self.secondary_count,
                self.secondary_max
            );
        }
        Ok(())
    }

    /// Prochaine date de tirage strictement après `from`, selon les
    /// jours de tirage du jeu.
    pub fn next_draw_date(&self, from: NaiveDate) -> NaiveDate {
        for offset in 1..=7 {
            let candidate = from + Duration::days(offset);
            if self.draw_days.contains(&candidate.weekday()) {
                return candidate;
            }
        }
        // Jamais atteint dès qu'au moins un jour de tirage existe.
        from + Duration::days(1)
    }

    pub fn draws_daily(&self) -> bool {
        self.draw_days.len() == 7
    }
}

const EVERY_DAY: &[Weekday] = &[
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub const GAMES: &[Game] = &[
    Game {
        id: "powerball",
        name: "Powerball",
        region: "USA",
        primary_count: 5,
        primary_max: 69,
        secondary_count: 1,
        secondary_max: 26,
        bonus_label: "Powerball",
        draw_days: &[Weekday::Mon, Weekday::Wed, Weekday::Sat],
        description: "La loterie américaine aux jackpots records",
    },
    Game {
        id: "megamillions",
        name: "Mega Millions",
        region: "USA",
        primary_count: 5,
        primary_max: 70,
        secondary_count: 1,
        secondary_max: 25,
        bonus_label: "Mega Ball",
        draw_days: &[Weekday::Tue, Weekday::Fri],
        description: "Gros jackpots avec option Megaplier",
    },
    Game {
        id: "luckyforlife",
        name: "Lucky for Life",
        region: "USA",
        primary_count: 5,
        primary_max: 48,
        secondary_count: 1,
        secondary_max: 18,
        bonus_label: "Lucky Ball",
        draw_days: &[Weekday::Mon, Weekday::Thu],
        description: "1 000 $ par jour à vie",
    },
    Game {
        id: "cash4life",
        name: "Cash4Life",
        region: "USA",
        primary_count: 5,
        primary_max: 60,
        secondary_count: 1,
        secondary_max: 4,
        bonus_label: "Cash Ball",
        draw_days: EVERY_DAY,
        description: "1 000 $ par jour à vie, tirage quotidien",
    },
    Game {
        id: "lottoamerica",
        name: "Lotto America",
        region: "USA",
        primary_count: 5,
        primary_max: 52,
        secondary_count: 1,
        secondary_max: 10,
        bonus_label: "Star Ball",
        draw_days: &[Weekday::Mon, Weekday::Wed, Weekday::Sat],
        description: "Loterie multi-états avec bonus Star Ball",
    },
    Game {
        id: "superlottoplus",
        name: "SuperLotto Plus",
        region: "Californie",
        primary_count: 5,
        primary_max: 47,
        secondary_count: 1,
        secondary_max: 27,
        bonus_label: "Mega",
        draw_days: &[Weekday::Wed, Weekday::Sat],
        description: "La loterie d'état californienne",
    },
    Game {
        id: "fantasy5",
        name: "Fantasy 5",
        region: "Californie",
        primary_count: 5,
        primary_max: 39,
        secondary_count: 0,
        secondary_max: 0,
        bonus_label: "",
        draw_days: EVERY_DAY,
        description: "Tirage quotidien sans numéro bonus",
    },
];

pub fn all_games() -> &'static [Game] {
    GAMES
}

pub fn game_by_id(id: &str) -> Option<&'static Game> {
    GAMES.iter().find(|g| g.id == id)
}

pub fn default_game() -> &'static Game {
    &GAMES[0]
}
