use chrono::NaiveDate;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

use luckylens_db::games::Game;
use luckylens_db::models::{GeneratedSet, HistoricalDraw, NumberSet};
use luckylens_gen::trends::{FrequencyEntry, cold_numbers, hot_numbers};

use crate::import::ImportResult;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn numbers_str(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

pub fn display_games(games: &[Game]) {
    let mut table = new_table(vec!["Id", "Jeu", "Région", "Formule", "Jours de tirage"]);
    for game in games {
        let formula = if game.secondary_count > 0 {
            format!(
                "{} / {} + {} {} / {}",
                game.primary_count,
                game.primary_max,
                game.secondary_count,
                game.bonus_label,
                game.secondary_max
            )
        } else {
            format!("{} / {}", game.primary_count, game.primary_max)
        };
        let days = if game.draws_daily() {
            "Quotidien".to_string()
        } else {
            game.draw_days
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        table.add_row(vec![
            game.id.to_string(),
            game.name.to_string(),
            game.region.to_string(),
            formula,
            days,
        ]);
    }
    println!("{table}");
}

pub fn display_generated_sets(sets: &[NumberSet], game: &Game) {
    println!("\n🎲 Grilles générées pour {}\n", game.name);

    let bonus_header = if game.bonus_label.is_empty() {
        "Bonus"
    } else {
        game.bonus_label
    };
    let mut table = new_table(vec!["#", "Numéros", bonus_header]);
    for (i, set) in sets.iter().enumerate() {
        table.add_row(vec![
            format!("{}", i + 1),
            numbers_str(&set.primary),
            numbers_str(&set.secondary),
        ]);
    }
    println!("{table}");
}

pub fn display_draws(draws: &[HistoricalDraw], game: &Game) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    println!("\n📅 Derniers tirages de {}\n", game.name);
    let mut table = new_table(vec!["Date", "Numéros", "Bonus", "Jackpot"]);
    for draw in draws {
        let jackpot = if draw.jackpot.is_empty() {
            "—".to_string()
        } else {
            draw.jackpot.clone()
        };
        table.add_row(vec![
            draw.date.format("%Y-%m-%d").to_string(),
            numbers_str(&draw.numbers.primary),
            numbers_str(&draw.numbers.secondary),
            jackpot,
        ]);
    }
    println!("{table}");
}

pub fn display_saved_sets(sets: &[GeneratedSet]) {
    if sets.is_empty() {
        println!("Aucune grille sauvegardée.");
        return;
    }

    println!("\n💾 Grilles sauvegardées\n");
    let mut table = new_table(vec!["Id", "Date", "Jeu", "Numéros", "Bonus", "Type"]);
    for set in sets {
        table.add_row(vec![
            set.id.map(|i| i.to_string()).unwrap_or_default(),
            set.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            set.game_id.clone(),
            numbers_str(&set.numbers.primary),
            numbers_str(&set.numbers.secondary),
            set.generation_type.to_string(),
        ]);
    }
    println!("{table}");
}

pub struct TrendReport<'a> {
    pub main: &'a [FrequencyEntry],
    pub bonus: &'a [FrequencyEntry],
    pub draw_count: u32,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub even_odd: (f64, f64),
    pub high_low: (f64, f64),
}

pub fn display_trends(game: &Game, report: &TrendReport<'_>) {
    println!("\n📊 Tendances pour {} ({} tirages)", game.name, report.draw_count);
    if let Some((earliest, latest)) = report.date_range {
        println!(
            "   Période couverte : du {} au {}",
            earliest.format("%Y-%m-%d"),
            latest.format("%Y-%m-%d")
        );
    }

    println!("\n── Numéros principaux (1-{}) ──", game.primary_max);
    display_frequency_table(report.main, 10);

    if game.secondary_count > 0 {
        println!("\n── {} (1-{}) ──", game.bonus_label, game.secondary_max);
        display_frequency_table(report.bonus, 5);
    }

    let (even, odd) = report.even_odd;
    let (high, low) = report.high_low;
    println!("\nMoyennes par tirage :");
    println!("  Pairs / Impairs : {:.1} / {:.1}", even, odd);
    println!("  Hauts / Bas     : {:.1} / {:.1}", high, low);
}

fn display_frequency_table(frequencies: &[FrequencyEntry], highlight: usize) {
    let hot: Vec<u8> = hot_numbers(frequencies, highlight)
        .iter()
        .filter(|f| f.count > 0)
        .map(|f| f.number)
        .collect();
    let cold: Vec<u8> = cold_numbers(frequencies, highlight)
        .iter()
        .map(|f| f.number)
        .collect();

    let mut table = new_table(vec!["Numéro", "Fréquence", "Dernier tirage", "Tag"]);
    for entry in frequencies {
        let (tag, color) = if hot.contains(&entry.number) {
            ("HOT", Color::Green)
        } else if cold.contains(&entry.number) {
            ("COLD", Color::Red)
        } else {
            ("-", Color::White)
        };
        let last = entry
            .last_drawn
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "Jamais".to_string());
        table.add_row(vec![
            Cell::new(format!("{:2}", entry.number)),
            Cell::new(entry.count.to_string()),
            Cell::new(last),
            Cell::new(tag).fg(color),
        ]);
    }
    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}
