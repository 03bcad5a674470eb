use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::path::Path;

use luckylens_db::db::upsert_draw;
use luckylens_db::games::Game;
use luckylens_db::models::{HistoricalDraw, NumberSet, validate_set};
use luckylens_db::rusqlite::Connection;

/// Entrée d'un fichier de résultats, au format produit par la couche de
/// synchronisation (camelCase ; `bonusBall` vaut 0 pour les jeux sans
/// numéro bonus).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawFileEntry {
    pub draw_date: String,
    pub main_balls: Vec<u8>,
    pub bonus_ball: u8,
    #[serde(default)]
    pub jackpot_amount: String,
}

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

/// Accepte "AAAA-MM-JJ" tel quel ainsi que les horodatages ISO dont la
/// date forme le préfixe.
pub fn parse_draw_date(raw: &str) -> Result<NaiveDate> {
    let prefix = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
        .with_context(|| format!("Date de tirage illisible : '{}'", raw))
}

fn entry_to_draw(game: &Game, entry: &DrawFileEntry) -> Result<HistoricalDraw> {
    let date = parse_draw_date(&entry.draw_date)?;

    let mut primary = entry.main_balls.clone();
    primary.sort_unstable();

    let secondary = if game.secondary_count == 0 || entry.bonus_ball == 0 {
        Vec::new()
    } else {
        vec![entry.bonus_ball]
    };

    let numbers = NumberSet { primary, secondary };
    validate_set(game, &numbers)?;

    Ok(HistoricalDraw {
        id: None,
        game_id: game.id.to_string(),
        date,
        numbers,
        jackpot: entry.jackpot_amount.clone(),
        winners: 0,
    })
}

/// Importe un fichier JSON de résultats dans une seule transaction.
/// Les entrées illisibles sont signalées et comptées, jamais bloquantes.
pub fn import_json(conn: &Connection, game: &Game, path: &Path) -> Result<ImportResult> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
    let entries: Vec<DrawFileEntry> = serde_json::from_str(&content)
        .with_context(|| format!("JSON invalide dans {:?}", path))?;

    if entries.is_empty() {
        bail!("Aucun tirage dans {:?}", path);
    }

    let tx = conn
        .unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let bar = ProgressBar::new(entries.len() as u64);
    bar.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} tirages")
        .unwrap()
        .progress_chars("=> "));

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        errors: 0,
    };

    for entry in &entries {
        result.total_records += 1;
        match entry_to_draw(game, entry) {
            Ok(draw) => match upsert_draw(&tx, &draw) {
                Ok(true) => result.inserted += 1,
                Ok(false) => result.skipped += 1,
                Err(e) => {
                    eprintln!("Erreur insertion tirage {}: {}", result.total_records, e);
                    result.errors += 1;
                }
            },
            Err(e) => {
                eprintln!("Erreur tirage {}: {}", result.total_records, e);
                result.errors += 1;
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    tx.commit().context("Échec du commit")?;
    Ok(result)
}
