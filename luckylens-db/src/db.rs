use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use std::path::Path;

use crate::models::{
    GeneratedSet, HistoricalDraw, NumberSet, Settings, join_numbers, parse_numbers,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS generated_sets (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp         TEXT NOT NULL,
    game_id           TEXT NOT NULL,
    primary_numbers   TEXT NOT NULL,
    secondary_numbers TEXT NOT NULL DEFAULT '',
    generation_type   TEXT NOT NULL,
    saved             INTEGER NOT NULL DEFAULT 0,
    notes             TEXT NOT NULL DEFAULT '',
    batch_id          TEXT
);
CREATE INDEX IF NOT EXISTS idx_generated_sets_game ON generated_sets(game_id, saved);

CREATE TABLE IF NOT EXISTS historical_draws (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    game_id           TEXT NOT NULL,
    date              TEXT NOT NULL,
    primary_numbers   TEXT NOT NULL,
    secondary_numbers TEXT NOT NULL DEFAULT '',
    jackpot           TEXT NOT NULL DEFAULT '',
    winners           INTEGER NOT NULL DEFAULT 0,
    UNIQUE(game_id, date)
);

CREATE TABLE IF NOT EXISTS settings (
    id                INTEGER PRIMARY KEY CHECK (id = 1),
    default_game_id   TEXT NOT NULL,
    no_repeat         INTEGER NOT NULL,
    auto_save         INTEGER NOT NULL,
    default_set_count INTEGER NOT NULL
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("luckylens.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

/// Identifiant partagé par toutes les grilles sauvegardées d'un même lot.
pub fn new_batch_id() -> String {
    format!("{:x}", Utc::now().timestamp_millis())
}

/// Insère un lot de grilles dans une seule transaction.
pub fn insert_sets(conn: &Connection, sets: &[GeneratedSet]) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;
    for set in sets {
        tx.execute(
            "INSERT INTO generated_sets
             (timestamp, game_id, primary_numbers, secondary_numbers, generation_type, saved, notes, batch_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                set.timestamp.to_rfc3339(),
                set.game_id,
                join_numbers(&set.numbers.primary),
                join_numbers(&set.numbers.secondary),
                set.generation_type.to_string(),
                set.saved,
                set.notes,
                set.batch_id,
            ],
        )
        .context("Échec de l'insertion de la grille")?;
    }
    tx.commit().context("Échec du commit")?;
    Ok(())
}

/// Dernière grille sauvegardée pour un jeu, l'entrée de la politique
/// anti-répétition. `None` si aucune grille n'a été sauvegardée.
pub fn last_saved_set(conn: &Connection, game_id: &str) -> Result<Option<NumberSet>> {
    let mut stmt = conn.prepare(
        "SELECT primary_numbers, secondary_numbers FROM generated_sets
         WHERE game_id = ?1 AND saved = 1
         ORDER BY id DESC LIMIT 1",
    )?;
    let row: Option<(String, String)> = stmt
        .query_row([game_id], |row| Ok((row.get(0)?, row.get(1)?)))
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })?;
    match row {
        Some((primary, secondary)) => Ok(Some(NumberSet {
            primary: parse_numbers(&primary)?,
            secondary: parse_numbers(&secondary)?,
        })),
        None => Ok(None),
    }
}

/// Grilles sauvegardées, les plus récentes d'abord, avec filtre de jeu
/// optionnel.
pub fn fetch_saved_sets(conn: &Connection, game_id: Option<&str>) -> Result<Vec<GeneratedSet>> {
    let mut stmt = conn.prepare(
        "SELECT id, timestamp, game_id, primary_numbers, secondary_numbers,
                generation_type, saved, notes, batch_id
         FROM generated_sets
         WHERE (?1 IS NULL OR game_id = ?1)
         ORDER BY timestamp DESC, id DESC",
    )?;
    let rows = stmt
        .query_map([game_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, bool>(6)?,
                row.get::<_, String>(7)?,
                row.get::<_, Option<String>>(8)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, ts, game, primary, secondary, gen_type, saved, notes, batch_id)| {
            Ok(GeneratedSet {
                id: Some(id),
                timestamp: DateTime::parse_from_rfc3339(&ts)
                    .with_context(|| format!("Horodatage illisible : '{}'", ts))?
                    .with_timezone(&Utc),
                game_id: game,
                numbers: NumberSet {
                    primary: parse_numbers(&primary)?,
                    secondary: parse_numbers(&secondary)?,
                },
                generation_type: gen_type.parse()?,
                saved,
                notes,
                batch_id,
            })
        })
        .collect()
}

pub fn count_generated(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM generated_sets", [], |row| row.get(0))?;
    Ok(count)
}

pub fn delete_set(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM generated_sets WHERE id = ?1", [id])?;
    Ok(changed > 0)
}

/// Supprime les grilles d'un jeu, ou toutes si `game_id` est `None`.
pub fn clear_sets(conn: &Connection, game_id: Option<&str>) -> Result<u32> {
    let changed = conn.execute(
        "DELETE FROM generated_sets WHERE (?1 IS NULL OR game_id = ?1)",
        [game_id],
    )?;
    Ok(changed as u32)
}

/// Insère un tirage officiel, en ignorant les doublons (même jeu, même
/// date). Retourne `true` si le tirage a réellement été inséré.
pub fn upsert_draw(conn: &Connection, draw: &HistoricalDraw) -> Result<bool> {
    let changed = conn
        .execute(
            "INSERT OR IGNORE INTO historical_draws
             (game_id, date, primary_numbers, secondary_numbers, jackpot, winners)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                draw.game_id,
                draw.date.format("%Y-%m-%d").to_string(),
                join_numbers(&draw.numbers.primary),
                join_numbers(&draw.numbers.secondary),
                draw.jackpot,
                draw.winners,
            ],
        )
        .context("Échec de l'insertion du tirage")?;
    Ok(changed > 0)
}

/// Tirages officiels d'un jeu, les plus récents d'abord.
pub fn fetch_draws(conn: &Connection, game_id: &str, limit: u32) -> Result<Vec<HistoricalDraw>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, primary_numbers, secondary_numbers, jackpot, winners
         FROM historical_draws
         WHERE game_id = ?1
         ORDER BY date DESC, id DESC
         LIMIT ?2",
    )?;
    let rows = stmt
        .query_map(rusqlite::params![game_id, limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, u32>(5)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, date, primary, secondary, jackpot, winners)| {
            Ok(HistoricalDraw {
                id: Some(id),
                game_id: game_id.to_string(),
                date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                    .with_context(|| format!("Date illisible : '{}'", date))?,
                numbers: NumberSet {
                    primary: parse_numbers(&primary)?,
                    secondary: parse_numbers(&secondary)?,
                },
                jackpot,
                winners,
            })
        })
        .collect()
}

pub fn count_draws(conn: &Connection, game_id: &str) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM historical_draws WHERE game_id = ?1",
        [game_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Supprime les tirages d'un jeu, ou tous si `game_id` est `None`.
pub fn clear_draws(conn: &Connection, game_id: Option<&str>) -> Result<u32> {
    let changed = conn.execute(
        "DELETE FROM historical_draws WHERE (?1 IS NULL OR game_id = ?1)",
        [game_id],
    )?;
    Ok(changed as u32)
}

/// Préférences utilisateur ; la ligne est créée avec les valeurs par
/// défaut à la première lecture.
pub fn get_settings(conn: &Connection) -> Result<Settings> {
    let row: Option<Settings> = conn
        .query_row(
            "SELECT default_game_id, no_repeat, auto_save, default_set_count
             FROM settings WHERE id = 1",
            [],
            |row| {
                Ok(Settings {
                    default_game_id: row.get(0)?,
                    no_repeat: row.get(1)?,
                    auto_save: row.get(2)?,
                    default_set_count: row.get(3)?,
                })
            },
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })?;

    match row {
        Some(settings) => Ok(settings),
        None => {
            let defaults = Settings::default();
            update_settings(conn, &defaults)?;
            Ok(defaults)
        }
    }
}

pub fn update_settings(conn: &Connection, settings: &Settings) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO settings (id, default_game_id, no_repeat, auto_save, default_set_count)
         VALUES (1, ?1, ?2, ?3, ?4)",
        rusqlite::params![
            settings.default_game_id,
            settings.no_repeat,
            settings.auto_save,
            settings.default_set_count,
        ],
    )
    .context("Échec de la mise à jour des préférences")?;
    Ok(())
}
