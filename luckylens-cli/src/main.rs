mod display;
mod import;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};

use luckylens_db::db::{
    clear_draws, clear_sets, count_draws, count_generated, db_path, delete_set, fetch_draws,
    fetch_saved_sets, get_settings, insert_sets, last_saved_set, migrate, new_batch_id, open_db,
    update_settings,
};
use luckylens_db::games::{Game, all_games, game_by_id};
use luckylens_db::models::{GeneratedSet, GenerationType, NumberSet, validate_set};
use luckylens_gen::batch::{GenerationMode, generate_batch};
use luckylens_gen::rng::source_from_seed;
use luckylens_gen::trends::{
    compute_frequencies, date_range, even_odd_average, frequency_maps, high_low_average,
};

use crate::display::{
    TrendReport, display_draws, display_games, display_generated_sets, display_import_summary,
    display_saved_sets, display_trends,
};

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum Mode {
    #[default]
    Random,
    Trend,
}

impl From<Mode> for GenerationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Random => GenerationMode::Random,
            Mode::Trend => GenerationMode::Trend,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ClearTarget {
    /// Grilles sauvegardées
    Sets,
    /// Tirages importés
    Results,
}

#[derive(Parser)]
#[command(name = "luckylens", about = "Générateur de grilles de loterie")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lister les jeux disponibles
    Games,

    /// Générer des grilles (aléatoire ou tendance)
    Generate {
        /// Identifiant du jeu (défaut : jeu des préférences)
        #[arg(short, long)]
        game: Option<String>,

        /// Nombre de grilles (1-5)
        #[arg(short, long)]
        count: Option<u32>,

        /// Mode de génération
        #[arg(short, long, default_value = "random")]
        mode: Mode,

        /// Éviter de reproduire la dernière grille sauvegardée
        #[arg(long)]
        no_repeat: bool,

        /// Sauvegarder les grilles générées
        #[arg(short, long)]
        save: bool,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Saisir et sauvegarder une grille manuellement
    Pick {
        /// Identifiant du jeu (défaut : jeu des préférences)
        #[arg(short, long)]
        game: Option<String>,
    },

    /// Importer des résultats de tirage depuis un fichier JSON
    Import {
        /// Identifiant du jeu
        #[arg(short, long)]
        game: String,

        /// Chemin vers le fichier JSON
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Afficher les derniers tirages importés
    Results {
        /// Identifiant du jeu (défaut : jeu des préférences)
        #[arg(short, long)]
        game: Option<String>,

        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Statistiques de fréquence (numéros chauds et froids)
    Trends {
        /// Identifiant du jeu (défaut : jeu des préférences)
        #[arg(short, long)]
        game: Option<String>,
    },

    /// Lister les grilles sauvegardées
    Saved {
        /// Filtrer par jeu
        #[arg(short, long)]
        game: Option<String>,
    },

    /// Supprimer une grille sauvegardée
    Delete {
        /// Identifiant de la grille
        id: i64,
    },

    /// Effacer les grilles sauvegardées ou les tirages importés
    Clear {
        /// Données à effacer
        target: ClearTarget,

        /// Limiter à un jeu
        #[arg(short, long)]
        game: Option<String>,
    },

    /// Afficher ou modifier les préférences
    Settings {
        /// Jeu par défaut
        #[arg(long)]
        default_game: Option<String>,

        /// Activer/désactiver l'anti-répétition
        #[arg(long)]
        no_repeat: Option<bool>,

        /// Sauvegarder automatiquement les grilles générées
        #[arg(long)]
        auto_save: Option<bool>,

        /// Nombre de grilles par défaut (1-5)
        #[arg(long)]
        set_count: Option<u32>,
    },

    /// Afficher le chemin de la base de données
    DbPath,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Games => {
            display_games(all_games());
            Ok(())
        }
        Command::Generate {
            game,
            count,
            mode,
            no_repeat,
            save,
            seed,
        } => cmd_generate(&conn, game.as_deref(), count, mode, no_repeat, save, seed),
        Command::Pick { game } => cmd_pick(&conn, game.as_deref()),
        Command::Import { game, file } => cmd_import(&conn, &game, &file),
        Command::Results { game, last } => cmd_results(&conn, game.as_deref(), last),
        Command::Trends { game } => cmd_trends(&conn, game.as_deref()),
        Command::Saved { game } => cmd_saved(&conn, game.as_deref()),
        Command::Delete { id } => cmd_delete(&conn, id),
        Command::Clear { target, game } => cmd_clear(&conn, target, game.as_deref()),
        Command::Settings {
            default_game,
            no_repeat,
            auto_save,
            set_count,
        } => cmd_settings(&conn, default_game.as_deref(), no_repeat, auto_save, set_count),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

/// Résout le jeu demandé, ou celui des préférences à défaut.
fn resolve_game(
    conn: &luckylens_db::rusqlite::Connection,
    id: Option<&str>,
) -> Result<&'static Game> {
    let settings = get_settings(conn)?;
    let id = id.unwrap_or(settings.default_game_id.as_str());
    match game_by_id(id) {
        Some(game) => Ok(game),
        None => bail!("Jeu inconnu : '{}'. Lancez : luckylens games", id),
    }
}

fn cmd_generate(
    conn: &luckylens_db::rusqlite::Connection,
    game: Option<&str>,
    count: Option<u32>,
    mode: Mode,
    no_repeat: bool,
    save: bool,
    seed: Option<u64>,
) -> Result<()> {
    let settings = get_settings(conn)?;
    let game = resolve_game(conn, game)?;

    let count = count.unwrap_or(settings.default_set_count);
    if !(1..=5).contains(&count) {
        bail!("Le nombre de grilles doit être entre 1 et 5");
    }

    let no_repeat = no_repeat || settings.no_repeat;

    // En mode tendance, les fréquences sont un instantané pris ici ; le
    // repli uniforme en l'absence d'historique est décidé par le moteur.
    let frequencies = match mode {
        Mode::Trend => {
            let n = count_draws(conn, game.id)?;
            if n == 0 {
                println!(
                    "Aucun historique pour {} : génération aléatoire. Lancez d'abord : luckylens import",
                    game.name
                );
                None
            } else {
                Some(frequency_maps(&fetch_draws(conn, game.id, n)?))
            }
        }
        Mode::Random => None,
    };

    // Lue une seule fois par lot, et seulement si l'anti-répétition est
    // active.
    let last_saved = if no_repeat {
        last_saved_set(conn, game.id)?
    } else {
        None
    };

    let mut rng = source_from_seed(seed);
    let sets = generate_batch(
        game,
        count as usize,
        no_repeat,
        last_saved.as_ref(),
        mode.into(),
        frequencies.as_ref(),
        rng.as_mut(),
    )?;

    display_generated_sets(&sets, game);

    if save || settings.auto_save {
        save_sets(conn, game, &sets, mode)?;
        println!("{} grille(s) sauvegardée(s).", sets.len());
    }

    Ok(())
}

fn save_sets(
    conn: &luckylens_db::rusqlite::Connection,
    game: &Game,
    sets: &[NumberSet],
    mode: Mode,
) -> Result<()> {
    let generation_type = match mode {
        Mode::Random => GenerationType::Random,
        Mode::Trend => GenerationType::Trend,
    };
    let batch_id = new_batch_id();
    let rows: Vec<GeneratedSet> = sets
        .iter()
        .map(|numbers| GeneratedSet {
            id: None,
            timestamp: Utc::now(),
            game_id: game.id.to_string(),
            numbers: numbers.clone(),
            generation_type,
            saved: true,
            notes: String::new(),
            batch_id: Some(batch_id.clone()),
        })
        .collect();
    insert_sets(conn, &rows)
}

fn cmd_pick(conn: &luckylens_db::rusqlite::Connection, game: Option<&str>) -> Result<()> {
    let game = resolve_game(conn, game)?;
    println!("Saisie d'une grille pour {}\n", game.name);

    let mut primary = prompt_numbers(
        &format!(
            "{} numéros (séparés par des espaces, 1-{}) : ",
            game.primary_count, game.primary_max
        ),
        game.primary_count,
    )?;
    primary.sort_unstable();

    let secondary = if game.secondary_count > 0 {
        prompt_numbers(
            &format!(
                "{} {} (1-{}) : ",
                game.secondary_count, game.bonus_label, game.secondary_max
            ),
            game.secondary_count,
        )?
    } else {
        Vec::new()
    };

    let numbers = NumberSet { primary, secondary };
    validate_set(game, &numbers)?;

    display_generated_sets(std::slice::from_ref(&numbers), game);

    let confirm = prompt("\nSauvegarder cette grille ? (o/n) : ")?;
    if confirm.trim().to_lowercase() == "o" {
        let row = GeneratedSet {
            id: None,
            timestamp: Utc::now(),
            game_id: game.id.to_string(),
            numbers,
            generation_type: GenerationType::Manual,
            saved: true,
            notes: String::new(),
            batch_id: None,
        };
        insert_sets(conn, std::slice::from_ref(&row))?;
        println!("Grille sauvegardée.");
    } else {
        println!("Saisie annulée.");
    }

    Ok(())
}

fn cmd_import(
    conn: &luckylens_db::rusqlite::Connection,
    game: &str,
    file: &PathBuf,
) -> Result<()> {
    let game = match game_by_id(game) {
        Some(game) => game,
        None => bail!("Jeu inconnu : '{}'. Lancez : luckylens games", game),
    };
    let result = import::import_json(conn, game, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_results(
    conn: &luckylens_db::rusqlite::Connection,
    game: Option<&str>,
    last: u32,
) -> Result<()> {
    let game = resolve_game(conn, game)?;
    let n = count_draws(conn, game.id)?;
    if n == 0 {
        println!(
            "Aucun tirage pour {}. Lancez d'abord : luckylens import",
            game.name
        );
        return Ok(());
    }
    let draws = fetch_draws(conn, game.id, last)?;
    display_draws(&draws, game);
    Ok(())
}

fn cmd_trends(conn: &luckylens_db::rusqlite::Connection, game: Option<&str>) -> Result<()> {
    let game = resolve_game(conn, game)?;
    let n = count_draws(conn, game.id)?;
    if n == 0 {
        println!(
            "Aucun tirage pour {}. Lancez d'abord : luckylens import",
            game.name
        );
        return Ok(());
    }
    let draws = fetch_draws(conn, game.id, n)?;

    let (main, bonus) = compute_frequencies(&draws, game);
    let report = TrendReport {
        main: &main,
        bonus: &bonus,
        draw_count: n,
        date_range: date_range(&draws),
        even_odd: even_odd_average(&draws),
        high_low: high_low_average(&draws, game),
    };
    display_trends(game, &report);
    Ok(())
}

fn cmd_saved(conn: &luckylens_db::rusqlite::Connection, game: Option<&str>) -> Result<()> {
    let sets = fetch_saved_sets(conn, game)?;
    display_saved_sets(&sets);
    if game.is_some() && !sets.is_empty() {
        println!("{} affichée(s) sur {} en base.", sets.len(), count_generated(conn)?);
    }
    Ok(())
}

fn cmd_delete(conn: &luckylens_db::rusqlite::Connection, id: i64) -> Result<()> {
    if delete_set(conn, id)? {
        println!("Grille {} supprimée.", id);
    } else {
        println!("Aucune grille avec l'identifiant {}.", id);
    }
    Ok(())
}

fn cmd_clear(
    conn: &luckylens_db::rusqlite::Connection,
    target: ClearTarget,
    game: Option<&str>,
) -> Result<()> {
    if let Some(id) = game {
        if game_by_id(id).is_none() {
            bail!("Jeu inconnu : '{}'. Lancez : luckylens games", id);
        }
    }

    let scope = match game {
        Some(id) => format!("pour {}", id),
        None => "pour tous les jeux".to_string(),
    };
    let what = match target {
        ClearTarget::Sets => "grilles sauvegardées",
        ClearTarget::Results => "tirages importés",
    };
    let confirm = prompt(&format!("Effacer les {} {} ? (o/n) : ", what, scope))?;
    if confirm.trim().to_lowercase() != "o" {
        println!("Effacement annulé.");
        return Ok(());
    }

    let removed = match target {
        ClearTarget::Sets => clear_sets(conn, game)?,
        ClearTarget::Results => clear_draws(conn, game)?,
    };
    println!("{} enregistrement(s) effacé(s).", removed);
    Ok(())
}

fn cmd_settings(
    conn: &luckylens_db::rusqlite::Connection,
    default_game: Option<&str>,
    no_repeat: Option<bool>,
    auto_save: Option<bool>,
    set_count: Option<u32>,
) -> Result<()> {
    let mut settings = get_settings(conn)?;

    let changed =
        default_game.is_some() || no_repeat.is_some() || auto_save.is_some() || set_count.is_some();

    if let Some(id) = default_game {
        if game_by_id(id).is_none() {
            bail!("Jeu inconnu : '{}'. Lancez : luckylens games", id);
        }
        settings.default_game_id = id.to_string();
    }
    if let Some(v) = no_repeat {
        settings.no_repeat = v;
    }
    if let Some(v) = auto_save {
        settings.auto_save = v;
    }
    if let Some(v) = set_count {
        if !(1..=5).contains(&v) {
            bail!("Le nombre de grilles par défaut doit être entre 1 et 5");
        }
        settings.default_set_count = v;
    }

    if changed {
        update_settings(conn, &settings)?;
        println!("Préférences mises à jour.\n");
    }

    println!("Jeu par défaut        : {}", settings.default_game_id);
    println!("Anti-répétition       : {}", if settings.no_repeat { "oui" } else { "non" });
    println!("Sauvegarde auto       : {}", if settings.auto_save { "oui" } else { "non" });
    println!("Grilles par défaut    : {}", settings.default_set_count);

    Ok(())
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    Ok(input.trim().to_string())
}

fn prompt_numbers(msg: &str, expected: usize) -> Result<Vec<u8>> {
    loop {
        let input = prompt(msg)?;
        let numbers: Result<Vec<u8>, _> = input
            .split_whitespace()
            .map(|s| s.parse::<u8>())
            .collect();
        match numbers {
            Ok(v) if v.len() == expected => return Ok(v),
            _ => println!("Entrez exactement {} numéro(s). Réessayez.", expected),
        }
    }
}
