use anyhow::{Context, Result, bail};
use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng, TryRngCore};

/// Source de mots aléatoires 32 bits injectée dans tout le moteur de
/// génération, pour que l'algorithme ne dépende d'aucun état global et
/// reste testable avec une source déterministe.
pub trait RandomSource {
    fn next_u32(&mut self) -> Result<u32>;
}

/// Source cryptographique du système. L'indisponibilité de la source
/// est remontée en erreur, jamais masquée.
pub struct SecureSource;

impl RandomSource for SecureSource {
    fn next_u32(&mut self) -> Result<u32> {
        let mut rng = OsRng;
        rng.try_next_u32()
            .context("Source aléatoire système indisponible")
    }
}

/// Source déterministe dérivée d'un seed, pour la reproductibilité
/// (option --seed) et les tests.
pub struct SeededSource(StdRng);

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        SeededSource(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededSource {
    fn next_u32(&mut self) -> Result<u32> {
        Ok(self.0.next_u32())
    }
}

pub fn source_from_seed(seed: Option<u64>) -> Box<dyn RandomSource> {
    match seed {
        Some(s) => Box::new(SeededSource::new(s)),
        None => Box::new(SecureSource),
    }
}

/// Garde-fou purement défensif : la probabilité de rejet est inférieure
/// à 50 % par itération, la boucle converge donc en quelques tirages.
const MAX_REJECTIONS: u32 = 10_000;

/// Entier uniforme dans [min, max] inclus, par échantillonnage avec
/// rejet : les mots 32 bits au-delà du plus grand multiple de l'étendue
/// sont écartés, ce qui élimine le biais du modulo.
///
/// L'étendue 2^32 complète ferait dégénérer le seuil de rejet ; elle est
/// inatteignable depuis l'API publique (bassins ≤ 70, totaux de poids
/// très en deçà) et le garde-fou la signalerait en erreur.
pub fn random_int(rng: &mut dyn RandomSource, min: u32, max: u32) -> Result<u32> {
    if min > max {
        bail!("Intervalle invalide : [{}, {}]", min, max);
    }
    let range = (max - min) as u64 + 1;
    let max_value = u32::MAX as u64;
    let threshold = max_value - (max_value % range);

    for _ in 0..MAX_REJECTIONS {
        let value = rng.next_u32()? as u64;
        if value < threshold {
            return Ok(min + (value % range) as u32);
        }
    }
    bail!(
        "Échantillonnage non convergent sur [{}, {}] après {} rejets",
        min,
        max,
        MAX_REJECTIONS
    )
}
