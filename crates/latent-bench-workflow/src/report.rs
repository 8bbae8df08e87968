use std::path::Path;

use latent_bench_io::{IoResult, TsvWriter};
use latent_bench_stats::{Condition, PairwiseRow};
use serde::Serialize;

/// Best search outcome of one draw, as written to `predict_cv_<dataset>.tsv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CvRecord {
    /// Draw index.
    pub model: usize,
    pub best_score: String,
    pub std_best: String,
    /// Best parameters as a JSON object.
    pub params: String,
    pub qname: String,
    pub latent: String,
}

/// Held-out scores of one target, one entry per latent key in archive order.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetScores {
    pub qname: String,
    /// `MAE` or `AUC ROC`.
    pub metric: String,
    pub latents: Vec<(String, Vec<f64>)>,
}

impl TargetScores {
    pub fn conditions(&self) -> Vec<Condition> {
        self.latents
            .iter()
            .map(|(key, values)| Condition::new(key.clone(), values.clone()))
            .collect()
    }

    fn n_draws(&self) -> usize {
        self.latents.iter().map(|(_, v)| v.len()).max().unwrap_or(0)
    }
}

/// `qname` then one column per latent key, one row per draw per target.
pub fn write_scores(path: &Path, keys: &[String], scores: &[TargetScores]) -> IoResult<()> {
    let mut writer = TsvWriter::create(path)?;
    let header: Vec<&str> = std::iter::once("qname")
        .chain(keys.iter().map(String::as_str))
        .collect();
    writer.write_row(&header)?;
    for target in scores {
        for draw in 0..target.n_draws() {
            let mut row = vec![target.qname.clone()];
            for key in keys {
                let value = target
                    .latents
                    .iter()
                    .find(|(k, _)| k == key)
                    .and_then(|(_, v)| v.get(draw))
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                row.push(value);
            }
            writer.write_row(&row)?;
        }
    }
    writer.finish()?;
    Ok(())
}

pub fn write_cv_records(path: &Path, records: &[CvRecord]) -> IoResult<()> {
    latent_bench_io::write_tsv(path, records)
}

pub fn write_pairwise(path: &Path, rows: &[PairwiseRow]) -> IoResult<()> {
    latent_bench_io::write_tsv(path, rows)
}
