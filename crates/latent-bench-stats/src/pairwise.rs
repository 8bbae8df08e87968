use serde::Serialize;

use crate::ttest::{significance_stars, ttest_ind};

/// Named group of scores, e.g. one latent model's scores across draws.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub name: String,
    pub values: Vec<f64>,
}

impl Condition {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Condition {
            name: name.into(),
            values,
        }
    }
}

/// One row of the pairwise statistics table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseRow {
    pub pair: String,
    pub tval: f64,
    pub pval: f64,
}

/// `qname-<key>_src-<a>_dest-<b>` with underscores in condition names dashed.
pub fn pair_name(key: &str, src: &str, dest: &str) -> String {
    format!(
        "qname-{}_src-{}_dest-{}",
        key,
        src.replace('_', "-"),
        dest.replace('_', "-")
    )
}

/// Independent t-tests over every ordered pair of conditions, self pairs included.
pub fn pairwise_ttests(key: &str, conditions: &[Condition]) -> Vec<PairwiseRow> {
    let mut rows = Vec::with_capacity(conditions.len() * conditions.len());
    for src in conditions {
        for dest in conditions {
            let res = ttest_ind(&src.values, &dest.values);
            let dof = src.values.len() as i64 - 1;
            if res.pvalue > 0.001 {
                log::info!(
                    "{} {} >  {} | t({}) = {:.2} p = {:.2}",
                    key,
                    src.name,
                    dest.name,
                    dof,
                    res.statistic,
                    res.pvalue
                );
            } else {
                log::info!(
                    "{} {} >  {} | t({}) = {:.2} p < .001",
                    key,
                    src.name,
                    dest.name,
                    dof,
                    res.statistic
                );
            }
            rows.push(PairwiseRow {
                pair: pair_name(key, &src.name, &dest.name),
                tval: res.statistic,
                pval: res.pvalue,
            });
        }
    }
    rows
}

/// Unordered pairs `(i, j)`, `i < j`, whose p-value earns at least one star.
///
/// `rows` must come from [`pairwise_ttests`] over `n_conditions` conditions.
pub fn significant_pairs(
    rows: &[PairwiseRow],
    n_conditions: usize,
) -> Vec<(usize, usize, &'static str)> {
    let mut pairs = Vec::new();
    for i in 0..n_conditions {
        for j in (i + 1)..n_conditions {
            if let Some(row) = rows.get(i * n_conditions + j) {
                let stars = significance_stars(row.pval);
                if stars != "n.s." {
                    pairs.push((i, j, stars));
                }
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditions() -> Vec<Condition> {
        vec![
            Condition::new("vae_model_rois", vec![0.50, 0.52, 0.51, 0.49, 0.50]),
            Condition::new("pca_rois", vec![0.10, 0.12, 0.11, 0.09, 0.10]),
            Condition::new("ae_rois", vec![0.49, 0.53, 0.50, 0.50, 0.51]),
        ]
    }

    #[test]
    fn test_pair_name() {
        assert_eq!(
            pair_name("age", "vae_model_rois", "pca_rois"),
            "qname-age_src-vae-model-rois_dest-pca-rois"
        );
    }

    #[test]
    fn test_all_ordered_pairs() {
        let rows = pairwise_ttests("age", &conditions());
        assert_eq!(rows.len(), 9);
        assert_eq!(rows[1].pair, "qname-age_src-vae-model-rois_dest-pca-rois");
        assert!(rows[0].tval.is_nan() || rows[0].tval == 0.0);
        assert!(rows[1].tval > 0.0);
        assert!(rows[3].tval < 0.0);
    }

    #[test]
    fn test_significant_pairs() {
        let conds = conditions();
        let rows = pairwise_ttests("age", &conds);
        let sig = significant_pairs(&rows, conds.len());
        let pairs: Vec<(usize, usize)> = sig.iter().map(|&(i, j, _)| (i, j)).collect();
        assert_eq!(pairs, vec![(0, 1), (1, 2)]);
        assert!(sig.iter().all(|&(_, _, s)| s == "***"));
    }
}
