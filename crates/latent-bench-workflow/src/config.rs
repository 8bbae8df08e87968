use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{WorkflowError, WorkflowResult};

/// Settings of one prediction benchmark run.
///
/// Every field has a default so a TOML file only needs the ones it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictConfig {
    /// Dataset name used in every input and output file name.
    pub dataset: String,
    pub datadir: PathBuf,
    pub outdir: PathBuf,
    /// Metadata columns to predict; all training columns when unset.
    pub targets: Option<Vec<String>>,
    /// Metadata columns balanced across the search splits.
    pub stratify: Option<Vec<String>>,
    pub n_splits: usize,
    pub test_size: f64,
    pub seed: u64,
    pub one_sample_stars: bool,
    pub pairwise_stars: bool,
    pub report_t: bool,
    /// Draw `predict_<dataset>.png`.
    pub figure: bool,
}

impl Default for PredictConfig {
    fn default() -> Self {
        PredictConfig {
            dataset: String::new(),
            datadir: PathBuf::from("."),
            outdir: PathBuf::from("."),
            targets: None,
            stratify: None,
            n_splits: 5,
            test_size: 0.2,
            seed: 42,
            one_sample_stars: false,
            pairwise_stars: false,
            report_t: false,
            figure: true,
        }
    }
}

impl PredictConfig {
    pub fn new(
        dataset: impl Into<String>,
        datadir: impl Into<PathBuf>,
        outdir: impl Into<PathBuf>,
    ) -> Self {
        PredictConfig {
            dataset: dataset.into(),
            datadir: datadir.into(),
            outdir: outdir.into(),
            ..Default::default()
        }
    }

    pub fn from_toml_str(content: &str) -> WorkflowResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> WorkflowResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| WorkflowError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> WorkflowResult<()> {
        if self.dataset.is_empty() {
            return Err(WorkflowError::Config("dataset name is empty".into()));
        }
        if self.n_splits == 0 {
            return Err(WorkflowError::Config("n_splits must be at least 1".into()));
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(WorkflowError::Config(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        Ok(())
    }

    /// Configured stratification columns, else the dataset defaults.
    pub fn stratify_columns(&self) -> WorkflowResult<Vec<String>> {
        if let Some(columns) = &self.stratify {
            return Ok(columns.clone());
        }
        let defaults: &[&str] = match self.dataset.as_str() {
            "hbn" => &["site", "age", "sex"],
            "euaims" => &["site", "age", "sex", "fsiq", "asd"],
            other => return Err(WorkflowError::MissingStratification(other.to_string())),
        };
        Ok(defaults.iter().map(|s| s.to_string()).collect())
    }

    /// `latent_vecs_<split>_<dataset>.npz` in `datadir`.
    pub fn latent_path(&self, split: &str) -> PathBuf {
        self.datadir
            .join(format!("latent_vecs_{}_{}.npz", split, self.dataset))
    }

    /// `latent_meta_<split>_<dataset>.tsv` in `datadir`.
    pub fn meta_path(&self, split: &str) -> PathBuf {
        self.datadir
            .join(format!("latent_meta_{}_{}.tsv", split, self.dataset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_fills_defaults() {
        let config = PredictConfig::from_toml_str(
            r#"
            dataset = "hbn"
            datadir = "/data"
            targets = ["age", "sex"]
            "#,
        )
        .unwrap();
        assert_eq!(config.dataset, "hbn");
        assert_eq!(config.datadir, PathBuf::from("/data"));
        assert_eq!(config.targets, Some(vec!["age".to_string(), "sex".to_string()]));
        assert_eq!(config.n_splits, 5);
        assert_eq!(config.seed, 42);
        assert!(config.figure);
        assert!(!config.one_sample_stars);
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            PredictConfig::from_toml_str("n_splits = \"five\""),
            Err(WorkflowError::Toml(_))
        ));
    }

    #[test]
    fn test_default_stratification() {
        let hbn = PredictConfig::new("hbn", ".", ".");
        assert_eq!(hbn.stratify_columns().unwrap(), vec!["site", "age", "sex"]);
        let euaims = PredictConfig::new("euaims", ".", ".");
        assert_eq!(euaims.stratify_columns().unwrap().len(), 5);
        let other = PredictConfig::new("ukb", ".", ".");
        assert!(matches!(
            other.stratify_columns(),
            Err(WorkflowError::MissingStratification(_))
        ));
    }

    #[test]
    fn test_paths() {
        let config = PredictConfig::new("hbn", "/data", "/out");
        assert_eq!(
            config.latent_path("train"),
            PathBuf::from("/data/latent_vecs_train_hbn.npz")
        );
        assert_eq!(
            config.meta_path("test"),
            PathBuf::from("/data/latent_meta_test_hbn.tsv")
        );
    }

    #[test]
    fn test_validate() {
        assert!(PredictConfig::new("hbn", ".", ".").validate().is_ok());
        assert!(PredictConfig::default().validate().is_err());
        let mut config = PredictConfig::new("hbn", ".", ".");
        config.test_size = 1.0;
        assert!(config.validate().is_err());
    }
}
