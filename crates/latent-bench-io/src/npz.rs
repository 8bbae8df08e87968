use std::fs::File;
use std::path::Path;

use ndarray::{Array3, ArrayD, Ix3, IxDyn, OwnedRepr};
use ndarray_npy::NpzReader;

use crate::error::{IoError, IoResult};

/// Latent samples stored in a `.npz` archive, one
/// `(n_draws, n_subjects, latent_dim)` array per model key.
#[derive(Debug, Clone, Default)]
pub struct LatentArchive {
    entries: Vec<(String, Array3<f64>)>,
}

impl LatentArchive {
    /// Read every array of the archive, in archive order.
    ///
    /// `f32` arrays are widened to `f64`.
    pub fn open(path: impl AsRef<Path>) -> IoResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| IoError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut npz = NpzReader::new(file)?;
        let names = npz.names()?;

        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let key = name.strip_suffix(".npy").unwrap_or(&name).to_string();
            let array: ArrayD<f64> = match npz.by_name::<_, IxDyn>(&name) {
                Ok(array) => array,
                Err(err) => match npz.by_name::<OwnedRepr<f32>, IxDyn>(&name) {
                    Ok(array) => array.mapv(f64::from),
                    Err(_) => return Err(err.into()),
                },
            };
            let shape = array.shape().to_vec();
            let array = array
                .into_dimensionality::<Ix3>()
                .map_err(|_| IoError::BadShape {
                    name: key.clone(),
                    shape,
                })?;
            log::debug!("{}: {} array {:?}", path.display(), key, array.dim());
            entries.push((key, array));
        }
        Ok(LatentArchive { entries })
    }

    pub fn from_entries(entries: Vec<(String, Array3<f64>)>) -> Self {
        LatentArchive { entries }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        keys
    }

    pub fn get(&self, key: &str) -> Option<&Array3<f64>> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, a)| a)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Array3<f64>)> {
        self.entries.iter().map(|(k, a)| (k.as_str(), a))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
