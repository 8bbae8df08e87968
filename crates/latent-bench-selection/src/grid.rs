use std::collections::BTreeMap;

use latent_bench_core::{ParamSet, ParamValue};

/// `num` values evenly spaced on a log10 scale from `10^start` to `10^stop`.
pub fn logspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![10f64.powf(start)],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            (0..num).map(|i| 10f64.powf(start + step * i as f64)).collect()
        }
    }
}

/// Cartesian grid of parameter values.
///
/// Candidates enumerate names in sorted order with the last name varying
/// fastest.
#[derive(Debug, Clone, Default)]
pub struct ParamGrid {
    params: BTreeMap<String, Vec<ParamValue>>,
}

impl ParamGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<V: Into<ParamValue>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.params
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        if self.params.is_empty() {
            return 0;
        }
        self.params.values().map(Vec::len).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn candidates(&self) -> Vec<ParamSet> {
        if self.params.is_empty() {
            return Vec::new();
        }
        let mut out = vec![ParamSet::new()];
        for (name, values) in &self.params {
            let mut next = Vec::with_capacity(out.len() * values.len());
            for partial in &out {
                for value in values {
                    next.push(partial.clone().with(name.clone(), value.clone()));
                }
            }
            out = next;
        }
        out
    }
}
