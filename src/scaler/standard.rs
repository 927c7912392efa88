//! z = (x - mean) / std, column-wise.

use crate::error::{InsightError, Result};
use crate::features::FeatureSchema;
use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Per-column mean and population standard deviation, immutable once fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    /// Fingerprint of the feature schema the params were fit under
    pub schema_fingerprint: String,
    pub features: Vec<String>,
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

pub struct StandardScaler;

impl StandardScaler {
    /// Fit on the training matrix. Uses the population (n) denominator.
    pub fn fit(x: ArrayView2<'_, f64>, schema: &FeatureSchema) -> Result<ScalerParams> {
        if x.nrows() == 0 {
            return Err(InsightError::computation("cannot fit scaler on an empty matrix"));
        }
        if x.ncols() != schema.len() {
            return Err(InsightError::schema(format!(
                "matrix has {} columns, schema has {}",
                x.ncols(),
                schema.len()
            )));
        }
        let n = x.nrows() as f64;
        let mut mean = Vec::with_capacity(x.ncols());
        let mut std = Vec::with_capacity(x.ncols());
        for col in x.axis_iter(Axis(1)) {
            let m = col.sum() / n;
            let var = col.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
            mean.push(m);
            std.push(var.sqrt());
        }
        Ok(ScalerParams {
            schema_fingerprint: schema.fingerprint(),
            features: schema.names().into_iter().map(String::from).collect(),
            mean,
            std,
        })
    }
}

impl ScalerParams {
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Apply stored params. Columns with zero training spread map to 0.0.
    pub fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features() {
            return Err(InsightError::schema(format!(
                "expected {} feature columns, got {}",
                self.n_features(),
                x.ncols()
            )));
        }
        let mut out = x.to_owned();
        for (j, mut col) in out.axis_iter_mut(Axis(1)).enumerate() {
            let (m, s) = (self.mean[j], self.std[j]);
            if s == 0.0 {
                col.fill(0.0);
            } else {
                col.mapv_inplace(|v| (v - m) / s);
            }
        }
        Ok(out)
    }

    pub fn check_schema(&self, schema: &FeatureSchema) -> Result<()> {
        let expected = schema.fingerprint();
        if self.schema_fingerprint != expected || self.n_features() != schema.len() {
            return Err(InsightError::schema(format!(
                "scaler was fit under schema {}, current schema is {}",
                self.schema_fingerprint, expected
            )));
        }
        if self.std.len() != self.mean.len() {
            return Err(InsightError::schema("scaler mean/std length mismatch"));
        }
        Ok(())
    }
}
