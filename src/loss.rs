use ndarray::{Array2, Axis};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Loss {
    /// Categorical cross-entropy over the softmax of raw logits
    CategoricalCrossEntropy,
}

impl Loss {
    /// Mean loss over the batch rows.
    pub fn calculate(&self, logits: &Array2<f32>, targets: &Array2<f32>) -> f32 {
        match self {
            Loss::CategoricalCrossEntropy => {
                // -Σ(target * log(prediction)), clamped away from log(0)
                let epsilon = 1e-7;
                let probabilities = softmax(logits).mapv(|x| x.clamp(epsilon, 1.0 - epsilon));
                let total = -(targets * &probabilities.mapv(f32::ln)).sum();
                total / logits.nrows().max(1) as f32
            }
        }
    }

    /// Gradient of the mean loss with respect to the logits.
    pub fn gradient(&self, logits: &Array2<f32>, targets: &Array2<f32>) -> Array2<f32> {
        match self {
            Loss::CategoricalCrossEntropy => {
                (softmax(logits) - targets) / logits.nrows().max(1) as f32
            }
        }
    }
}

/// Row-wise softmax with the row max subtracted first.
pub fn softmax(logits: &Array2<f32>) -> Array2<f32> {
    let mut exps = logits.clone();
    for mut row in exps.axis_iter_mut(Axis(0)) {
        let max = row.fold(f32::NEG_INFINITY, |m, &x| m.max(x));
        row.mapv_inplace(|x| (x - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|x| x / sum);
    }
    exps
}
