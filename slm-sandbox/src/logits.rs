// Reduce classifier model output to a jailbreak probability.

/// Output layout `[SAFE, JAILBREAK]`.
pub const JAILBREAK_LABEL_INDEX: usize = 1;

/// Max-shifted softmax, accumulated in f64.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return vec![0.0; logits.len()];
    }

    let exps: Vec<f64> = logits
        .iter()
        .map(|&l| f64::from(l - max).exp())
        .collect();
    let sum: f64 = exps.iter().sum();

    exps.iter().map(|&e| (e / sum) as f32).collect()
}

/// Probability of the jailbreak class.
///
/// A single value is taken as a probability already and clamped into
/// `[0, 1]`; anything longer is treated as logits. Returns `None` for an
/// empty output, an out-of-range index or a non-finite value.
pub fn jailbreak_probability(output: &[f32], label_index: usize) -> Option<f32> {
    if output.iter().any(|v| !v.is_finite()) {
        return None;
    }

    match output {
        [] => None,
        [p] => Some(p.clamp(0.0, 1.0)),
        logits => softmax(logits).get(label_index).copied(),
    }
}
