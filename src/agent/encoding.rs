/// Index of the largest value; the first one wins ties. `None` when empty or
/// when every value is NaN.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some(b) if v <= values[b] => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Vector of `width` zeros with a single `1.0` at `index`.
pub fn one_hot(width: usize, index: usize) -> Vec<f64> {
    let mut layer = vec![0.0; width];
    if let Some(slot) = layer.get_mut(index) {
        *slot = 1.0;
    }
    layer
}

/// Swap the two players in a board encoding (`+x` <-> `-x`, empty stays 0),
/// so that positions can be learned from the other side's point of view.
pub fn flip_perspective(input: &[f64]) -> Vec<f64> {
    input
        .iter()
        .map(|&v| if v == 0.0 { 0.0 } else { -v })
        .collect()
}

/// Mask illegal actions with `-inf` so they never win an `argmax`.
pub fn mask_illegal<F>(output: &[f64], is_legal: F) -> Vec<f64>
where
    F: Fn(usize) -> bool,
{
    output
        .iter()
        .enumerate()
        .map(|(i, &v)| if is_legal(i) { v } else { f64::NEG_INFINITY })
        .collect()
}
