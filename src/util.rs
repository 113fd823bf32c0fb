pub fn mean(samples: &[f64]) -> Option<f64> {
    match samples.len() {
        0 => None,
        n => Some(samples.iter().sum::<f64>() / n as f64),
    }
}

/// Population standard deviation.
pub fn std_dev(samples: &[f64]) -> Option<f64> {
    let avg = mean(samples)?;
    let variance = samples
        .iter()
        .map(|value| {
            let diff = avg - *value;
            diff * diff
        })
        .sum::<f64>()
        / samples.len() as f64;

    Some(variance.sqrt())
}

pub fn fastest(samples: &[f64]) -> Option<f64> {
    samples.iter().copied().reduce(f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[0.25, 0.5, 0.75]), Some(0.5));
        assert_eq!(mean(&[1.5]), Some(1.5));
    }

    #[test]
    fn test_mean_empty_slice() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), Some(2.0));
    }

    #[test]
    fn test_std_dev_single_value() {
        assert_eq!(std_dev(&[0.42]), Some(0.0));
    }

    #[test]
    fn test_std_dev_empty_slice() {
        assert_eq!(std_dev(&[]), None);
    }

    #[test]
    fn test_fastest() {
        assert_eq!(fastest(&[0.8, 0.31, 0.5]), Some(0.31));
        assert_eq!(fastest(&[]), None);
    }
}
