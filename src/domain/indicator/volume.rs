//! Average volume and volume confirmation.
//!
//! The average covers the `window` readings before the newest one, so the
//! newest reading can be compared against it. With a single reading the
//! average is that reading.

pub fn average_volume(volumes: &[f64], window: usize) -> Option<f64> {
    match volumes.len() {
        0 => None,
        1 => Some(volumes[0]),
        len => {
            let count = window.min(len - 1);
            if count == 0 {
                return None;
            }
            let prior = &volumes[len - 1 - count..len - 1];
            Some(prior.iter().sum::<f64>() / count as f64)
        }
    }
}

/// True when the newest volume exceeds the average of the preceding ones.
/// Passes when there is not enough history to judge.
pub fn volume_confirms(volumes: &[f64], window: usize) -> bool {
    if volumes.len() < 2 {
        return true;
    }
    match (volumes.last(), average_volume(volumes, window)) {
        (Some(&latest), Some(avg)) => latest > avg,
        _ => true,
    }
}
