//! `[f32]` extensions.

/// `[f32]` extensions.
pub trait F32ArrayExt {
    /// Returns the arithmetic mean, or 0 for an empty slice.
    fn mean(&self) -> f32;
}

impl F32ArrayExt for [f32] {
    fn mean(&self) -> f32 {
        if self.len() == 0 {
            return 0.0;
        };
        let mut sum: f32 = 0.;
        for value in self.iter() {
            sum += value
        }
        sum / (self.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::F32ArrayExt;

    #[test]
    fn test_empty_window() {
        let window: [f32; 0] = [];
        assert!(window.mean() == 0.0);
    }

    #[test]
    fn test_mean() {
        let window = [1.0_f32, 2.0, 3.0, 6.0];
        assert_eq!(window.mean(), 3.0);
    }
}
