/// Derived performance measures for one result row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measures {
    /// Body mass index: weight (kg) / height (m) squared.
    pub bmi: f64,
    /// Swim speed in meters per second.
    pub speed: f64,
    /// Speed normalized by body mass, a proxy for propulsive efficiency.
    pub speed_per_kg: f64,
}

/// Computes the derived measures for a result.
///
/// Inputs must be positive: distance in meters, swimtime in seconds, height
/// in centimeters, weight in kilograms. Rows with zero or unresolved
/// swimtime are filtered out before this point.
pub fn derive(distance: f64, swimtime: f64, height: f64, weight: f64) -> Measures {
    let height_m = height / 100.0;
    let bmi = weight / (height_m * height_m);
    let speed = distance / swimtime;
    let speed_per_kg = speed / weight;
    Measures {
        bmi: round6(bmi),
        speed: round6(speed),
        speed_per_kg: round6(speed_per_kg),
    }
}

/// Decimal rounding to six places, half away from zero. Both parser
/// variants round through here so equivalent inputs give identical output.
pub fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_values() {
        let measures = derive(100.0, 50.0, 180.0, 80.0);
        assert_eq!(measures.bmi, 24.691358);
        assert_eq!(measures.speed, 2.0);
        assert_eq!(measures.speed_per_kg, 0.025);
    }

    #[test]
    fn rounding_is_six_places() {
        assert_eq!(round6(1.23456789), 1.234568);
        assert_eq!(round6(1.0000004), 1.0);
        assert_eq!(round6(2.0), 2.0);
    }
}
