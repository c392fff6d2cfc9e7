//! Disaster risk heuristic
//!
//! Scores flood, heavy rain, landslide and tsunami risk on a 1-5 scale from
//! today's rainfall, the ground elevation and a coarse coastal check. These
//! are rough indicators built from fixed thresholds, not a hazard model.

use crate::data::Coordinate;

/// Tsunami level assigned to low-lying coastal points
const COASTAL_TSUNAMI_LEVEL: i64 = 2;

/// Points below this elevation (m) get one extra flood level
const FLOOD_LOW_GROUND_M: f64 = 10.0;

/// Landslide risk only applies above this elevation (m)
const LANDSLIDE_MIN_ELEVATION_M: f64 = 100.0;

/// Tsunami risk only applies below this elevation (m)
const TSUNAMI_MAX_ELEVATION_M: f64 = 20.0;

/// A risk level clamped to 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RiskLevel(u8);

impl RiskLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Creates a level, clamping into range
    pub fn new(raw: i64) -> Self {
        Self(raw.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Very Low",
            2 => "Low",
            3 => "Moderate",
            4 => "High",
            _ => "Very High",
        }
    }

    /// Severity class name
    pub fn class(self) -> &'static str {
        match self.0 {
            1 => "very-low",
            2 => "low",
            3 => "moderate",
            4 => "high",
            _ => "very-high",
        }
    }
}

/// The four hazards that are scored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hazard {
    Flood,
    HeavyRain,
    Landslide,
    Tsunami,
}

impl Hazard {
    pub fn all() -> &'static [Hazard] {
        &[
            Hazard::Flood,
            Hazard::HeavyRain,
            Hazard::Landslide,
            Hazard::Tsunami,
        ]
    }

    /// Short label used on the chart axis
    pub fn label(&self) -> &'static str {
        match self {
            Hazard::Flood => "Flood",
            Hazard::HeavyRain => "Heavy Rain",
            Hazard::Landslide => "Landslide",
            Hazard::Tsunami => "Tsunami",
        }
    }
}

/// Inputs consumed by the scorer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskInputs {
    /// Today's total precipitation in mm
    pub rainfall_mm: f64,
    /// Ground elevation in meters
    pub elevation_m: f64,
    pub is_coastal: bool,
}

impl RiskInputs {
    /// Builds inputs for a point, substituting 0 for missing measurements
    pub fn at(coordinate: Coordinate, rainfall_mm: Option<f64>, elevation_m: Option<f64>) -> Self {
        Self {
            rainfall_mm: rainfall_mm.unwrap_or(0.0),
            elevation_m: elevation_m.unwrap_or(0.0),
            is_coastal: is_coastal(coordinate),
        }
    }
}

/// Risk levels for one selected point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskAssessment {
    pub flood: RiskLevel,
    pub heavy_rain: RiskLevel,
    pub landslide: RiskLevel,
    pub tsunami: RiskLevel,
}

impl RiskAssessment {
    pub fn level(&self, hazard: Hazard) -> RiskLevel {
        match hazard {
            Hazard::Flood => self.flood,
            Hazard::HeavyRain => self.heavy_rain,
            Hazard::Landslide => self.landslide,
            Hazard::Tsunami => self.tsunami,
        }
    }

    /// Levels paired with their hazard, in chart order
    pub fn levels(&self) -> Vec<(Hazard, RiskLevel)> {
        Hazard::all().iter().map(|h| (*h, self.level(*h))).collect()
    }

    /// Lower bound of the chart axis
    ///
    /// 0 when every level is at the minimum so the bars stay visible, 1
    /// otherwise.
    pub fn chart_floor(&self) -> u8 {
        if self.levels().iter().all(|(_, l)| l.value() == RiskLevel::MIN) {
            0
        } else {
            RiskLevel::MIN
        }
    }
}

/// Scores all four hazards
pub fn assess(inputs: &RiskInputs) -> RiskAssessment {
    let rain = inputs.rainfall_mm;
    let elevation = inputs.elevation_m;

    let mut flood = RiskLevel::new(round_half_up(rain / 10.0 * 5.0)).value() as i64;
    if elevation < FLOOD_LOW_GROUND_M {
        flood += 1;
    }

    let heavy_rain = round_half_up(rain / 15.0 * 5.0);

    let landslide = if elevation > LANDSLIDE_MIN_ELEVATION_M {
        round_half_up(rain / 8.0 * 3.0)
    } else {
        1
    };

    let tsunami = if inputs.is_coastal && elevation < TSUNAMI_MAX_ELEVATION_M {
        COASTAL_TSUNAMI_LEVEL
    } else {
        1
    };

    RiskAssessment {
        flood: RiskLevel::new(flood),
        heavy_rain: RiskLevel::new(heavy_rain),
        landslide: RiskLevel::new(landslide),
        tsunami: RiskLevel::new(tsunami),
    }
}

/// Whether a point falls inside one of the ocean-adjacent bounding boxes
///
/// Three hard-coded boxes stand in for the Pacific, Atlantic and Indian
/// Ocean coasts. Inland points inside a box count as coastal.
pub fn is_coastal(coordinate: Coordinate) -> bool {
    let lat = coordinate.latitude();
    let lng = coordinate.longitude();

    let pacific = (lng > 120.0 || lng < -120.0) && lat < 60.0 && lat > -60.0;
    let atlantic = lng > -80.0 && lng < 0.0 && lat < 60.0 && lat > -40.0;
    let indian = lng > 40.0 && lng < 120.0 && lat < 20.0 && lat > -40.0;

    pacific || atlantic || indian
}

/// Rounds to the nearest integer with halves going up (2.5 -> 3, -2.5 -> -2)
fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn at(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    fn inputs(rainfall_mm: f64, elevation_m: f64, is_coastal: bool) -> RiskInputs {
        RiskInputs {
            rainfall_mm,
            elevation_m,
            is_coastal,
        }
    }

    #[test]
    fn test_heavy_rain_low_ground_saturates() {
        let risk = assess(&inputs(100.0, 5.0, false));
        assert_eq!(risk.flood.value(), 5);
        assert_eq!(risk.heavy_rain.value(), 5);
    }

    #[test]
    fn test_dry_sea_level_point() {
        let risk = assess(&inputs(0.0, 0.0, false));
        // Base flood level 1, bumped once for ground below 10 m
        assert_eq!(risk.flood.value(), 2);
        assert_eq!(risk.heavy_rain.value(), 1);
        assert_eq!(risk.landslide.value(), 1);
        assert_eq!(risk.tsunami.value(), 1);

        let coastal = assess(&inputs(0.0, 0.0, true));
        assert_eq!(coastal.tsunami.value(), 2);
        assert_eq!(coastal.flood, risk.flood);
        assert_eq!(coastal.heavy_rain, risk.heavy_rain);
        assert_eq!(coastal.landslide, risk.landslide);
    }

    #[test]
    fn test_dry_high_ground_is_all_minimum() {
        let risk = assess(&inputs(0.0, 50.0, false));
        assert_eq!(risk.flood.value(), 1);
        assert_eq!(risk.heavy_rain.value(), 1);
        assert_eq!(risk.landslide.value(), 1);
        assert_eq!(risk.tsunami.value(), 1);
        assert_eq!(risk.chart_floor(), 0);
    }

    #[test]
    fn test_landslide_on_high_ground() {
        // round(24 / 8 * 3) = 9, clamped to 5
        let risk = assess(&inputs(24.0, 150.0, false));
        assert_eq!(risk.landslide.value(), 5);
    }

    #[rstest]
    #[case(0.0, 1)]
    #[case(3.0, 1)] // 1.125
    #[case(4.0, 2)] // 1.5 rounds up
    #[case(8.0, 3)]
    #[case(10.0, 4)] // 3.75
    #[case(14.0, 5)] // 5.25
    fn test_landslide_scale(#[case] rainfall: f64, #[case] expected: u8) {
        assert_eq!(assess(&inputs(rainfall, 100.5, false)).landslide.value(), expected);
    }

    #[rstest]
    #[case(100.0)]
    #[case(99.9)]
    #[case(-30.0)]
    fn test_landslide_ignored_at_or_below_100m(#[case] elevation: f64) {
        assert_eq!(assess(&inputs(500.0, elevation, false)).landslide.value(), 1);
    }

    #[rstest]
    #[case(0.0, 1)]
    #[case(2.0, 1)]
    #[case(4.0, 2)]
    #[case(5.0, 3)] // 2.5 rounds up
    #[case(6.0, 3)]
    #[case(8.0, 4)]
    #[case(9.5, 5)] // 4.75
    #[case(250.0, 5)]
    fn test_flood_scale_on_dry_ground(#[case] rainfall: f64, #[case] expected: u8) {
        assert_eq!(assess(&inputs(rainfall, 10.0, false)).flood.value(), expected);
    }

    #[rstest]
    #[case(0.0, 2)]
    #[case(5.0, 4)]
    #[case(8.0, 5)]
    #[case(9.0, 5)] // 5 + 1 clamped
    fn test_flood_bumped_below_10m(#[case] rainfall: f64, #[case] expected: u8) {
        assert_eq!(assess(&inputs(rainfall, 9.99, false)).flood.value(), expected);
    }

    #[rstest]
    #[case(0.0, 1)]
    #[case(6.0, 2)]
    #[case(7.5, 3)] // 2.5 rounds up
    #[case(10.0, 3)] // 3.33
    #[case(12.0, 4)]
    #[case(15.0, 5)]
    fn test_heavy_rain_scale(#[case] rainfall: f64, #[case] expected: u8) {
        assert_eq!(assess(&inputs(rainfall, 500.0, false)).heavy_rain.value(), expected);
    }

    #[rstest]
    #[case(true, 19.9, 2)]
    #[case(true, 20.0, 1)]
    #[case(true, 250.0, 1)]
    #[case(false, 0.0, 1)]
    #[case(false, -10.0, 1)]
    fn test_tsunami(#[case] coastal: bool, #[case] elevation: f64, #[case] expected: u8) {
        assert_eq!(assess(&inputs(0.0, elevation, coastal)).tsunami.value(), expected);
    }

    #[test]
    fn test_tsunami_is_deterministic() {
        let first = assess(&inputs(12.0, 3.0, true));
        for _ in 0..20 {
            assert_eq!(assess(&inputs(12.0, 3.0, true)), first);
        }
    }

    #[test]
    fn test_levels_always_in_range() {
        let rainfalls = [0.0, 0.4, 1.0, 7.3, 15.0, 42.0, 1_000.0, f64::MAX];
        let elevations = [-430.0, 0.0, 9.9, 10.0, 19.9, 20.0, 100.0, 100.1, 8_848.0];
        for &rain in &rainfalls {
            for &elevation in &elevations {
                for coastal in [true, false] {
                    let risk = assess(&inputs(rain, elevation, coastal));
                    for (_, level) in risk.levels() {
                        assert!((1..=5).contains(&level.value()), "rain={rain} elev={elevation}");
                    }
                }
            }
        }
    }

    #[rstest]
    #[case(0.0, -150.0, true)] // Pacific, east side
    #[case(35.0, 139.7, true)] // Pacific, west side
    #[case(59.9, 150.0, true)]
    #[case(60.0, 150.0, false)] // box edge is exclusive
    #[case(0.0, 30.0, false)] // central Africa
    #[case(40.7, -74.0, true)] // Atlantic
    #[case(-39.9, -50.0, true)]
    #[case(-40.0, -50.0, false)]
    #[case(-20.0, 60.0, true)] // Indian
    #[case(25.0, 80.0, false)] // north of the Indian box
    #[case(51.5, 0.0, false)] // lng 0 is outside the Atlantic box
    #[case(0.0, 120.0, false)] // seam between Indian and Pacific boxes
    fn test_is_coastal(#[case] lat: f64, #[case] lng: f64, #[case] expected: bool) {
        assert_eq!(is_coastal(at(lat, lng)), expected);
    }

    #[test]
    fn test_inputs_default_missing_measurements_to_zero() {
        let i = RiskInputs::at(at(0.0, 30.0), None, None);
        assert_eq!(i.rainfall_mm, 0.0);
        assert_eq!(i.elevation_m, 0.0);
        assert!(!i.is_coastal);

        let i = RiskInputs::at(at(0.0, -150.0), Some(3.2), Some(812.0));
        assert_eq!(i.rainfall_mm, 3.2);
        assert_eq!(i.elevation_m, 812.0);
        assert!(i.is_coastal);
    }

    #[rstest]
    #[case(1, "Very Low", "very-low")]
    #[case(2, "Low", "low")]
    #[case(3, "Moderate", "moderate")]
    #[case(4, "High", "high")]
    #[case(5, "Very High", "very-high")]
    fn test_level_labels(#[case] raw: i64, #[case] label: &str, #[case] class: &str) {
        let level = RiskLevel::new(raw);
        assert_eq!(level.label(), label);
        assert_eq!(level.class(), class);
    }

    #[test]
    fn test_level_clamps() {
        assert_eq!(RiskLevel::new(-4).value(), 1);
        assert_eq!(RiskLevel::new(0).value(), 1);
        assert_eq!(RiskLevel::new(9).value(), 5);
        assert_eq!(RiskLevel::new(i64::MAX).value(), 5);
    }

    #[test]
    fn test_chart_floor_when_any_level_raised() {
        let risk = assess(&inputs(0.0, 0.0, false));
        assert_eq!(risk.chart_floor(), 1);
    }

    #[test]
    fn test_levels_in_chart_order() {
        let risk = assess(&inputs(100.0, 150.0, true));
        let labels: Vec<&str> = risk.levels().iter().map(|(h, _)| h.label()).collect();
        assert_eq!(labels, vec!["Flood", "Heavy Rain", "Landslide", "Tsunami"]);
    }
}
