//! Range validation for planner inputs.
//!
//! Each numeric field has one rule. Rules are checked in table order and a
//! failing rule yields its field-specific message; any message blocks
//! submission.

use std::collections::BTreeMap;

use crate::model::{FarmConditions, FarmPlanInput, ResourceConstraints};

/// Field name (wire name) -> message
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Admissible interval for a numeric field. Non-finite values never pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds {
    /// min <= v <= max
    Closed(f64, f64),
    /// min < v <= max
    LeftOpen(f64, f64),
    /// v > 0
    Positive,
    /// v >= 0
    NonNegative,
}

impl Bounds {
    pub fn admits(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        match *self {
            Bounds::Closed(min, max) => value >= min && value <= max,
            Bounds::LeftOpen(min, max) => value > min && value <= max,
            Bounds::Positive => value > 0.0,
            Bounds::NonNegative => value >= 0.0,
        }
    }
}

/// One field rule over a value of type `T`.
pub struct RangeRule<T> {
    pub field: &'static str,
    pub bounds: Bounds,
    pub message: &'static str,
    pub read: fn(&T) -> f64,
}

impl<T> RangeRule<T> {
    fn check(&self, target: &T, errors: &mut FieldErrors) {
        if !self.bounds.admits((self.read)(target)) {
            errors.insert(self.field, self.message.to_string());
        }
    }
}

pub const CONDITION_RULES: &[RangeRule<FarmConditions>] = &[
    RangeRule {
        field: "Temperature_C",
        bounds: Bounds::Closed(-10.0, 55.0),
        message: "Temperature must be between -10°C and 55°C",
        read: |c| c.temperature_c,
    },
    RangeRule {
        field: "Rainfall_mm",
        bounds: Bounds::Closed(0.0, 5000.0),
        message: "Rainfall must be between 0 and 5000 mm",
        read: |c| c.rainfall_mm,
    },
    RangeRule {
        field: "Soil_pH",
        bounds: Bounds::Closed(3.0, 10.0),
        message: "Soil pH must be between 3.0 and 10.0",
        read: |c| c.soil_ph,
    },
    RangeRule {
        field: "Farm_Area_acres",
        bounds: Bounds::Positive,
        message: "Farm size must be greater than 0",
        read: |c| c.farm_area_acres,
    },
    RangeRule {
        field: "Water_Availability_L_per_week",
        bounds: Bounds::Positive,
        message: "Weekly water availability must be greater than 0",
        read: |c| c.water_availability_l_per_week,
    },
    RangeRule {
        field: "Fertilizer_Used_kg",
        bounds: Bounds::NonNegative,
        message: "Fertilizer used cannot be negative",
        read: |c| c.fertilizer_used_kg,
    },
];

pub const RESOURCE_RULES: &[RangeRule<ResourceConstraints>] = &[
    RangeRule {
        field: "land_area",
        bounds: Bounds::LeftOpen(0.0, 500.0),
        message: "Land area must be between 0.1 and 500 acres",
        read: |r| r.land_area,
    },
    RangeRule {
        field: "water_available",
        bounds: Bounds::Positive,
        message: "Water available must be greater than 0",
        read: |r| r.water_available,
    },
    RangeRule {
        field: "fertilizer_available",
        bounds: Bounds::Positive,
        message: "Fertilizer must be greater than 0",
        read: |r| r.fertilizer_available,
    },
];

/// Validate the condition fields (crop predictor form).
pub fn validate_conditions(conditions: &FarmConditions) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for rule in CONDITION_RULES {
        rule.check(conditions, &mut errors);
    }
    errors
}

/// Validate the resource constraint fields.
pub fn validate_resources(resources: &ResourceConstraints) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for rule in RESOURCE_RULES {
        rule.check(resources, &mut errors);
    }
    errors
}

/// Validate a full planner input. Empty result means submission may proceed.
pub fn validate_plan_input(input: &FarmPlanInput) -> FieldErrors {
    let mut errors = validate_conditions(&input.conditions);
    errors.extend(validate_resources(&input.resources));
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_conditions(edit: impl FnOnce(&mut FarmConditions)) -> FarmPlanInput {
        let mut input = FarmPlanInput::default();
        edit(&mut input.conditions);
        input
    }

    fn with_resources(edit: impl FnOnce(&mut ResourceConstraints)) -> FarmPlanInput {
        let mut input = FarmPlanInput::default();
        edit(&mut input.resources);
        input
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_plan_input(&FarmPlanInput::default()).is_empty());
    }

    #[test]
    fn test_temperature_bounds_are_inclusive() {
        for t in [-10.0, 0.0, 23.0, 55.0] {
            let errors = validate_plan_input(&with_conditions(|c| c.temperature_c = t));
            assert!(!errors.contains_key("Temperature_C"), "{} should pass", t);
        }
        for t in [-10.5, 55.1, 120.0] {
            let errors = validate_plan_input(&with_conditions(|c| c.temperature_c = t));
            assert_eq!(
                errors["Temperature_C"],
                "Temperature must be between -10°C and 55°C"
            );
        }
    }

    #[test]
    fn test_rainfall_and_ph_bounds() {
        let errors = validate_plan_input(&with_conditions(|c| {
            c.rainfall_mm = -1.0;
            c.soil_ph = 10.5;
        }));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["Rainfall_mm"], "Rainfall must be between 0 and 5000 mm");
        assert_eq!(errors["Soil_pH"], "Soil pH must be between 3.0 and 10.0");

        let errors = validate_plan_input(&with_conditions(|c| {
            c.rainfall_mm = 5000.0;
            c.soil_ph = 3.0;
        }));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_land_area_excludes_zero_includes_max() {
        let zero = validate_plan_input(&with_resources(|r| r.land_area = 0.0));
        assert_eq!(zero["land_area"], "Land area must be between 0.1 and 500 acres");

        let over = validate_plan_input(&with_resources(|r| r.land_area = 500.5));
        assert!(over.contains_key("land_area"));

        let max = validate_plan_input(&with_resources(|r| r.land_area = 500.0));
        assert!(max.is_empty());

        let small = validate_plan_input(&with_resources(|r| r.land_area = 0.05));
        assert!(small.is_empty());
    }

    #[test]
    fn test_resources_must_be_positive() {
        let errors = validate_plan_input(&with_resources(|r| {
            r.water_available = 0.0;
            r.fertilizer_available = -5.0;
        }));
        assert_eq!(errors["water_available"], "Water available must be greater than 0");
        assert_eq!(errors["fertilizer_available"], "Fertilizer must be greater than 0");
    }

    #[test]
    fn test_fertilizer_used_may_be_zero() {
        let errors = validate_plan_input(&with_conditions(|c| c.fertilizer_used_kg = 0.0));
        assert!(errors.is_empty());

        let errors = validate_plan_input(&with_conditions(|c| c.fertilizer_used_kg = -0.1));
        assert!(errors.contains_key("Fertilizer_Used_kg"));
    }

    #[test]
    fn test_non_finite_values_fail() {
        let errors = validate_plan_input(&with_conditions(|c| {
            c.temperature_c = f64::NAN;
            c.farm_area_acres = f64::INFINITY;
        }));
        assert!(errors.contains_key("Temperature_C"));
        assert!(errors.contains_key("Farm_Area_acres"));
    }

    #[test]
    fn test_conditions_only_ignores_resources() {
        let mut input = FarmPlanInput::default();
        input.resources.land_area = -3.0;
        assert!(validate_conditions(&input.conditions).is_empty());
        assert!(!validate_plan_input(&input).is_empty());
    }
}
