//! Input form layer
//!
//! Field metadata (labels, units, input bounds), text-to-field assignment,
//! and the submit gate that runs validation before anything is sent.

use thiserror::Error;

use crate::model::{
    FarmConditions, FarmPlanInput, IrrigationType, ResourceConstraints, Season, SoilType,
    UnknownOption, YieldRequest,
};
use crate::validation::{validate_conditions, validate_plan_input, FieldErrors};

// ============================================================================
// Field Metadata
// ============================================================================

/// Input widget and its bounds. Widget bounds are UI limits, the validation
/// rules are the authority on what may be submitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Slider { min: f64, max: f64, step: f64 },
    Number { min: f64, max: f64 },
    Select { options: &'static [&'static str] },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    /// Slider fill percentage for a value (0-100, clamped).
    pub fn fill_percent(&self, value: f64) -> Option<f64> {
        match self.kind {
            FieldKind::Slider { min, max, .. } if max > min => {
                Some((((value - min) / (max - min)) * 100.0).clamp(0.0, 100.0))
            }
            _ => None,
        }
    }
}

pub const CONDITION_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "Temperature_C",
        label: "Temperature",
        unit: "°C",
        kind: FieldKind::Slider { min: -10.0, max: 55.0, step: 0.5 },
    },
    FieldSpec {
        name: "Rainfall_mm",
        label: "Rainfall",
        unit: "mm",
        kind: FieldKind::Slider { min: 0.0, max: 5000.0, step: 10.0 },
    },
    FieldSpec {
        name: "Soil_pH",
        label: "Soil pH",
        unit: "",
        kind: FieldKind::Slider { min: 3.0, max: 10.0, step: 0.1 },
    },
    FieldSpec {
        name: "Soil_Type",
        label: "Soil Type",
        unit: "",
        kind: FieldKind::Select { options: SoilType::LABELS },
    },
    FieldSpec {
        name: "Season",
        label: "Season",
        unit: "",
        kind: FieldKind::Select { options: Season::LABELS },
    },
    FieldSpec {
        name: "Irrigation_Type",
        label: "Irrigation Type",
        unit: "",
        kind: FieldKind::Select { options: IrrigationType::LABELS },
    },
    FieldSpec {
        name: "Farm_Area_acres",
        label: "Farm Size",
        unit: "acres",
        kind: FieldKind::Number { min: 0.1, max: 500.0 },
    },
    FieldSpec {
        name: "Water_Availability_L_per_week",
        label: "Weekly Water Availability",
        unit: "L/week",
        kind: FieldKind::Number { min: 100.0, max: 50000.0 },
    },
    FieldSpec {
        name: "Fertilizer_Used_kg",
        label: "Fertilizer Used (current)",
        unit: "kg",
        kind: FieldKind::Number { min: 0.0, max: 500.0 },
    },
];

pub const RESOURCE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "land_area",
        label: "Land Area",
        unit: "acres",
        kind: FieldKind::Slider { min: 0.5, max: 500.0, step: 0.5 },
    },
    FieldSpec {
        name: "water_available",
        label: "Water Available",
        unit: "L",
        kind: FieldKind::Slider { min: 500.0, max: 100000.0, step: 500.0 },
    },
    FieldSpec {
        name: "fertilizer_available",
        label: "Fertilizer Available",
        unit: "kg",
        kind: FieldKind::Number { min: 10.0, max: 5000.0 },
    },
];

/// Look up a field by wire name.
pub fn field_spec(name: &str) -> Option<&'static FieldSpec> {
    CONDITION_FIELDS
        .iter()
        .chain(RESOURCE_FIELDS.iter())
        .find(|f| f.name == name)
}

// ============================================================================
// Field Assignment
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("{field}: '{value}' is not a number")]
    InvalidNumber { field: &'static str, value: String },
    #[error("{field}: {source}")]
    InvalidOption {
        field: &'static str,
        #[source]
        source: UnknownOption,
    },
    #[error("expected FIELD=VALUE, got '{0}'")]
    MalformedAssignment(String),
}

fn parse_number(field: &'static str, raw: &str) -> Result<f64, FormError> {
    raw.trim().parse::<f64>().map_err(|_| FormError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

fn parse_option<T: std::str::FromStr<Err = UnknownOption>>(
    field: &'static str,
    raw: &str,
) -> Result<T, FormError> {
    raw.parse::<T>()
        .map_err(|source| FormError::InvalidOption { field, source })
}

/// Assign one condition field from text. Returns the canonical field name.
pub fn set_condition_field(
    conditions: &mut FarmConditions,
    name: &str,
    raw: &str,
) -> Result<&'static str, FormError> {
    let spec = field_spec(name).ok_or_else(|| FormError::UnknownField(name.to_string()))?;
    let field = spec.name;
    match field {
        "Temperature_C" => conditions.temperature_c = parse_number(field, raw)?,
        "Rainfall_mm" => conditions.rainfall_mm = parse_number(field, raw)?,
        "Soil_pH" => conditions.soil_ph = parse_number(field, raw)?,
        "Soil_Type" => conditions.soil_type = parse_option(field, raw)?,
        "Season" => conditions.season = parse_option(field, raw)?,
        "Irrigation_Type" => conditions.irrigation_type = parse_option(field, raw)?,
        "Farm_Area_acres" => conditions.farm_area_acres = parse_number(field, raw)?,
        "Water_Availability_L_per_week" => {
            conditions.water_availability_l_per_week = parse_number(field, raw)?
        }
        "Fertilizer_Used_kg" => conditions.fertilizer_used_kg = parse_number(field, raw)?,
        _ => return Err(FormError::UnknownField(name.to_string())),
    }
    Ok(field)
}

/// Assign one resource field from text. Returns the canonical field name.
pub fn set_resource_field(
    resources: &mut ResourceConstraints,
    name: &str,
    raw: &str,
) -> Result<&'static str, FormError> {
    let spec = field_spec(name).ok_or_else(|| FormError::UnknownField(name.to_string()))?;
    let field = spec.name;
    match field {
        "land_area" => resources.land_area = parse_number(field, raw)?,
        "water_available" => resources.water_available = parse_number(field, raw)?,
        "fertilizer_available" => resources.fertilizer_available = parse_number(field, raw)?,
        _ => return Err(FormError::UnknownField(name.to_string())),
    }
    Ok(field)
}

/// Assign any planner field from text.
pub fn set_plan_field(
    input: &mut FarmPlanInput,
    name: &str,
    raw: &str,
) -> Result<&'static str, FormError> {
    if RESOURCE_FIELDS.iter().any(|f| f.name == name) {
        set_resource_field(&mut input.resources, name, raw)
    } else {
        set_condition_field(&mut input.conditions, name, raw)
    }
}

/// Split `FIELD=VALUE`.
pub fn parse_assignment(assignment: &str) -> Result<(&str, &str), FormError> {
    assignment
        .split_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| FormError::MalformedAssignment(assignment.to_string()))
}

// ============================================================================
// Forms
// ============================================================================

/// Planner form: full input plus per-field errors from the last submit.
#[derive(Debug, Clone, Default)]
pub struct PlannerForm {
    values: FarmPlanInput,
    errors: FieldErrors,
}

impl PlannerForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: FarmPlanInput) -> Self {
        Self {
            values,
            errors: FieldErrors::new(),
        }
    }

    pub fn values(&self) -> &FarmPlanInput {
        &self.values
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Edit a field; editing clears that field's error.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<(), FormError> {
        let field = set_plan_field(&mut self.values, name, raw)?;
        self.errors.remove(field);
        Ok(())
    }

    /// Apply a batch of `FIELD=VALUE` edits in order.
    pub fn apply<S: AsRef<str>>(&mut self, assignments: &[S]) -> Result<(), FormError> {
        for assignment in assignments {
            let (name, raw) = parse_assignment(assignment.as_ref())?;
            self.set(name, raw)?;
        }
        Ok(())
    }

    /// Validate; on success hand back the input to send.
    pub fn submit(&mut self) -> Result<FarmPlanInput, FieldErrors> {
        self.errors = validate_plan_input(&self.values);
        if self.errors.is_empty() {
            Ok(self.values.clone())
        } else {
            Err(self.errors.clone())
        }
    }
}

/// Crop predictor form: conditions only.
#[derive(Debug, Clone, Default)]
pub struct ConditionsForm {
    values: FarmConditions,
    errors: FieldErrors,
}

impl ConditionsForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &FarmConditions {
        &self.values
    }

    pub fn set(&mut self, name: &str, raw: &str) -> Result<(), FormError> {
        let field = set_condition_field(&mut self.values, name, raw)?;
        self.errors.remove(field);
        Ok(())
    }

    pub fn apply<S: AsRef<str>>(&mut self, assignments: &[S]) -> Result<(), FormError> {
        for assignment in assignments {
            let (name, raw) = parse_assignment(assignment.as_ref())?;
            self.set(name, raw)?;
        }
        Ok(())
    }

    pub fn submit(&mut self) -> Result<FarmConditions, FieldErrors> {
        self.errors = validate_conditions(&self.values);
        if self.errors.is_empty() {
            Ok(self.values.clone())
        } else {
            Err(self.errors.clone())
        }
    }
}

/// Prefill carried from a crop prediction into the yield predictor:
/// the conditions used, the recommended crop, and the farm area as acreage.
pub fn yield_prefill(conditions: &FarmConditions, crop: &str) -> YieldRequest {
    YieldRequest {
        conditions: conditions.clone(),
        crop_name: crop.to_string(),
        acres: conditions.farm_area_acres,
    }
}
