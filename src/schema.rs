//! Feature schema and categorical vocabularies for the health-risk model.
//!
//! The column order below is the order the random forest was trained on.
//! Every row handed to the model is assembled in exactly this order.

/// Number of input features the model expects.
pub const FEATURE_COUNT: usize = 18;

/// How a feature's raw value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Passed to the model as a number.
    Numeric,
    /// Human-readable label translated to a trained integer code.
    Categorical(&'static [(&'static str, i64)]),
}

/// One entry of the feature schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub kind: FeatureKind,
}

impl FeatureSpec {
    const fn numeric(name: &'static str) -> Self {
        Self {
            name,
            kind: FeatureKind::Numeric,
        }
    }

    const fn categorical(name: &'static str, vocabulary: &'static [(&'static str, i64)]) -> Self {
        Self {
            name,
            kind: FeatureKind::Categorical(vocabulary),
        }
    }

    /// Look up the trained code for a label. Matching is exact and case-sensitive.
    pub fn encode(&self, label: &str) -> Option<i64> {
        match self.kind {
            FeatureKind::Numeric => None,
            FeatureKind::Categorical(vocabulary) => vocabulary
                .iter()
                .find(|(known, _)| *known == label)
                .map(|&(_, code)| code),
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self.kind, FeatureKind::Categorical(_))
    }
}

const GENERAL_HEALTH: &[(&str, i64)] = &[
    ("Poor", 0),
    ("Fair", 1),
    ("Good", 2),
    ("Very Good", 3),
    ("Excellent", 4),
];

const CHECKUP: &[(&str, i64)] = &[
    ("Never", 0),
    ("5 or more years ago", 1),
    ("Within the past 5 years", 2),
    ("Within the past year", 3),
    ("Within the past 2 years", 4),
];

const YES_NO: &[(&str, i64)] = &[("No", 0), ("Yes", 1)];

const DIABETES: &[(&str, i64)] = &[
    ("No", 0),
    ("pre-diabetes or borderline diabetes", 1),
    ("Yes", 2),
];

const SEX: &[(&str, i64)] = &[("Female", 0), ("Male", 1)];

const AGE_CATEGORY: &[(&str, i64)] = &[
    ("18-24", 0),
    ("25-29", 1),
    ("30-34", 2),
    ("35-39", 3),
    ("40-44", 4),
    ("45-49", 5),
    ("50-54", 6),
    ("55-59", 7),
    ("60-64", 8),
    ("65-69", 9),
    ("70-74", 10),
    ("75-79", 11),
    ("80+", 12),
];

/// The ordered feature schema.
pub static FEATURE_SCHEMA: [FeatureSpec; FEATURE_COUNT] = [
    FeatureSpec::categorical("General_Health", GENERAL_HEALTH),
    FeatureSpec::categorical("Checkup", CHECKUP),
    FeatureSpec::categorical("Exercise", YES_NO),
    FeatureSpec::categorical("Skin_Cancer", YES_NO),
    FeatureSpec::categorical("Other_Cancer", YES_NO),
    FeatureSpec::categorical("Depression", YES_NO),
    FeatureSpec::categorical("Diabetes", DIABETES),
    FeatureSpec::categorical("Arthritis", YES_NO),
    FeatureSpec::categorical("Sex", SEX),
    FeatureSpec::categorical("Age_Category", AGE_CATEGORY),
    FeatureSpec::numeric("Height_(cm)"),
    FeatureSpec::numeric("Weight_(kg)"),
    FeatureSpec::numeric("BMI"),
    FeatureSpec::categorical("Smoking_History", YES_NO),
    FeatureSpec::numeric("Alcohol_Consumption"),
    FeatureSpec::numeric("Fruit_Consumption"),
    FeatureSpec::numeric("Green_Vegetables_Consumption"),
    FeatureSpec::numeric("FriedPotato_Consumption"),
];

/// Feature names in training order.
pub fn feature_names() -> impl Iterator<Item = &'static str> {
    FEATURE_SCHEMA.iter().map(|spec| spec.name)
}

/// Column position of a named feature.
pub fn index_of(name: &str) -> Option<usize> {
    FEATURE_SCHEMA.iter().position(|spec| spec.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn lookup(name: &str) -> Option<&'static FeatureSpec> {
        index_of(name).map(|idx| &FEATURE_SCHEMA[idx])
    }

    #[test]
    fn test_schema_order() {
        let names: Vec<&str> = feature_names().collect();
        assert_eq!(names.len(), FEATURE_COUNT);
        assert_eq!(names[0], "General_Health");
        assert_eq!(names[9], "Age_Category");
        assert_eq!(names[10], "Height_(cm)");
        assert_eq!(names[17], "FriedPotato_Consumption");
    }

    #[test]
    fn test_names_unique() {
        let names: HashSet<&str> = feature_names().collect();
        assert_eq!(names.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_categorical_count() {
        let categorical = FEATURE_SCHEMA.iter().filter(|s| s.is_categorical()).count();
        assert_eq!(categorical, 11);
    }

    #[test]
    fn test_encode_exact_match() {
        let health = lookup("General_Health").unwrap();
        assert_eq!(health.encode("Good"), Some(2));
        assert_eq!(health.encode("Very Good"), Some(3));
        assert_eq!(health.encode("good"), None);
        assert_eq!(health.encode("Good "), None);
    }

    #[test]
    fn test_encode_vocabularies() {
        assert_eq!(lookup("Checkup").unwrap().encode("Within the past year"), Some(3));
        assert_eq!(
            lookup("Diabetes").unwrap().encode("pre-diabetes or borderline diabetes"),
            Some(1)
        );
        assert_eq!(lookup("Sex").unwrap().encode("Female"), Some(0));
        assert_eq!(lookup("Age_Category").unwrap().encode("80+"), Some(12));
        assert_eq!(lookup("Smoking_History").unwrap().encode("Yes"), Some(1));
    }

    #[test]
    fn test_numeric_never_encodes() {
        assert_eq!(lookup("BMI").unwrap().encode("Good"), None);
        assert!(lookup("Unknown_Field").is_none());
        assert_eq!(index_of("BMI"), Some(12));
    }
}
