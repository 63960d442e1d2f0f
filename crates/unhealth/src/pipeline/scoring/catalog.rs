use std::collections::HashMap;

pub const HEALTH_OUTCOMES: &str = "Health Outcomes";
pub const DISABILITY: &str = "Disability";
pub const PREVENTION: &str = "Prevention";
pub const HEALTH_STATUS: &str = "Health Status";
pub const HEALTH_RISK_BEHAVIORS: &str = "Health Risk Behaviors";
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Display order for per-category contribution breakdowns.
pub const CATEGORY_ORDER: [&str; 5] = [
    HEALTH_OUTCOMES,
    DISABILITY,
    PREVENTION,
    HEALTH_STATUS,
    HEALTH_RISK_BEHAVIORS,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureEntry {
    /// 1-5, higher is more significant to public health.
    pub impact: u8,
    pub short_label: Option<String>,
    pub category: Option<String>,
}

/// Immutable lookup tables for weights, labels and polarity.
///
/// Every lookup is total: unknown measures get impact 0, their own name as
/// label, and are never inverted.
#[derive(Debug, Clone, Default)]
pub struct MeasureCatalog {
    entries: HashMap<String, MeasureEntry>,
    /// Positive-outcome measure name mapped to its negated name.
    positive_outcomes: HashMap<String, String>,
}

impl MeasureCatalog {
    pub fn builder() -> MeasureCatalogBuilder {
        MeasureCatalogBuilder::default()
    }

    /// The production catalog for CDC PLACES county measures.
    pub fn standard() -> Self {
        let mut builder = Self::builder();
        for (name, impact, label, category) in STANDARD_MEASURES {
            builder = builder.measure(name, *impact, Some(*label), Some(*category));
        }
        for (positive, negated) in POSITIVE_OUTCOME_MEASURES {
            builder = builder.positive_outcome(positive, negated);
        }
        builder.build()
    }

    pub fn get_impact(&self, measure_name: &str) -> u8 {
        self.entries
            .get(measure_name)
            .map(|entry| entry.impact)
            .unwrap_or(0)
    }

    pub fn has_impact(&self, measure_name: &str) -> bool {
        self.get_impact(measure_name) > 0
    }

    pub fn get_short_label<'a>(&'a self, measure_name: &'a str) -> &'a str {
        self.entries
            .get(measure_name)
            .and_then(|entry| entry.short_label.as_deref())
            .unwrap_or(measure_name)
    }

    pub fn category(&self, measure_name: &str) -> Option<&str> {
        self.entries
            .get(measure_name)
            .and_then(|entry| entry.category.as_deref())
    }

    pub fn is_positive_outcome(&self, measure_name: &str) -> bool {
        self.positive_outcomes.contains_key(measure_name)
    }

    pub fn invert_if_positive_outcome(&self, measure_name: &str, raw_value: f64) -> f64 {
        if self.is_positive_outcome(measure_name) {
            100.0 - raw_value
        } else {
            raw_value
        }
    }

    /// Name and value with polarity applied, so higher always means worse.
    pub fn orient<'a>(&'a self, measure_name: &'a str, raw_value: f64) -> (&'a str, f64) {
        match self.positive_outcomes.get(measure_name) {
            Some(negated) => (negated.as_str(), 100.0 - raw_value),
            None => (measure_name, raw_value),
        }
    }

    /// Resolves either a long measure name or a short label to the long name.
    pub fn resolve_measure<'a>(&'a self, name_or_label: &'a str) -> Option<&'a str> {
        if let Some((name, _)) = self.entries.get_key_value(name_or_label) {
            return Some(name.as_str());
        }
        self.entries
            .iter()
            .find(|(_, entry)| entry.short_label.as_deref() == Some(name_or_label))
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct MeasureCatalogBuilder {
    catalog: MeasureCatalog,
}

impl MeasureCatalogBuilder {
    pub fn measure(
        mut self,
        name: &str,
        impact: u8,
        short_label: Option<&str>,
        category: Option<&str>,
    ) -> Self {
        self.catalog.entries.insert(
            name.to_string(),
            MeasureEntry {
                impact,
                short_label: short_label.map(str::to_string),
                category: category.map(str::to_string),
            },
        );
        self
    }

    pub fn positive_outcome(mut self, positive: &str, negated: &str) -> Self {
        self.catalog
            .positive_outcomes
            .insert(positive.to_string(), negated.to_string());
        self
    }

    pub fn build(self) -> MeasureCatalog {
        self.catalog
    }
}

const POSITIVE_OUTCOME_MEASURES: &[(&str, &str)] = &[
    (
        "Visits to doctor for routine checkup within the past year among adults aged >=18 years",
        "No doctor visit for checkup in past year among adults aged >=18 years",
    ),
    (
        "Visits to dentist or dental clinic among adults aged >=18 years",
        "No dental visit in past year among adults aged >=18 years",
    ),
    (
        "Fecal occult blood test, sigmoidoscopy, or colonoscopy among adults aged 50-75 years",
        "No colorectal cancer screening among adults aged 50-75 years",
    ),
    (
        "Cervical cancer screening among adult women aged 21-65 years",
        "No cervical cancer screening among adult women aged 21-65 years",
    ),
    (
        "Taking medicine for high blood pressure control among adults aged >=18 years with high blood pressure",
        "Not taking medicine for high blood pressure among adults aged >=18 years",
    ),
    (
        "Cholesterol screening among adults aged >=18 years",
        "No cholesterol screening among adults aged >=18 years",
    ),
    (
        "Mammography use among women aged 50-74 years",
        "No mammography use among women aged 50-74 years",
    ),
    (
        "Older adult men aged >=65 years who are up to date on a core set of clinical preventive services: Flu shot past year, PPV shot ever, Colorectal cancer screening",
        "Older adult men aged >=65 years not up to date on clinical preventive services",
    ),
    (
        "Older adult women aged >=65 years who are up to date on a core set of clinical preventive services: Flu shot past year, PPV shot ever, Colorectal cancer screening, and Mammogram past 2 years",
        "Older adult women aged >=65 years not up to date on clinical preventive services",
    ),
];

const STANDARD_MEASURES: &[(&str, u8, &str, &str)] = &[
    ("Stroke among adults aged >=18 years", 5, "Stroke (>=18)", HEALTH_OUTCOMES),
    (
        "Chronic obstructive pulmonary disease among adults aged >=18 years",
        5,
        "COPD (>=18)",
        HEALTH_OUTCOMES,
    ),
    (
        "Cancer (excluding skin cancer) among adults aged >=18 years",
        5,
        "Cancer (>=18)",
        HEALTH_OUTCOMES,
    ),
    (
        "Diagnosed diabetes among adults aged >=18 years",
        5,
        "Diagnosed diabetes (>=18)",
        HEALTH_OUTCOMES,
    ),
    (
        "Coronary heart disease among adults aged >=18 years",
        5,
        "Coronary heart disease (>=18)",
        HEALTH_OUTCOMES,
    ),
    (
        "Chronic kidney disease among adults aged >=18 years",
        5,
        "Chronic kidney disease (>=18)",
        HEALTH_OUTCOMES,
    ),
    (
        "Cognitive disability among adults ages >=18 years",
        5,
        "Cognitive disability (>=18)",
        DISABILITY,
    ),
    (
        "Self-care disability among adults aged >=18 years",
        5,
        "Self-care disability (>=18)",
        DISABILITY,
    ),
    (
        "Current smoking among adults aged >=18 years",
        4,
        "Current smoking (>=18)",
        HEALTH_RISK_BEHAVIORS,
    ),
    ("Obesity among adults aged >=18 years", 4, "Obesity (>=18)", HEALTH_OUTCOMES),
    ("Depression among adults aged >=18 years", 4, "Depression (>=18)", HEALTH_OUTCOMES),
    (
        "Binge drinking among adults aged >=18 years",
        4,
        "Binge drinking (>=18)",
        HEALTH_RISK_BEHAVIORS,
    ),
    (
        "Mental health not good for >=14 days among adults aged >=18 years",
        4,
        "Poor mental health (>=18)",
        HEALTH_STATUS,
    ),
    (
        "Mobility disability among adults aged >=18 years",
        4,
        "Mobility disability (>=18)",
        DISABILITY,
    ),
    (
        "High blood pressure among adults aged >=18 years",
        4,
        "High blood pressure (>=18)",
        HEALTH_OUTCOMES,
    ),
    (
        "Independent living disability among adults aged >=18 years",
        4,
        "Independent living disability (>=18)",
        DISABILITY,
    ),
    (
        "Vision disability among adults aged >=18 years",
        4,
        "Vision disability (>=18)",
        DISABILITY,
    ),
    (
        "Any disability among adults aged >=18 years",
        4,
        "Any disability (>=18)",
        DISABILITY,
    ),
    ("Arthritis among adults aged >=18 years", 3, "Arthritis (>=18)", HEALTH_OUTCOMES),
    (
        "No leisure-time physical activity among adults aged >=18 years",
        3,
        "No physical activity (>=18)",
        HEALTH_RISK_BEHAVIORS,
    ),
    (
        "Physical health not good for >=14 days among adults aged >=18 years",
        3,
        "Poor physical health (>=18)",
        HEALTH_STATUS,
    ),
    (
        "Fair or poor self-rated health status among adults aged >=18 years",
        3,
        "Poor health self-rating (>=18)",
        HEALTH_STATUS,
    ),
    (
        "All teeth lost among adults aged >=65 years",
        3,
        "All teeth lost (>=65)",
        HEALTH_OUTCOMES,
    ),
    (
        "Current lack of health insurance among adults aged 18-64 years",
        3,
        "Lack of insurance (18-64)",
        PREVENTION,
    ),
    (
        "High cholesterol among adults aged >=18 years who have been screened in the past 5 years",
        2,
        "High cholesterol if screening last 5 yrs (>=18)",
        HEALTH_OUTCOMES,
    ),
    (
        "Sleeping less than 7 hours among adults aged >=18 years",
        2,
        "Sleeping < 7 hours (>=18)",
        HEALTH_RISK_BEHAVIORS,
    ),
    (
        "Current asthma among adults aged >=18 years",
        2,
        "Current asthma (>=18)",
        HEALTH_OUTCOMES,
    ),
    (
        "Not taking medicine for high blood pressure among adults aged >=18 years",
        2,
        "Not on hypertension medicine (>=18)",
        PREVENTION,
    ),
    (
        "Older adult men aged >=65 years not up to date on clinical preventive services",
        2,
        "Men not up to date: clinical preventive (>=65)",
        PREVENTION,
    ),
    (
        "Older adult women aged >=65 years not up to date on clinical preventive services",
        2,
        "Women not up to date: clinical preventive (>=65)",
        PREVENTION,
    ),
    (
        "No mammography use among women aged 50-74 years",
        1,
        "No mammography use (50-74)",
        PREVENTION,
    ),
    (
        "No colorectal cancer screening among adults aged 50-75 years",
        1,
        "No colorectal cancer screening (50-75)",
        PREVENTION,
    ),
    (
        "No cervical cancer screening among adult women aged 21-65 years",
        1,
        "No cervical cancer screening (21-65)",
        PREVENTION,
    ),
    (
        "No doctor visit for checkup in past year among adults aged >=18 years",
        1,
        "No doctor visit (>=18)",
        PREVENTION,
    ),
    (
        "No dental visit in past year among adults aged >=18 years",
        1,
        "No dental visit (>=18)",
        PREVENTION,
    ),
    (
        "No cholesterol screening among adults aged >=18 years",
        1,
        "No cholesterol screening (>=18)",
        PREVENTION,
    ),
    (
        "Hearing disability among adults aged >=18 years",
        1,
        "Hearing disability (>=18)",
        DISABILITY,
    ),
];
