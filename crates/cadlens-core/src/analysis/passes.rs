//! The five fixed analysis passes and their prompts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Facet of the drawing a pass targets.
///
/// Declaration order is run order and report order, so `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassName {
    Overview,
    Technical,
    Components,
    Measurements,
    Quality,
}

impl PassName {
    pub const ALL: [PassName; 5] = [
        PassName::Overview,
        PassName::Technical,
        PassName::Components,
        PassName::Measurements,
        PassName::Quality,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PassName::Overview => "overview",
            PassName::Technical => "technical",
            PassName::Components => "components",
            PassName::Measurements => "measurements",
            PassName::Quality => "quality",
        }
    }

    /// Upper-case label used in headers ("OVERVIEW").
    pub fn label(&self) -> String {
        self.as_str().to_uppercase()
    }
}

impl fmt::Display for PassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pass name paired with its prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisPass {
    pub name: PassName,
    pub prompt: &'static str,
}

impl AnalysisPass {
    /// All five passes in run order.
    pub fn standard() -> [AnalysisPass; 5] {
        PassName::ALL.map(|name| AnalysisPass {
            name,
            prompt: prompt_for(name),
        })
    }
}

fn prompt_for(name: PassName) -> &'static str {
    match name {
        PassName::Overview => OVERVIEW_PROMPT,
        PassName::Technical => TECHNICAL_PROMPT,
        PassName::Components => COMPONENTS_PROMPT,
        PassName::Measurements => MEASUREMENTS_PROMPT,
        PassName::Quality => QUALITY_PROMPT,
    }
}

const OVERVIEW_PROMPT: &str = "\
Analyze this CAD drawing and provide a comprehensive overview:

1. **Drawing Type & Purpose**: What type of drawing is this? What is its primary purpose?
2. **Overall Layout**: Describe the composition, organization, and structure.
3. **Key Elements**: List the 5-10 most important elements visible.
4. **Complexity**: Rate complexity (Simple/Moderate/Complex/Very Complex) and explain why.
5. **Industry Context**: What industry would use this?

Be detailed and technical.";

const TECHNICAL_PROMPT: &str = "\
Provide detailed technical analysis:

1. **Dimensions & Scale**: All visible dimensions, units, scale indicators
2. **Line Types**: Different line types (solid, dashed, center, hidden)
3. **Annotations**: All text, labels, callouts, title blocks
4. **Symbols**: Standard symbols, drawing standards (ISO, ANSI, etc.)
5. **Views**: Projection method, all views shown, section indicators

Be extremely thorough.";

const COMPONENTS_PROMPT: &str = "\
Analyze components and features:

1. **Component Inventory**: List every distinct component/part
2. **Geometric Features**: Shapes, holes, slots, chamfers, fillets
3. **Materials**: Material callouts, hatch patterns, finish indicators
4. **Structure**: Assemblies, sub-assemblies, relationships
5. **Special Features**: Unique or notable features

Provide complete technical inventory.";

const MEASUREMENTS_PROMPT: &str = "\
Extract all measurements and specifications:

1. **Dimensional Data**: ALL dimensions with units and tolerances
2. **Critical Dimensions**: Most important dimensions
3. **Coordinates**: Coordinate systems, datum references, grids
4. **Quantities**: Counts, areas, volumes
5. **Specifications**: Weights, capacities, ratings, quality requirements

Create comprehensive dimensional database.";

const QUALITY_PROMPT: &str = "\
Assess quality and completeness:

1. **Clarity**: Rate line clarity, text readability (1-10)
2. **Completeness**: All necessary views, dimensions, details included?
3. **Standards**: Follows drafting standards correctly?
4. **Issues**: Errors, inconsistencies, conflicts, ambiguities
5. **Recommendations**: Improvements needed

Professional quality assessment.";
