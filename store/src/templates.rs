//! Introduction message templates.
//!
//! `IntroductionRecord.templateUsed` stores a template id. Ids outside the
//! catalogue (older or hand-written records) display as "Custom".

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntroTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub body: &'static str,
}

/// Label shown for introductions whose template is not in the catalogue.
pub const CUSTOM_TEMPLATE_LABEL: &str = "Custom";

/// Default template id.
pub const DEFAULT_TEMPLATE_ID: &str = "formal";

pub const INTRO_TEMPLATES: [IntroTemplate; 3] = [
    IntroTemplate {
        id: "formal",
        name: "Formal Introduction",
        body: "Assalamu Alaikum,

My name is [YOUR_NAME] and I came across your profile on HalalMatches. I am reaching out with the intention of marriage, in accordance with Islamic principles.

I am [AGE] years old, [OCCUPATION], and currently based in [LOCATION]. I practice [MADHAB/APPROACH] and am looking for a spouse who shares similar values.

If you are interested, I would be happy to have our families/walis connect to discuss further.

JazakAllahu Khair",
    },
    IntroTemplate {
        id: "brief",
        name: "Brief & Direct",
        body: "Assalamu Alaikum,

I'm [YOUR_NAME]. Your profile resonated with what I'm looking for in a spouse. I'm serious about marriage and would like to know if you'd be open to a halal conversation with wali involvement.

Please let me know if you're interested.

Wassalam",
    },
    IntroTemplate {
        id: "wali-first",
        name: "Wali-First Approach",
        body: "Assalamu Alaikum,

I am writing on behalf of my [son/daughter/self], [NAME], regarding your profile on HalalMatches.

We would like to initiate a conversation about the possibility of marriage. Our family takes this matter seriously and we prefer to proceed with proper Islamic guidelines from the start.

Please have your wali contact us at [CONTACT] if there is interest.

JazakAllahu Khair",
    },
];

impl IntroTemplate {
    /// Look up a template by id.
    pub fn find(id: &str) -> Option<&'static IntroTemplate> {
        INTRO_TEMPLATES.iter().find(|t| t.id == id)
    }

    pub fn default_template() -> &'static IntroTemplate {
        &INTRO_TEMPLATES[0]
    }
}

/// Display name for a stored `templateUsed` value.
pub fn template_label(template_used: Option<&str>) -> &'static str {
    template_used
        .and_then(IntroTemplate::find)
        .map_or(CUSTOM_TEMPLATE_LABEL, |t| t.name)
}
