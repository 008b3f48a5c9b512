use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LightingStyle {
    Architectural,
    Pathway,
    Garden,
    OutdoorLiving,
    Security,
    Combination,
}

const ARCHITECTURAL_PROMPT: &str = "Add professional architectural uplighting to this home exterior.
Install warm amber LED uplights (2700K-3000K color temperature) positioned at the base of the home,
aimed upward to highlight the home's facade, columns, and architectural features.
The lights should cast a warm, inviting glow that accentuates textures and creates dramatic shadows.
Make it look like a professional landscape lighting installation, photorealistic and natural.
The scene should be at dusk or nighttime with the sky showing deep blue tones.";

const PATHWAY_PROMPT: &str = "Add professional path and walkway lighting to this home exterior.
Install low-voltage LED path lights along walkways, driveways, and garden borders.
Use warm amber fixtures (2700K-3000K) spaced evenly, creating pools of light that guide visitors.
The lights should illuminate the path while creating an elegant, welcoming atmosphere.
Make it look like a professional landscape lighting installation, photorealistic and natural.
The scene should be at dusk or nighttime.";

const GARDEN_PROMPT: &str = "Add professional garden and plant highlighting to this home exterior.
Install accent lights to highlight trees, shrubs, and landscaping features.
Use uplights at the base of trees to create dramatic silhouettes and moonlighting effects.
Add spotlights to showcase specimen plants and garden focal points.
Use warm amber LED lights (2700K-3000K) for a natural, inviting look.
Make it look like a professional landscape lighting installation, photorealistic and natural.
The scene should be at dusk or nighttime.";

const OUTDOOR_LIVING_PROMPT: &str = "Add professional outdoor living space lighting to this home exterior.
Install ambient lighting for patios, decks, and outdoor entertaining areas.
Include string lights, recessed deck lights, and wall-mounted fixtures.
Add task lighting for outdoor kitchens or seating areas.
Use warm white LED lights (2700K-3000K) to create a cozy, inviting atmosphere.
Make it look like a professional landscape lighting installation, photorealistic and natural.
The scene should be at dusk or nighttime.";

const SECURITY_PROMPT: &str = "Add professional security and flood lighting to this home exterior.
Install motion-activated LED floodlights at key entry points.
Add continuous low-level perimeter lighting for visibility.
Use a mix of warm white accent lights and brighter security fixtures.
Ensure all dark corners and entry points are well-illuminated.
Make it look like a professional landscape lighting installation, photorealistic and natural.
The scene should be at dusk or nighttime.";

const COMBINATION_PROMPT: &str = "Add a comprehensive professional landscape lighting design to this home exterior.
Include ALL of the following elements:
1. Architectural uplighting on the home's facade with warm amber LEDs
2. Path lights along walkways and driveways
3. Garden accent lights highlighting trees and landscaping
4. Ambient lighting for outdoor living spaces
5. Subtle security lighting at entry points
Use warm color temperatures (2700K-3000K) throughout for a cohesive look.
Create depth with layers of light - ambient, task, and accent lighting.
Make it look like a premium professional landscape lighting installation, photorealistic and natural.
The scene should be at dusk or nighttime with dramatic blue sky tones.";

impl LightingStyle {
    /// Every style in the order the upload form lists them.
    pub const ALL: [LightingStyle; 6] = [
        LightingStyle::Architectural,
        LightingStyle::Pathway,
        LightingStyle::Garden,
        LightingStyle::OutdoorLiving,
        LightingStyle::Security,
        LightingStyle::Combination,
    ];

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.key() == key)
    }

    pub fn key(self) -> &'static str {
        match self {
            LightingStyle::Architectural => "architectural",
            LightingStyle::Pathway => "pathway",
            LightingStyle::Garden => "garden",
            LightingStyle::OutdoorLiving => "outdoor_living",
            LightingStyle::Security => "security",
            LightingStyle::Combination => "combination",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            LightingStyle::Architectural => ARCHITECTURAL_PROMPT,
            LightingStyle::Pathway => PATHWAY_PROMPT,
            LightingStyle::Garden => GARDEN_PROMPT,
            LightingStyle::OutdoorLiving => OUTDOOR_LIVING_PROMPT,
            LightingStyle::Security => SECURITY_PROMPT,
            LightingStyle::Combination => COMBINATION_PROMPT,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            LightingStyle::Architectural => "Architectural Uplighting",
            LightingStyle::Pathway => "Path & Walkway",
            LightingStyle::Garden => "Garden & Plants",
            LightingStyle::OutdoorLiving => "Outdoor Living",
            LightingStyle::Security => "Security Lighting",
            LightingStyle::Combination => "Full Package",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            LightingStyle::Architectural => {
                "Highlight your home's facade and architectural features"
            }
            LightingStyle::Pathway => "Illuminate walkways and driveways with elegant path lights",
            LightingStyle::Garden => "Accent trees, shrubs, and landscaping features",
            LightingStyle::OutdoorLiving => "Create ambiance for patios and entertaining areas",
            LightingStyle::Security => "Well-lit entry points and perimeter lighting",
            LightingStyle::Combination => "Complete lighting design with all elements",
        }
    }
}

/// Instruction for the text-only stage: describe the lighting instead of
/// rendering it.
pub fn description_prompt(style_prompt: &str) -> String {
    format!(
        "You are a professional landscape lighting designer. Look at this photo of a home exterior \
and describe in vivid detail how it would look with the following lighting design installed:\n\n\
{style_prompt}\n\n\
In your description, cover:\n\
1. Where each fixture would be placed\n\
2. How the light would fall on the architecture and landscaping\n\
3. The overall mood and atmosphere at night\n\
4. Which features of the home would be highlighted\n\n\
Write 3-4 paragraphs in a warm, inviting tone aimed at the homeowner."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_round_trips() {
        for style in LightingStyle::ALL {
            assert_eq!(LightingStyle::from_key(style.key()), Some(style));
            assert!(!style.prompt().trim().is_empty());
        }
    }

    #[test]
    fn unknown_and_wrongly_cased_keys_are_rejected() {
        assert_eq!(LightingStyle::from_key("not_a_real_style"), None);
        assert_eq!(LightingStyle::from_key("Garden"), None);
        assert_eq!(LightingStyle::from_key(""), None);
    }

    #[test]
    fn serializes_as_snake_case_key() {
        let value = serde_json::to_value(LightingStyle::OutdoorLiving).unwrap();
        assert_eq!(value, serde_json::json!("outdoor_living"));
    }

    #[test]
    fn description_prompt_embeds_style_text() {
        let prompt = description_prompt(LightingStyle::Security.prompt());
        assert!(prompt.contains("motion-activated LED floodlights"));
        assert!(prompt.contains("Where each fixture would be placed"));
    }
}
