//! Background theme chosen from weather category and day/night state.

use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbientEffect {
    Clouds,
    Sun,
    Moon,
    Stars,
    Rain,
    Snow,
}

impl AmbientEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clouds => "clouds",
            Self::Sun => "sun",
            Self::Moon => "moon",
            Self::Stars => "stars",
            Self::Rain => "rain",
            Self::Snow => "snow",
        }
    }

    /// How many elements a renderer draws for this layer.
    pub fn particle_count(&self) -> usize {
        match self {
            Self::Clouds => 3,
            Self::Sun | Self::Moon => 1,
            Self::Stars => 60,
            Self::Rain => 120,
            Self::Snow => 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub sky: &'static str,
    pub ground: &'static str,
    pub text: &'static str,
    pub accent: &'static str,
    pub effects: BTreeSet<AmbientEffect>,
}

impl Theme {
    pub fn has(&self, effect: AmbientEffect) -> bool {
        self.effects.contains(&effect)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            sky: "#87CEEB",
            ground: "#ADD8E6",
            text: "#000000",
            accent: "#555555",
            effects: BTreeSet::new(),
        }
    }
}

fn night_palette() -> Theme {
    Theme {
        sky: "#020111",
        ground: "#000000",
        text: "#ffffff",
        accent: "#ffffff",
        effects: BTreeSet::new(),
    }
}

/// Pick the theme for a category (if known) at day or night.
pub fn select_theme(category: Option<&str>, is_day: bool) -> Theme {
    let mut theme = if is_day { Theme::default() } else { night_palette() };

    if !is_day {
        theme.effects.extend([AmbientEffect::Stars, AmbientEffect::Moon]);
    }

    match category {
        Some("Clouds") => {
            theme.effects.insert(AmbientEffect::Clouds);
            if is_day {
                theme.effects.insert(AmbientEffect::Sun);
            }
        }
        // Mirrors "Clouds" by day.
        Some("Clear") if is_day => {
            theme.effects.extend([AmbientEffect::Clouds, AmbientEffect::Sun]);
        }
        Some("Rain") => {
            theme.effects.insert(AmbientEffect::Rain);
        }
        Some("Snow") => {
            theme.effects.insert(AmbientEffect::Snow);
        }
        _ => {}
    }

    theme
}
