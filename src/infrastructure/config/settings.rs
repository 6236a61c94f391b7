//! Generation settings: caller-supplied overrides layered over layout-derived defaults

use serde::Deserialize;

use crate::generation::GenerationError;
use crate::infrastructure::config::PackLayout;
use crate::infrastructure::paths::normalize_pattern;

/// A pattern field that accepts either a single glob or a list of globs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PatternList {
    One(String),
    Many(Vec<String>),
}

impl PatternList {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            PatternList::One(pattern) => vec![pattern],
            PatternList::Many(patterns) => patterns,
        }
    }
}

/// Settings exactly as the caller supplied them. `None` means "not supplied".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsInput {
    #[serde(default)]
    pub include: Option<PatternList>,
    #[serde(default)]
    pub exclude: Option<PatternList>,
    #[serde(default)]
    pub pretty: Option<bool>,
}

impl SettingsInput {
    /// Parses the optional JSON settings argument. An absent or blank argument
    /// yields empty input.
    pub fn from_json(raw: Option<&str>) -> Result<Self, GenerationError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(raw) => serde_json::from_str(raw)
                .map_err(|e| GenerationError::InvalidSettings(format!("{e}: {raw}"))),
        }
    }
}

/// Immutable settings for one generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub pretty: bool,
}

impl GenerationSettings {
    /// Built-in defaults for the standard `BP`/`RP` layout.
    pub fn defaults_for(layout: &PackLayout) -> Self {
        let bp = layout.behavior_pack_dir.replace('\\', "/");
        let rp = layout.resource_pack_dir.replace('\\', "/");
        Self {
            include: vec![format!("{bp}/**/*.ts"), format!("{rp}/**/*.ts")],
            exclude: vec![format!("{bp}/scripts/**"), "**/*.d.ts".to_string()],
            pretty: true,
        }
    }

    /// Applies caller overrides field by field; unsupplied pattern lists
    /// derive from the resolved layout. Every pattern is normalized for the
    /// working directory.
    pub fn resolve(input: SettingsInput, layout: &PackLayout) -> Self {
        let defaults = Self::defaults_for(layout);

        let include = input
            .include
            .map(PatternList::into_vec)
            .unwrap_or(defaults.include);
        let exclude = input
            .exclude
            .map(PatternList::into_vec)
            .unwrap_or(defaults.exclude);

        Self {
            include: include.iter().map(|p| normalize_pattern(p)).collect(),
            exclude: exclude.iter().map(|p| normalize_pattern(p)).collect(),
            pretty: input.pretty.unwrap_or(defaults.pretty),
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::defaults_for(&PackLayout::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom_layout() -> PackLayout {
        PackLayout {
            behavior_pack_dir: "my_bp".to_string(),
            resource_pack_dir: "my_rp".to_string(),
        }
    }

    #[test]
    fn test_defaults() {
        let settings = GenerationSettings::default();
        assert_eq!(settings.include, vec!["BP/**/*.ts", "RP/**/*.ts"]);
        assert_eq!(settings.exclude, vec!["BP/scripts/**", "**/*.d.ts"]);
        assert!(settings.pretty);
    }

    #[test]
    fn test_unsupplied_fields_derive_from_layout() {
        let settings = GenerationSettings::resolve(SettingsInput::default(), &custom_layout());
        assert_eq!(settings.include, vec!["my_bp/**/*.ts", "my_rp/**/*.ts"]);
        assert_eq!(settings.exclude, vec!["my_bp/scripts/**", "**/*.d.ts"]);
    }

    #[test]
    fn test_include_override_keeps_layout_exclude() {
        let input = SettingsInput::from_json(Some(r#"{"include": "packs/BP/items/*.ts"}"#)).unwrap();
        let settings = GenerationSettings::resolve(input, &custom_layout());

        assert_eq!(settings.include, vec!["BP/items/*.ts"]);
        assert_eq!(settings.exclude, vec!["my_bp/scripts/**", "**/*.d.ts"]);
        assert!(settings.pretty);
    }

    #[test]
    fn test_exclude_override_and_pretty() {
        let input = SettingsInput::from_json(Some(
            r#"{"exclude": ["./BP\\gen\\**"], "pretty": false, "unknown": 1}"#,
        ))
        .unwrap();
        let settings = GenerationSettings::resolve(input, &PackLayout::default());

        assert_eq!(settings.include, vec!["BP/**/*.ts", "RP/**/*.ts"]);
        assert_eq!(settings.exclude, vec!["BP/gen/**"]);
        assert!(!settings.pretty);
    }

    #[test]
    fn test_from_json_absent_and_invalid() {
        assert_eq!(SettingsInput::from_json(None).unwrap(), SettingsInput::default());
        assert_eq!(SettingsInput::from_json(Some("  ")).unwrap(), SettingsInput::default());

        let result = SettingsInput::from_json(Some("{include: "));
        assert!(matches!(result, Err(GenerationError::InvalidSettings(_))));

        let result = SettingsInput::from_json(Some(r#"{"include": 3}"#));
        assert!(matches!(result, Err(GenerationError::InvalidSettings(_))));
    }
}
