use serde::{Deserialize, Serialize};

use crate::network::Quality;

/// Who is using the shell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Teach,
    #[default]
    Learn,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Teach => "teach",
            UserRole::Learn => "learn",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Teach => "Teacher",
            UserRole::Learn => "Learner",
        }
    }
}

/// Interface language
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    En,
    Ur,
}

impl Lang {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Ur => "ur",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Lang::En => "EN",
            Lang::Ur => "اُردو",
        }
    }

    pub fn toggle(&self) -> Lang {
        match self {
            Lang::En => Lang::Ur,
            Lang::Ur => Lang::En,
        }
    }
}

/// Manual override of the model choice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    #[default]
    Auto,
    Online,
    Offline,
}

impl ConnectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionMode::Auto => "auto",
            ConnectionMode::Online => "online",
            ConnectionMode::Offline => "offline",
        }
    }

    /// auto -> online -> offline -> auto
    pub fn next(&self) -> ConnectionMode {
        match self {
            ConnectionMode::Auto => ConnectionMode::Online,
            ConnectionMode::Online => ConnectionMode::Offline,
            ConnectionMode::Offline => ConnectionMode::Auto,
        }
    }
}

/// Backend model tier chosen for the current conditions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    Local,
    Lightweight,
    Full,
}

impl ModelTier {
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelTier::Local => "LM Studio (local)",
            ModelTier::Lightweight => "Gemini 2.0 Flash",
            ModelTier::Full => "Gemini 2.5 Pro",
        }
    }
}

/// Pick the model tier. `online`/`offline` bypass the quality-driven choice;
/// `auto` falls back to the local model on poor or unknown quality.
pub fn select_model(mode: ConnectionMode, quality: Quality) -> ModelTier {
    match mode {
        ConnectionMode::Offline => ModelTier::Local,
        ConnectionMode::Online => match quality {
            Quality::Good => ModelTier::Full,
            _ => ModelTier::Lightweight,
        },
        ConnectionMode::Auto => match quality {
            Quality::Good => ModelTier::Full,
            Quality::Ok => ModelTier::Lightweight,
            Quality::Poor | Quality::Unknown => ModelTier::Local,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_follows_quality() {
        assert_eq!(select_model(ConnectionMode::Auto, Quality::Good), ModelTier::Full);
        assert_eq!(select_model(ConnectionMode::Auto, Quality::Ok), ModelTier::Lightweight);
        assert_eq!(select_model(ConnectionMode::Auto, Quality::Poor), ModelTier::Local);
        assert_eq!(select_model(ConnectionMode::Auto, Quality::Unknown), ModelTier::Local);
    }

    #[test]
    fn test_manual_overrides() {
        for q in [Quality::Good, Quality::Ok, Quality::Poor, Quality::Unknown] {
            assert_eq!(select_model(ConnectionMode::Offline, q), ModelTier::Local);
            assert_ne!(select_model(ConnectionMode::Online, q), ModelTier::Local);
        }
        assert_eq!(select_model(ConnectionMode::Online, Quality::Good), ModelTier::Full);
        assert_eq!(select_model(ConnectionMode::Online, Quality::Poor), ModelTier::Lightweight);
    }

    #[test]
    fn test_mode_cycle() {
        let mut mode = ConnectionMode::default();
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(mode.as_str());
            mode = mode.next();
        }
        assert_eq!(seen, vec!["auto", "online", "offline", "auto"]);
    }

    #[test]
    fn test_lang_serde() {
        assert_eq!(serde_json::to_string(&Lang::Ur).unwrap(), "\"ur\"");
        assert_eq!(Lang::En.toggle(), Lang::Ur);
        assert_eq!(UserRole::default(), UserRole::Learn);
    }
}
