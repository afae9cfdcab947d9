//! Window rules: pre-assigning floating state and workspaces by window
//! properties.
use tracing::debug;

/// A single rule matched against an incoming window.
///
/// All specified fields must match for the rule to apply. Matching is
/// case-insensitive substring containment on the lower-cased property
/// values.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    pub class: Option<String>,
    pub instance: Option<String>,
    pub title: Option<String>,
    pub floating: Option<bool>,
    pub workspace: Option<usize>,
}

impl Rule {
    /// A rule floating every window of the given class.
    pub fn float_class(class: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
            floating: Some(true),
            ..Default::default()
        }
    }

    /// A rule floating windows of the given class with a matching title.
    pub fn float_class_title(class: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            class: Some(class.into()),
            title: Some(title.into()),
            floating: Some(true),
            ..Default::default()
        }
    }

    /// A rule pinning every window of the given class to a workspace.
    pub fn on_workspace(class: impl Into<String>, workspace: usize) -> Self {
        Self {
            class: Some(class.into()),
            workspace: Some(workspace),
            ..Default::default()
        }
    }

    fn matches(&self, class: &str, instance: &str, title: &str) -> bool {
        fn field_matches(wanted: &Option<String>, value: &str) -> bool {
            match wanted {
                Some(w) => value.contains(&w.to_lowercase()),
                None => true,
            }
        }

        field_matches(&self.class, class)
            && field_matches(&self.instance, instance)
            && field_matches(&self.title, title)
    }
}

/// What the rules decided for an incoming window.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RuleOutcome {
    pub floating: bool,
    pub workspace: Option<usize>,
}

/// Run every rule against the window's lower-cased properties.
///
/// Matches accumulate in order: a later matching rule overwrites whatever an
/// earlier one set (last match wins, for both fields).
pub fn apply_rules(rules: &[Rule], class: &str, instance: &str, title: &str) -> RuleOutcome {
    let (class, instance, title) = (
        class.to_lowercase(),
        instance.to_lowercase(),
        title.to_lowercase(),
    );

    let mut outcome = RuleOutcome::default();
    for rule in rules {
        if !rule.matches(&class, &instance, &title) {
            continue;
        }

        debug!(?rule, %class, "window rule matched");
        if let Some(f) = rule.floating {
            outcome.floating = f;
        }
        if rule.workspace.is_some() {
            outcome.workspace = rule.workspace;
        }
    }

    outcome
}

/// The default rule set: floats the usual suspects.
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule::float_class("floating"),
        Rule::float_class("dialog"),
        Rule::float_class("popup"),
        Rule::float_class("pavucontrol"),
        Rule::float_class("nm-connection-editor"),
        Rule::float_class("blueman-manager"),
        Rule::float_class("file-roller"),
        Rule::float_class("gnome-calculator"),
        Rule::float_class_title("steam", "Friends List"),
        Rule::float_class("mpv"),
        Rule::float_class("feh"),
        Rule::float_class("imv"),
        Rule::float_class("sxiv"),
        Rule::float_class("pinentry"),
        Rule::float_class("gcr-prompter"),
        Rule::float_class("zoom"),
    ]
}
