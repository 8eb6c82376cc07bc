use std::time::Duration;

/// A class-based rule giving elements a transition duration.
///
/// `within` restricts the rule to elements that have an ancestor carrying
/// that class, like the descendant selector `.within .class`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRule {
    pub class: String,
    pub within: Option<String>,
    pub duration: Duration,
}

/// The computed-style side of the page: how long transitions take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    rules: Vec<TransitionRule>,
}

impl Default for Stylesheet {
    /// Bootstrap's modal timings: `.fade` fades in 150ms, the dialog inside a
    /// fading modal slides for 300ms.
    fn default() -> Self {
        Self::empty()
            .rule("fade", Duration::from_millis(150))
            .nested_rule("fade", "modal-dialog", Duration::from_millis(300))
    }
}

impl Stylesheet {
    /// A stylesheet without any transitions.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rule(mut self, class: impl Into<String>, duration: Duration) -> Self {
        self.rules.push(TransitionRule {
            class: class.into(),
            within: None,
            duration,
        });
        self
    }

    pub fn nested_rule(
        mut self,
        ancestor: impl Into<String>,
        class: impl Into<String>,
        duration: Duration,
    ) -> Self {
        self.rules.push(TransitionRule {
            class: class.into(),
            within: Some(ancestor.into()),
            duration,
        });
        self
    }

    pub fn rules(&self) -> &[TransitionRule] {
        &self.rules
    }

    /// Longest duration among rules matching an element with `classes`,
    /// where `has_ancestor_class` answers for the element's ancestors.
    pub fn transition_duration(
        &self,
        classes: &[String],
        has_ancestor_class: impl Fn(&str) -> bool,
    ) -> Duration {
        self.rules
            .iter()
            .filter(|rule| classes.iter().any(|c| *c == rule.class))
            .filter(|rule| match &rule.within {
                Some(ancestor) => has_ancestor_class(ancestor),
                None => true,
            })
            .map(|rule| rule.duration)
            .max()
            .unwrap_or(Duration::ZERO)
    }
}
