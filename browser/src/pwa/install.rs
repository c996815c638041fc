//! PWA Installation
//!
//! Deferred install prompt handling for the install button.

/// Install outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Accepted
    Accepted,
    /// Dismissed
    Dismissed,
}

/// Install choice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallChoice {
    /// Outcome
    pub outcome: InstallOutcome,
    /// Platform
    pub platform: String,
}

/// Installation prompt offered by the platform
#[derive(Debug, Clone)]
pub struct BeforeInstallPromptEvent {
    /// Platforms
    platforms: Vec<String>,
    /// User choice
    user_choice: Option<InstallChoice>,
    /// Default prevented
    default_prevented: bool,
}

impl BeforeInstallPromptEvent {
    /// Create new event
    pub fn new(platforms: Vec<String>) -> Self {
        Self {
            platforms,
            user_choice: None,
            default_prevented: false,
        }
    }

    /// Suppress the platform's own mini-infobar
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Check if default prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Show the prompt; `ask` is the user's answer
    pub fn prompt(&mut self, ask: impl FnOnce() -> InstallOutcome) -> InstallChoice {
        let choice = InstallChoice {
            outcome: ask(),
            platform: self
                .platforms
                .first()
                .cloned()
                .unwrap_or_else(|| "web".to_string()),
        };
        self.user_choice = Some(choice.clone());
        choice
    }

    /// Get user choice
    pub fn user_choice(&self) -> Option<&InstallChoice> {
        self.user_choice.as_ref()
    }
}

/// Install button state
#[derive(Debug, Default)]
pub struct InstallPrompt {
    deferred: Option<BeforeInstallPromptEvent>,
    button_visible: bool,
    help_visible: bool,
}

impl InstallPrompt {
    /// Create with nothing deferred
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the platform's prompt for later and reveal the install button
    pub fn defer(&mut self, mut event: BeforeInstallPromptEvent) {
        event.prevent_default();
        self.deferred = Some(event);
        self.button_visible = true;
    }

    /// Whether the install button is shown
    pub fn button_visible(&self) -> bool {
        self.button_visible
    }

    /// Show or hide the manual-install help
    pub fn toggle_help(&mut self) -> bool {
        self.help_visible = !self.help_visible;
        self.help_visible
    }

    /// Handle a click on the install button; returns the status line.
    ///
    /// The deferred prompt can only be used once.
    pub fn click(&mut self, ask: impl FnOnce() -> InstallOutcome) -> String {
        let Some(mut event) = self.deferred.take() else {
            return "Install not available right now.".to_string();
        };
        let choice = event.prompt(ask);
        self.button_visible = false;
        log::info!("install prompt: {:?} on {}", choice.outcome, choice.platform);
        match choice.outcome {
            InstallOutcome::Accepted => "Install started.".to_string(),
            InstallOutcome::Dismissed => "Install cancelled.".to_string(),
        }
    }
}
