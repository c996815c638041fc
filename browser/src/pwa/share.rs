//! Web Share
//!
//! Hands the current page to the platform share sheet.

use serde::Serialize;

/// Payload given to the share sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShareData {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl ShareData {
    /// Share the page at `url`
    pub fn for_page(url: impl Into<String>) -> Self {
        Self {
            title: "PWA Lab".to_string(),
            text: "Local PWA demo".to_string(),
            url: url.into(),
        }
    }
}

/// Why a share did not complete
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShareError {
    #[error("share aborted by user")]
    Aborted,
    #[error("share failed: {0}")]
    Failed(String),
}

/// The platform share sheet
pub trait ShareTarget {
    fn share(&mut self, data: &ShareData) -> Result<(), ShareError>;
}

/// Share `data` if the platform can; returns the status line.
pub fn share_page(target: Option<&mut dyn ShareTarget>, data: &ShareData) -> String {
    let Some(target) = target else {
        return "Web Share not supported.".to_string();
    };
    match target.share(data) {
        Ok(()) => "Shared!".to_string(),
        Err(err) => {
            log::debug!("{}", err);
            "Share cancelled.".to_string()
        }
    }
}
