use std::io::Write as _;
use std::process::{Command, Stdio};

use anyhow::Context as _;

use crate::foundation::error::{PosterError, PosterResult};

/// Notice shown when the platform cannot share and the link was copied instead.
pub const FALLBACK_NOTICE: &str = "Sharing not supported. Link copied.";

/// Notice shown when neither sharing nor copying the link worked.
pub const FAILED_NOTICE: &str = "Sharing not supported and the link could not be copied.";

/// Notice shown when sharing is unavailable and there is no link to copy.
pub const NO_LINK_NOTICE: &str = "Sharing not supported and no link is configured.";

/// Link metadata handed to the platform share capability.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SharePayload {
    /// Share sheet title.
    pub title: String,
    /// Message body.
    pub text: String,
    /// Page link; also what the clipboard fallback copies.
    pub url: String,
}

impl Default for SharePayload {
    fn default() -> Self {
        Self {
            title: "मी मतदार".to_string(),
            text: "माझा नगराध्यक्ष डॉ. दिलीप रामकृष्ण रत्नपारखी".to_string(),
            url: String::new(),
        }
    }
}

/// Platform share capability.
pub trait ShareTarget {
    /// Offer `payload` to the platform. Returns [`PosterError::Share`] when the capability is
    /// missing or the platform refused.
    fn share(&mut self, payload: &SharePayload) -> PosterResult<()>;
}

/// System text clipboard.
pub trait Clipboard {
    /// Replace the clipboard contents with `text`.
    fn set_text(&mut self, text: &str) -> PosterResult<()>;
}

/// Result of [`share`]. Never an error: the caller only shows `notice`, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The platform accepted the payload.
    Shared,
    /// Sharing was unavailable; the link went to the clipboard.
    CopiedToClipboard {
        /// User-facing message.
        notice: String,
    },
    /// Sharing and the clipboard fallback both failed.
    Failed {
        /// User-facing message.
        notice: String,
    },
}

impl ShareOutcome {
    /// User-facing notice, if the outcome has one.
    pub fn notice(&self) -> Option<&str> {
        match self {
            Self::Shared => None,
            Self::CopiedToClipboard { notice } | Self::Failed { notice } => Some(notice),
        }
    }
}

/// Try the platform share first, then fall back to copying `payload.url`.
///
/// An empty `url` is never copied; the outcome is [`ShareOutcome::Failed`] instead.
pub fn share(
    payload: &SharePayload,
    target: &mut dyn ShareTarget,
    clipboard: &mut dyn Clipboard,
) -> ShareOutcome {
    let err = match target.share(payload) {
        Ok(()) => return ShareOutcome::Shared,
        Err(e) => e,
    };
    if payload.url.trim().is_empty() {
        tracing::warn!(error = %err, "share unavailable and no link to copy");
        return ShareOutcome::Failed {
            notice: NO_LINK_NOTICE.to_string(),
        };
    }
    tracing::warn!(error = %err, "share unavailable, copying link");
    match clipboard.set_text(&payload.url) {
        Ok(()) => ShareOutcome::CopiedToClipboard {
            notice: FALLBACK_NOTICE.to_string(),
        },
        Err(e) => {
            tracing::warn!(error = %e, "clipboard fallback failed");
            ShareOutcome::Failed {
                notice: FAILED_NOTICE.to_string(),
            }
        }
    }
}

/// Share target for platforms without a native share capability.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unsupported;

impl ShareTarget for Unsupported {
    fn share(&mut self, _payload: &SharePayload) -> PosterResult<()> {
        Err(PosterError::share("native share is not available"))
    }
}

/// Clipboard backed by `wl-copy`, falling back to `xclip`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CommandClipboard;

impl Clipboard for CommandClipboard {
    fn set_text(&mut self, text: &str) -> PosterResult<()> {
        match pipe_to("wl-copy", &[], text) {
            Ok(()) => Ok(()),
            Err(wl) => {
                tracing::debug!(error = %wl, "wl-copy failed, trying xclip");
                pipe_to("xclip", &["-selection", "clipboard"], text)
                    .map_err(|e| PosterError::share(format!("no clipboard tool worked: {e}")))
            }
        }
    }
}

fn pipe_to(program: &str, args: &[&str], text: &str) -> PosterResult<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("spawn {program}"))?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .with_context(|| format!("write to {program}"))?;
    }
    let status = child.wait().with_context(|| format!("wait for {program}"))?;
    if !status.success() {
        return Err(PosterError::share(format!("{program} exited with {status}")));
    }
    Ok(())
}

/// In-process clipboard, for hosts that manage the clipboard themselves and for tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryClipboard {
    /// Last text written.
    pub contents: Option<String>,
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> PosterResult<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/share.rs"]
mod tests;
