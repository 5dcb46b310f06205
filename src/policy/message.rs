//! Comment bodies posted by the bot.
//!
//! Every function here is a pure string builder. The pull request author is
//! always passed in explicitly.

use std::fmt;
use std::sync::Arc;

use minijinja::{context, Environment, Value};
use thiserror::Error;

const GREETING: &str = " thanks for the pull request!\n\n";

const CHANGELOG_REMINDER: &str = "I noticed that [`CHANGES.md`](https://github.com/AnalyticalGraphicsInc/cesium/blob/master/CHANGES.md) has not been updated. \
If this change updates the Cesium API in any way, fixes a bug, or makes any non-trivial update, please add a bullet point to `CHANGES.md` and bump this pull request so we know it was updated. \
For more info, see the [Pull Request Guidelines]( https://github.com/AnalyticalGraphicsInc/cesium/blob/master/CONTRIBUTING.md#pull-request-guidelines).\n\n";

const FOLDER_REMINDER_LEAD: &str = "I noticed that a file in ";

const FOLDER_REMINDER_TAIL: &str = " has been added or modified. \
Please verify that it has a section in [LICENSE.md](https://github.com/AnalyticalGraphicsInc/cesium/blob/master/LICENSE.md) \
and that its license information is up to date with this new version.  Once you do, please confirm by commenting on this pull request.\n\n";

const SIGN_OFF: &str = "__I am a bot who helps you make Cesium awesome!__ Thanks again.";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("invalid template syntax: {message}")]
    InvalidSyntax { message: String },

    #[error("template rendering failed: {message}")]
    RenderFailed { message: String },
}

/// Values available to a stale-reminder template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaleContext {
    pub max_days_since_update: f64,
}

type RenderFn = dyn Fn(&StaleContext) -> Result<String, TemplateError> + Send + Sync;

/// Per-repository stale reminder, held as a function value so each
/// repository can swap in its own wording.
#[derive(Clone)]
pub struct StaleTemplate(Arc<RenderFn>);

impl StaleTemplate {
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&StaleContext) -> Result<String, TemplateError> + Send + Sync + 'static,
    {
        Self(Arc::new(render))
    }

    /// Build a template from MiniJinja source. The threshold is exposed as
    /// `{{ maxDaysSinceUpdate }}`. Syntax errors are reported here rather
    /// than on first use.
    pub fn from_source(source: &str) -> Result<Self, TemplateError> {
        Environment::new()
            .add_template("stale", source)
            .map_err(|e| TemplateError::InvalidSyntax {
                message: e.to_string(),
            })?;

        let source = source.to_string();
        Ok(Self::new(move |ctx| render_source(&source, ctx)))
    }

    pub fn render(&self, ctx: &StaleContext) -> Result<String, TemplateError> {
        (self.0)(ctx)
    }
}

impl fmt::Debug for StaleTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaleTemplate(..)")
    }
}

fn render_source(source: &str, ctx: &StaleContext) -> Result<String, TemplateError> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
    env.add_template("stale", source)
        .map_err(|e| TemplateError::InvalidSyntax {
            message: e.to_string(),
        })?;

    let template = env
        .get_template("stale")
        .map_err(|e| TemplateError::RenderFailed {
            message: e.to_string(),
        })?;

    template
        .render(context! { maxDaysSinceUpdate => days_value(ctx.max_days_since_update) })
        .map_err(|e| TemplateError::RenderFailed {
            message: e.to_string(),
        })
}

/// Whole-day thresholds render as `30`, not `30.0`.
fn days_value(days: f64) -> Value {
    if days.fract() == 0.0 && days.abs() < i64::MAX as f64 {
        Value::from(days as i64)
    } else {
        Value::from(days)
    }
}

pub fn render_stale_message(
    template: &StaleTemplate,
    max_days_since_update: f64,
) -> Result<String, TemplateError> {
    template.render(&StaleContext {
        max_days_since_update,
    })
}

pub fn render_changelog_reminder(author_login: &str) -> String {
    let mut message = format!("@{author_login}{GREETING}");
    message.push_str(CHANGELOG_REMINDER);
    message.push_str(SIGN_OFF);
    message
}

pub fn render_restricted_folder_reminder<F: AsRef<str>>(author_login: &str, folders: &[F]) -> String {
    let mut message = format!("@{author_login}{GREETING}");
    message.push_str(FOLDER_REMINDER_LEAD);
    message.push_str(&enumerate_folders(folders));
    message.push_str(FOLDER_REMINDER_TAIL);
    message.push_str(SIGN_OFF);
    message
}

/// `` `a` ``, `` `a` or `b` ``, `` `a`, `b`, or `c` ``.
fn enumerate_folders<F: AsRef<str>>(folders: &[F]) -> String {
    let quoted: Vec<String> = folders
        .iter()
        .map(|folder| {
            let folder: &str = folder.as_ref();
            format!("`{folder}`")
        })
        .collect();

    match quoted.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} or {second}"),
        [init @ .., last] => format!("{}, or {}", init.join(", "), last),
    }
}
