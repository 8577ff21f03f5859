//! Log line templates
//!
//! The config carries one line template per sink. Templates are parsed up
//! front so a typo degrades the logger to its fallback instead of producing
//! garbled output at runtime.

use std::fmt;

use chrono::Local;
use thiserror::Error;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Template parse failure
#[derive(Error, Debug)]
pub enum TemplateError {
    /// A `{...}` placeholder that is not in the supported set
    #[error("unknown placeholder '{{{0}}}' in log format template")]
    UnknownPlaceholder(String),

    /// A `{` without a closing `}`
    #[error("unterminated placeholder in log format template")]
    Unterminated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Time,
    Level,
    Target,
    Tag,
    Version,
    Message,
    Fields,
}

/// A parsed log line template
///
/// Supported placeholders: `{time}`, `{level}`, `{target}`, `{tag}`,
/// `{version}`, `{message}`, `{fields}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTemplate {
    segments: Vec<Segment>,
}

impl LineTemplate {
    /// Parse a template string, rejecting unknown placeholders
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars();

        while let Some(c) = chars.next() {
            if c != '{' {
                literal.push(c);
                continue;
            }
            let mut name = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(inner) => name.push(inner),
                    None => return Err(TemplateError::Unterminated),
                }
            }
            let segment = match name.as_str() {
                "time" => Segment::Time,
                "level" => Segment::Level,
                "target" => Segment::Target,
                "tag" => Segment::Tag,
                "version" => Segment::Version,
                "message" => Segment::Message,
                "fields" => Segment::Fields,
                _ => return Err(TemplateError::UnknownPlaceholder(name)),
            };
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(segment);
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }
}

/// Preformatted key-value pairs for the `*_with` logging calls
///
/// Rendered verbatim by the `{fields}` segment instead of as `extra=...`.
pub(crate) struct FieldList<'a>(pub &'a [(&'a str, String)]);

impl fmt::Display for FieldList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.0 {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{name}={value}")?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Default)]
struct EventVisitor {
    message: String,
    tag: Option<String>,
    version: Option<String>,
    fields: Vec<(String, String)>,
}

impl EventVisitor {
    fn record(&mut self, name: &str, value: String) {
        match name {
            "message" => self.message = value,
            "tag" => self.tag = Some(value),
            "version" => self.version = Some(value),
            _ => self.fields.push((name.to_string(), value)),
        }
    }
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record(field.name(), format!("{value:?}"));
    }
}

/// `FormatEvent` implementation driven by a `LineTemplate`
pub struct LineFormatter {
    template: LineTemplate,
}

impl LineFormatter {
    /// Formatter rendering the given template
    pub fn new(template: LineTemplate) -> Self {
        Self { template }
    }
}

fn level_color(level: Level) -> &'static str {
    if level == Level::ERROR {
        "\x1b[31m"
    } else if level == Level::WARN {
        "\x1b[33m"
    } else if level == Level::INFO {
        "\x1b[32m"
    } else if level == Level::DEBUG {
        "\x1b[34m"
    } else {
        "\x1b[35m"
    }
}

impl<S, N> FormatEvent<S, N> for LineFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        for segment in &self.template.segments {
            match segment {
                Segment::Literal(text) => writer.write_str(text)?,
                Segment::Time => write!(writer, "{}", Local::now().format(TIME_FORMAT))?,
                Segment::Level => {
                    let level = *metadata.level();
                    if writer.has_ansi_escapes() {
                        write!(writer, "{}{level:<8}\x1b[0m", level_color(level))?;
                    } else {
                        write!(writer, "{level:<8}")?;
                    }
                }
                Segment::Target => writer.write_str(metadata.target())?,
                Segment::Tag => writer.write_str(visitor.tag.as_deref().unwrap_or("-"))?,
                Segment::Version => writer.write_str(visitor.version.as_deref().unwrap_or("-"))?,
                Segment::Message => writer.write_str(&visitor.message)?,
                Segment::Fields => {
                    let mut first = true;
                    for (name, value) in &visitor.fields {
                        if !first {
                            writer.write_str(" ")?;
                        }
                        // FieldList values arrive preformatted under "extra"
                        if name == "extra" {
                            writer.write_str(value)?;
                        } else {
                            write!(writer, "{name}={value}")?;
                        }
                        first = false;
                    }
                }
            }
        }
        writeln!(writer)
    }
}
