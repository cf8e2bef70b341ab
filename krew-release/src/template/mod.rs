//! Manifest template rendering.
//!
//! A plugin repository ships a `.krew.yaml` template. Rendering substitutes
//! the release values and splices a `uri`/`sha256` block for every
//! `addURIAndSha` call:
//!
//! ```text
//!   - selector:
//!       matchLabels:
//!         os: darwin
//!     {{addURIAndSha "https://github.com/o/r/releases/download/{{ .TagName }}/a.tar.gz" .TagName }}
//! ```
//!
//! becomes
//!
//! ```text
//!   - selector:
//!       matchLabels:
//!         os: darwin
//!     uri: https://github.com/o/r/releases/download/v0.0.2/a.tar.gz
//!     sha256: d933...
//! ```
//!
//! The spliced block is aligned with the column the action started at, using
//! [`reindent`]. Checksums are computed from a fresh download on every render.

mod indent;
mod parse;
mod request;

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::source::{hash_from_reference, Downloader, HttpDownloader, SourceError, SourceResult};

pub use indent::reindent;
pub use request::ReleaseRequest;

use parse::{Action, Node, Operand};

/// Function that downloads an asset and splices its URI and checksum.
pub const ADD_URI_AND_SHA: &str = "addURIAndSha";

/// Name of the template file in a plugin repository.
pub const TEMPLATE_FILE_NAME: &str = ".krew.yaml";

/// Where a manifest template comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// A file on disk.
    Local(PathBuf),
    /// A URL fetched with a direct download.
    Remote(String),
}

impl TemplateSource {
    /// `http(s)://` locations are remote, everything else is a path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("https://") || location.starts_with("http://") {
            TemplateSource::Remote(location.to_string())
        } else {
            TemplateSource::Local(PathBuf::from(location))
        }
    }

    /// The `.krew.yaml` on the default branch of a GitHub repository.
    pub fn for_repository(owner: &str, repo: &str) -> Self {
        TemplateSource::Remote(format!(
            "https://raw.githubusercontent.com/{}/{}/master/{}",
            owner, repo, TEMPLATE_FILE_NAME
        ))
    }

    /// Load the template text.
    ///
    /// Remote templates are downloaded into a temp file which is removed
    /// after reading.
    pub fn read(&self, http: &HttpDownloader) -> SourceResult<String> {
        match self {
            TemplateSource::Local(path) => {
                std::fs::read_to_string(path).map_err(|e| SourceError::io(path, e))
            }
            TemplateSource::Remote(url) => {
                let file = http.fetch(url, TEMPLATE_FILE_NAME)?;
                let text = file.read_to_string();

                let dir = file.dir().to_path_buf();
                if let Err(e) = file.remove() {
                    warn!("failed to remove {}: {}", dir.display(), e);
                }
                text
            }
        }
    }
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateSource::Local(path) => write!(f, "{}", path.display()),
            TemplateSource::Remote(url) => f.write_str(url),
        }
    }
}

/// Render the template file at `path`.
pub fn render_template<D: Downloader + ?Sized>(
    downloader: &D,
    path: &Path,
    request: &ReleaseRequest,
) -> SourceResult<Vec<u8>> {
    let text = std::fs::read_to_string(path).map_err(|e| SourceError::io(path, e))?;
    render(downloader, &path.display().to_string(), &text, request)
}

/// Render template `text`; `name` identifies it in errors.
pub fn render<D: Downloader + ?Sized>(
    downloader: &D,
    name: &str,
    text: &str,
    request: &ReleaseRequest,
) -> SourceResult<Vec<u8>> {
    let rendered = render_text(downloader, name, text, request)?;
    info!(
        "rendered {} for {} {} ({} bytes)",
        name,
        request.plugin_name,
        request.tag_name,
        rendered.len()
    );
    Ok(rendered.into_bytes())
}

fn render_text<D: Downloader + ?Sized>(
    downloader: &D,
    name: &str,
    text: &str,
    request: &ReleaseRequest,
) -> SourceResult<String> {
    let fail = |offset: usize, reason: &str| template_error(name, text, offset, reason);

    let nodes = parse::parse(text).map_err(|e| fail(e.offset, &e.reason))?;
    let mut out = String::with_capacity(text.len());

    for node in nodes {
        let (offset, action) = match node {
            Node::Text(literal) => {
                out.push_str(literal);
                continue;
            }
            Node::Action { offset, action } => (offset, action),
        };

        match action {
            Action::Comment => {}
            Action::Value(operand) => {
                let value = resolve(&operand, request).map_err(|reason| fail(offset, &reason))?;
                out.push_str(value);
            }
            Action::Call { name: function, args } if function == ADD_URI_AND_SHA => {
                let [uri_template, tag] = args.as_slice() else {
                    return Err(fail(
                        offset,
                        &format!(
                            "wrong number of args for {}: want 2 got {}",
                            ADD_URI_AND_SHA,
                            args.len()
                        ),
                    ));
                };
                let uri_template =
                    resolve(uri_template, request).map_err(|reason| fail(offset, &reason))?;
                let tag = resolve(tag, request).map_err(|reason| fail(offset, &reason))?;

                let uri = render_text(downloader, name, uri_template, &request.with_tag(tag))?;
                let sha256 = hash_from_reference(downloader, &uri)?;

                let width = current_column(&out, name);
                let block = format!("uri: {}\nsha256: {}", uri, sha256);
                debug!("splicing checksum of {} at column {}", uri, width);
                out.push_str(&reindent(width, &block));
            }
            Action::Call { name: function, .. } => {
                return Err(fail(
                    offset,
                    &format!("function \"{}\" not defined", function),
                ));
            }
        }
    }

    Ok(out)
}

fn resolve<'a>(operand: &'a Operand, request: &'a ReleaseRequest) -> Result<&'a str, String> {
    match operand {
        Operand::Literal(value) => Ok(value),
        Operand::Field(field) => request
            .lookup(field)
            .ok_or_else(|| format!("can't evaluate field {}", field)),
    }
}

/// Column of the end of `out`, counted in characters from the last newline.
///
/// Warns when the line so far holds more than indentation and list dashes,
/// since the block's later lines cannot then line up with a YAML key.
fn current_column(out: &str, name: &str) -> usize {
    let line_start = out.rfind('\n').map_or(0, |i| i + 1);
    let prefix = &out[line_start..];

    if prefix.chars().any(|c| !matches!(c, ' ' | '\t' | '-')) {
        warn!(
            "{}: {} follows {:?} on its line, indentation may be wrong",
            name, ADD_URI_AND_SHA, prefix
        );
    }

    prefix.chars().count()
}

fn template_error(name: &str, text: &str, offset: usize, reason: &str) -> SourceError {
    let offset = offset.min(text.len());
    let line = text.as_bytes()[..offset].iter().filter(|b| **b == b'\n').count() + 1;
    SourceError::Template {
        template: name.to_string(),
        reason: format!("line {} (offset {}): {}", line, offset, reason),
    }
}
