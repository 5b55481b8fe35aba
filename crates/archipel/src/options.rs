//! Build options shared by every stage of one build cycle.

use path_clean::PathClean;
use std::ffi::OsString;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use crate::discovery::{COMPONENTS_DIR, ROUTES_DIR};
use crate::{Error, Result};

/// Options for one build cycle.
///
/// Immutable once the cycle starts. Paths are normalized with [`slashify`]
/// and `base` with [`slashify_base`], so every path-like value ends with a
/// separator.
///
/// # Example
///
/// ```
/// use archipel::BuildOptions;
/// use std::path::Path;
///
/// let options = BuildOptions::new("_site", "build").base("docs");
/// assert_eq!(options.base, "/docs/");
/// assert_eq!(options.islands_out_dir(), Path::new("build/components"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// URL path prefix the site is served under.
    pub base: String,
    /// Directory the built site is written to. Recreated on every build.
    pub out_dir: PathBuf,
    /// Directory holding `routes/`, `components/` and static assets.
    pub content_dir: PathBuf,
    /// Minify bundled JavaScript.
    pub minify: bool,
}

impl BuildOptions {
    /// Create options with `base = "/"` and minification off.
    pub fn new(content_dir: impl AsRef<Path>, out_dir: impl AsRef<Path>) -> Self {
        Self {
            base: "/".to_string(),
            out_dir: slashify(out_dir),
            content_dir: slashify(content_dir),
            minify: false,
        }
    }

    /// Set the URL path prefix.
    pub fn base(mut self, base: &str) -> Self {
        self.base = slashify_base(base);
        self
    }

    /// Enable or disable minification.
    pub fn minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    /// Root of the page sources.
    pub fn routes_dir(&self) -> PathBuf {
        self.content_dir.join(ROUTES_DIR)
    }

    /// Where island bundles are written.
    pub fn islands_out_dir(&self) -> PathBuf {
        self.out_dir.join(COMPONENTS_DIR)
    }

    /// Reject option sets that would make the clean step destroy sources.
    ///
    /// The output directory may live inside the content directory, but it
    /// must not be the content directory or one of its ancestors.
    pub fn validate(&self) -> Result<()> {
        let out_dir = absolute(&self.out_dir)?;
        let content_dir = absolute(&self.content_dir)?;

        if out_dir == content_dir {
            return Err(Error::InvalidOptions(format!(
                "output directory {} is the content directory",
                self.out_dir.display()
            )));
        }

        if content_dir.starts_with(&out_dir) {
            return Err(Error::InvalidOptions(format!(
                "output directory {} contains the content directory {}",
                self.out_dir.display(),
                self.content_dir.display()
            )));
        }

        if out_dir.parent().is_none() {
            return Err(Error::InvalidOptions(
                "refusing to use the filesystem root as output directory".to_string(),
            ));
        }

        Ok(())
    }
}

/// Normalize a path and make sure it ends with a separator.
///
/// `.` and `..` components are resolved lexically.
///
/// ```
/// use archipel::slashify;
/// use std::path::PathBuf;
///
/// assert_eq!(slashify("build"), PathBuf::from("build/"));
/// assert_eq!(slashify("./a/../_site//"), PathBuf::from("_site/"));
/// ```
pub fn slashify(path: impl AsRef<Path>) -> PathBuf {
    let cleaned = path.as_ref().to_path_buf().clean();
    let mut raw: OsString = cleaned.into_os_string();
    if !raw.to_string_lossy().ends_with(MAIN_SEPARATOR) {
        raw.push(MAIN_SEPARATOR.to_string());
    }
    PathBuf::from(raw)
}

/// Normalize a URL prefix to start and end with `/`.
///
/// ```
/// use archipel::slashify_base;
///
/// assert_eq!(slashify_base("/"), "/");
/// assert_eq!(slashify_base("docs"), "/docs/");
/// assert_eq!(slashify_base("//docs//v1/"), "/docs/v1/");
/// ```
pub fn slashify_base(base: &str) -> String {
    let segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", segments.join("/"))
    }
}

/// Absolute, lexically cleaned form of `path` (the path need not exist).
pub(crate) fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?.clean())
}
