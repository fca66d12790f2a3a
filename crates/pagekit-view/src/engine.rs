//! Template engine contract and the minijinja-backed implementation.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use minijinja::{AutoEscape, Environment, ErrorKind};
use pagekit_page::{PageVars, Topology};

use crate::error::ViewError;

/// Renders a named layout with a variable map into HTML.
pub trait TemplateEngine: Send + Sync {
    /// Render `layout` with `vars`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Template`] if the layout cannot be loaded or
    /// rendered.
    fn fetch(&self, layout: &str, vars: &PageVars) -> Result<String, ViewError>;
}

/// [`TemplateEngine`] backed by a minijinja [`Environment`].
///
/// Layouts are looked up in each search path in order; the first file found
/// wins. Names that are absolute or contain `..` are rejected. Output is not
/// auto-escaped, since page variables carry pre-built markup.
#[derive(Debug)]
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    /// Engine loading layouts from the topology's template paths.
    #[must_use]
    pub fn from_topology(topology: &Topology) -> Self {
        Self::with_paths(topology.template_paths().iter().map(PathBuf::from).collect())
    }

    /// Engine loading layouts from `paths`, searched in order.
    #[must_use]
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        let mut env = base_environment();
        env.set_loader(move |name| load_from_paths(&paths, name));
        Self { env }
    }

    /// Engine serving layouts from memory.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Template`] if a template fails to parse.
    pub fn from_templates<I, N, S>(templates: I) -> Result<Self, ViewError>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let mut env = base_environment();
        for (name, source) in templates {
            let name = name.into();
            env.add_template_owned(name.clone(), source.into())
                .map_err(|e| ViewError::template(&name, e))?;
        }
        Ok(Self { env })
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn fetch(&self, layout: &str, vars: &PageVars) -> Result<String, ViewError> {
        let template = self
            .env
            .get_template(layout)
            .map_err(|e| ViewError::template(layout, e))?;
        template
            .render(vars)
            .map_err(|e| ViewError::template(layout, e))
    }
}

fn base_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env
}

fn load_from_paths(paths: &[PathBuf], name: &str) -> Result<Option<String>, minijinja::Error> {
    if !is_relative_inside(name) {
        return Err(minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("template name {name} must be a relative path without .."),
        ));
    }

    for dir in paths {
        let path = dir.join(name);
        match fs::read_to_string(&path) {
            Ok(source) => {
                tracing::debug!(template = name, path = %path.display(), "Loaded template");
                return Ok(Some(source));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(minijinja::Error::new(
                    ErrorKind::InvalidOperation,
                    format!("could not read template {}", path.display()),
                )
                .with_source(e));
            }
        }
    }
    Ok(None)
}

fn is_relative_inside(name: &str) -> bool {
    Path::new(name)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn vars(value: serde_json::Value) -> PageVars {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_in_memory_templates() {
        let engine = MiniJinjaEngine::from_templates([(
            "page.html",
            "<title>{{ title }}</title>{{ scripts_header }}",
        )])
        .unwrap();

        let html = engine
            .fetch(
                "page.html",
                &vars(json!({"title": "Home", "scripts_header": "<script src=\"a.js\"></script>"})),
            )
            .unwrap();

        assert_eq!(html, "<title>Home</title><script src=\"a.js\"></script>");
    }

    #[test]
    fn test_first_search_path_wins() {
        let tmp = TempDir::new().unwrap();
        let theme = tmp.path().join("theme");
        let system = tmp.path().join("system");
        fs::create_dir_all(theme.join("layouts")).unwrap();
        fs::create_dir_all(system.join("layouts")).unwrap();
        fs::write(theme.join("layouts/main.html"), "theme {{ title }}").unwrap();
        fs::write(system.join("layouts/main.html"), "system {{ title }}").unwrap();
        fs::write(system.join("layouts/error.html"), "error {{ title }}").unwrap();

        let mut topology = Topology::new();
        topology
            .set_template_path(theme.to_string_lossy())
            .set_template_path(system.to_string_lossy());
        let engine = MiniJinjaEngine::from_topology(&topology);
        let vars = vars(json!({"title": "x"}));

        assert_eq!(engine.fetch("layouts/main.html", &vars).unwrap(), "theme x");
        assert_eq!(engine.fetch("layouts/error.html", &vars).unwrap(), "error x");
    }

    #[test]
    fn test_missing_layout_is_template_error() {
        let tmp = TempDir::new().unwrap();
        let engine = MiniJinjaEngine::with_paths(vec![tmp.path().to_path_buf()]);

        let err = engine.fetch("nope.html", &PageVars::new()).unwrap_err();

        assert!(matches!(err, ViewError::Template { ref layout, .. } if layout == "nope.html"));
    }

    #[test]
    fn test_escaping_names_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("templates");
        fs::create_dir_all(&root).unwrap();
        fs::write(tmp.path().join("secret.html"), "secret").unwrap();
        let engine = MiniJinjaEngine::with_paths(vec![root]);

        assert!(engine.fetch("../secret.html", &PageVars::new()).is_err());
        let absolute = tmp.path().join("secret.html");
        assert!(
            engine
                .fetch(&absolute.to_string_lossy(), &PageVars::new())
                .is_err()
        );
    }

    #[test]
    fn test_safe_name_check() {
        assert!(is_relative_inside("page.html"));
        assert!(is_relative_inside("./layouts/page.html"));
        assert!(!is_relative_inside("../page.html"));
        assert!(!is_relative_inside("layouts/../../page.html"));
        assert!(!is_relative_inside("/etc/passwd"));
    }

    #[test]
    fn test_syntax_error_in_memory_template() {
        let result = MiniJinjaEngine::from_templates([("bad.html", "{% if %}")]);
        assert!(matches!(result, Err(ViewError::Template { .. })));
    }
}
