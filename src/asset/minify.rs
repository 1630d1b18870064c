//! Bundle minification for JS and CSS.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. Both sit behind the
//! [`Minifier`] trait so callers can swap in their own implementation per
//! asset type.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier as OxcMinifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use regex::{Captures, Regex};
use tempfile::NamedTempFile;

use crate::debug;
use crate::utils::path::{
    is_stylesheet_relative, normalize_path, relative_to, split_path_suffix, to_url_path,
};

use super::{AssetError, AssetType};

/// File extension → data URI prefix for `url()` targets inlined into css.
pub type ImportExtensions = BTreeMap<String, String>;

/// Files above this size stay external even if their extension is inlinable.
pub const MAX_IMPORT_SIZE: u64 = 5 * 1024;

/// `url(...)` with a double-quoted, single-quoted or bare target.
///
/// ASCII whitespace classes only: `regex` is built without `unicode-perl`.
static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\([ \t\r\n\f]*(?:"([^"]*)"|'([^']*)'|([^)"' \t\r\n\f]*))[ \t\r\n\f]*\)"#)
        .unwrap()
});

/// `@charset` and `@import` statements, only valid at the start of a sheet.
static CSS_PRELUDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(charset|import)[^;]*;").unwrap());

/// Default inlinable image types.
pub fn default_import_extensions() -> ImportExtensions {
    [
        ("gif", "data:image/gif"),
        ("png", "data:image/png"),
        ("svg", "data:image/svg+xml"),
    ]
    .into_iter()
    .map(|(ext, mime)| (ext.to_owned(), mime.to_owned()))
    .collect()
}

/// Concatenates source files into a single artifact.
pub trait Minifier {
    /// Bundle `sources` (in order) into `output`.
    fn minify(&self, sources: &[&Path], output: &Path) -> Result<(), AssetError>;

    /// Replace the data-URI import map. Minifiers without one ignore it.
    fn set_import_extensions(&mut self, _extensions: ImportExtensions) {}
}

/// Stylesheet bundler: rewrites `url()` targets, concatenates, minifies.
#[derive(Debug, Clone)]
pub struct CssMinifier {
    import_extensions: ImportExtensions,
    max_import_size: u64,
    minify: bool,
}

impl Default for CssMinifier {
    fn default() -> Self {
        Self::new(default_import_extensions())
    }
}

impl CssMinifier {
    pub fn new(import_extensions: ImportExtensions) -> Self {
        Self {
            import_extensions,
            max_import_size: MAX_IMPORT_SIZE,
            minify: true,
        }
    }

    pub fn with_max_import_size(mut self, bytes: u64) -> Self {
        self.max_import_size = bytes;
        self
    }

    /// Disable minification; sources are still rewritten and concatenated.
    pub fn with_minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    /// Rewrite relative `url()` targets of one stylesheet.
    ///
    /// Small files with an inlinable extension become data URIs; everything
    /// else is re-pointed from `source_dir` to `output_dir`.
    fn rewrite_urls(&self, css: &str, source_dir: &Path, output_dir: &Path) -> String {
        CSS_URL
            .replace_all(css, |caps: &Captures<'_>| {
                let target = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .or_else(|| caps.get(3))
                    .map_or("", |m| m.as_str());

                if !is_stylesheet_relative(target) {
                    return caps[0].to_owned();
                }

                let (path, suffix) = split_path_suffix(target);
                let Ok(file) = source_dir.join(path).canonicalize() else {
                    return caps[0].to_owned();
                };

                if let Some(data) = self.data_uri(&file) {
                    return format!("url({data})");
                }

                match relative_to(&file, output_dir) {
                    Some(rel) => format!("url(\"{}{suffix}\")", to_url_path(&rel)),
                    None => caps[0].to_owned(),
                }
            })
            .into_owned()
    }

    fn data_uri(&self, file: &Path) -> Option<String> {
        let ext = file.extension()?.to_str()?.to_ascii_lowercase();
        let prefix = self.import_extensions.get(&ext)?;
        let size = fs::metadata(file).ok()?.len();
        if size > self.max_import_size {
            return None;
        }
        let bytes = fs::read(file).ok()?;
        Some(format!("{prefix};base64,{}", STANDARD.encode(bytes)))
    }
}

/// Move `@import` rules of every sheet to the top of the bundle.
///
/// Only the first `@charset` survives; later ones are dropped. Anything
/// left behind a rule would make the parser discard the import.
fn hoist_prelude(sheets: &[String]) -> String {
    let mut charset = None;
    let mut imports = String::new();
    let mut body = String::new();

    for sheet in sheets {
        let mut last = 0;
        for caps in CSS_PRELUDE.captures_iter(sheet) {
            let (Some(rule), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            body.push_str(&sheet[last..rule.start()]);
            last = rule.end();
            if name.as_str() == "import" {
                imports.push_str(rule.as_str());
                imports.push('\n');
            } else if charset.is_none() {
                charset = Some(rule.as_str());
            }
        }
        body.push_str(&sheet[last..]);
        body.push('\n');
    }

    let mut bundle = String::with_capacity(imports.len() + body.len() + 32);
    if let Some(charset) = charset {
        bundle.push_str(charset);
        bundle.push('\n');
    }
    bundle.push_str(&imports);
    bundle.push_str(&body);
    bundle
}

impl Minifier for CssMinifier {
    fn minify(&self, sources: &[&Path], output: &Path) -> Result<(), AssetError> {
        let output_dir = normalize_path(output.parent().unwrap_or(Path::new(".")));

        let mut sheets = Vec::with_capacity(sources.len());
        for source in sources {
            let css = fs::read_to_string(source)
                .map_err(|e| AssetError::Read(source.to_path_buf(), e))?;
            let source_dir = source.parent().unwrap_or(Path::new("."));
            sheets.push(self.rewrite_urls(&css, source_dir, &output_dir));
        }
        let bundle = hoist_prelude(&sheets);

        let code = if self.minify {
            minify_css(&bundle).map_err(|reason| AssetError::Minify {
                ty: AssetType::Css,
                reason,
            })?
        } else {
            bundle
        };
        write_artifact(output, &code)
    }

    fn set_import_extensions(&mut self, extensions: ImportExtensions) {
        self.import_extensions = extensions;
    }
}

/// Script bundler: concatenates and minifies with oxc.
#[derive(Debug, Clone)]
pub struct JsMinifier {
    minify: bool,
}

impl Default for JsMinifier {
    fn default() -> Self {
        Self { minify: true }
    }
}

impl JsMinifier {
    /// Disable minification; sources are only concatenated.
    pub fn with_minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }
}

impl Minifier for JsMinifier {
    fn minify(&self, sources: &[&Path], output: &Path) -> Result<(), AssetError> {
        let mut bundle = String::new();
        for source in sources {
            let js = fs::read_to_string(source)
                .map_err(|e| AssetError::Read(source.to_path_buf(), e))?;
            bundle.push_str(&js);
            // guard against a missing trailing semicolon or a dangling line comment
            bundle.push_str("\n;\n");
        }

        let code = if self.minify {
            minify_js(&bundle).map_err(|reason| AssetError::Minify {
                ty: AssetType::Js,
                reason,
            })?
        } else {
            bundle
        };
        write_artifact(output, &code)
    }
}

/// Minifier per asset type.
pub struct Minifiers {
    css: Box<dyn Minifier>,
    js: Box<dyn Minifier>,
}

impl Default for Minifiers {
    fn default() -> Self {
        Self {
            css: Box::new(CssMinifier::default()),
            js: Box::new(JsMinifier::default()),
        }
    }
}

impl Minifiers {
    pub fn get(&self, ty: AssetType) -> &dyn Minifier {
        match ty {
            AssetType::Css => self.css.as_ref(),
            AssetType::Js => self.js.as_ref(),
        }
    }

    pub fn get_mut(&mut self, ty: AssetType) -> &mut dyn Minifier {
        match ty {
            AssetType::Css => self.css.as_mut(),
            AssetType::Js => self.js.as_mut(),
        }
    }

    pub fn set(&mut self, ty: AssetType, minifier: Box<dyn Minifier>) {
        match ty {
            AssetType::Css => self.css = minifier,
            AssetType::Js => self.js = minifier,
        }
    }
}

/// Minify JavaScript source code.
///
/// Parsed as a classic script so top-level declarations stay global: a
/// bundled library must keep the names later scripts call into.
pub fn minify_js(source: &str) -> Result<String, String> {
    let allocator = Allocator::default();
    let source_type = SourceType::default().with_script(true);
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        return Err(format!("{} syntax error(s)", ret.errors.len()));
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = OxcMinifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Minify CSS source code.
///
/// Error recovery is on so one malformed rule does not sink the bundle.
pub fn minify_css(source: &str) -> Result<String, String> {
    let options = ParserOptions {
        error_recovery: true,
        ..ParserOptions::default()
    };
    let stylesheet = StyleSheet::parse(source, options).map_err(|e| e.to_string())?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;
    Ok(result.code)
}

/// Write an artifact through a temp file in the same directory, then rename.
///
/// Readers never see a half-written bundle. Concurrent writers of one key
/// produce identical content; the last rename wins.
pub fn write_artifact(output: &Path, contents: &str) -> Result<(), AssetError> {
    let dir = output.parent().unwrap_or(Path::new("."));
    let write_err = |e| AssetError::Write(output.to_path_buf(), e);

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.persist(output).map_err(|e| write_err(e.error))?;

    debug!("minify"; "wrote {} ({} bytes)", output.display(), contents.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_minify_css() {
        assert_eq!(
            minify_css("a {\n  color: red;\n}\n").unwrap(),
            "a{color:red}"
        );
    }

    #[test]
    fn test_minify_js() {
        let code = minify_js(
            "function add(first, second) {\n  return first + second;\n}\nconsole.log(add(1, 2));\n",
        )
        .unwrap();
        assert!(code.contains("console.log"));
        assert!(!code.contains("\n  "));
        assert!(minify_js("function (").is_err());
    }

    #[test]
    fn test_minify_js_keeps_top_level_names() {
        let code = minify_js("function greet(name) { return 'hi ' + name; }\nvar counter = 1;\n")
            .unwrap();
        assert!(code.contains("greet"));
        assert!(code.contains("counter"));

        let code = minify_js("function init() { document.title = 'x'; }\n").unwrap();
        assert!(code.contains("function init("));
    }

    #[test]
    fn test_css_hoists_imports() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.css");
        let b = dir.path().join("b.css");
        fs::write(&a, "@charset \"utf-8\";\na { color: red; }\n").unwrap();
        fs::write(
            &b,
            concat!(
                "@charset \"utf-8\";\n",
                "@import url(\"https://cdn.example.com/x.css\");\n",
                "b { color: blue; }\n",
            ),
        )
        .unwrap();
        let out = dir.path().join("out.css");

        CssMinifier::default()
            .with_minify(false)
            .minify(&[a.as_path(), b.as_path()], &out)
            .unwrap();
        let code = fs::read_to_string(&out).unwrap();
        assert!(code.starts_with(
            "@charset \"utf-8\";\n@import url(\"https://cdn.example.com/x.css\");"
        ));
        assert_eq!(code.matches("@charset").count(), 1);
        assert!(code.find("a { color").unwrap() < code.find("b { color").unwrap());

        CssMinifier::default()
            .minify(&[a.as_path(), b.as_path()], &out)
            .unwrap();
        let code = fs::read_to_string(&out).unwrap();
        assert!(code.starts_with("@import"));
        assert!(code.contains("cdn.example.com/x.css"));
        assert!(code.contains("b{color:"));
    }

    #[test]
    fn test_css_set_import_extensions() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("dot.png"), "png").unwrap();
        let style = dir.path().join("a.css");
        fs::write(&style, ".a{background:url(dot.png)}").unwrap();
        let out = dir.path().join("out.css");

        let mut css = CssMinifier::new(ImportExtensions::new()).with_minify(false);
        css.set_import_extensions(default_import_extensions());
        css.minify(&[style.as_path()], &out).unwrap();
        let code = fs::read_to_string(&out).unwrap();
        assert!(code.contains("data:image/png;base64,"));
    }

    #[test]
    fn test_js_bundle_order() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.js");
        let b = dir.path().join("b.js");
        fs::write(&a, "window.first = 1 // no semicolon").unwrap();
        fs::write(&b, "window.second = 2").unwrap();
        let out = dir.path().join("out.js");

        JsMinifier::default()
            .with_minify(false)
            .minify(&[a.as_path(), b.as_path()], &out)
            .unwrap();
        let code = fs::read_to_string(&out).unwrap();
        assert!(code.find("first").unwrap() < code.find("second").unwrap());

        JsMinifier::default()
            .minify(&[a.as_path(), b.as_path()], &out)
            .unwrap();
        let code = fs::read_to_string(&out).unwrap();
        assert!(code.contains("window.first"));
        assert!(code.contains("window.second"));
    }

    #[test]
    fn test_js_syntax_error() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("broken.js");
        fs::write(&a, "function (").unwrap();
        let out = dir.path().join("out.js");

        let err = JsMinifier::default().minify(&[a.as_path()], &out).unwrap_err();
        assert!(matches!(err, AssetError::Minify { ty: AssetType::Js, .. }));
        assert!(!out.exists());
    }

    #[test]
    fn test_missing_source() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone.css");
        let out = dir.path().join("out.css");
        let err = CssMinifier::default()
            .minify(&[missing.as_path()], &out)
            .unwrap_err();
        assert!(matches!(err, AssetError::Read(..)));
    }

    #[test]
    fn test_css_inlines_small_images() {
        let dir = TempDir::new().unwrap();
        let css_dir = dir.path().join("css");
        let out_dir = dir.path().join("compressed");
        fs::create_dir_all(css_dir.join("img")).unwrap();
        fs::create_dir_all(&out_dir).unwrap();
        fs::write(css_dir.join("img/dot.png"), [0x89, b'P', b'N', b'G']).unwrap();
        fs::write(css_dir.join("img/big.png"), vec![0u8; 6 * 1024]).unwrap();
        let style = css_dir.join("style.css");
        fs::write(
            &style,
            ".a { background: url('img/dot.png'); }\n.b { background: url(img/big.png); }\n",
        )
        .unwrap();
        let out = out_dir.join("bundle.css");

        CssMinifier::default().minify(&[style.as_path()], &out).unwrap();
        let code = fs::read_to_string(&out).unwrap();
        assert!(code.contains("data:image/png;base64,iVBORw"));
        assert!(code.contains("../css/img/big.png"));
    }

    #[test]
    fn test_css_rewrites_relative_urls() {
        let dir = TempDir::new().unwrap();
        let css_dir = dir.path().join("css");
        let out_dir = dir.path().join("compressed");
        fs::create_dir_all(&css_dir).unwrap();
        fs::create_dir_all(dir.path().join("fonts")).unwrap();
        fs::create_dir_all(&out_dir).unwrap();
        fs::write(dir.path().join("fonts/a.woff2"), "font").unwrap();
        let style = css_dir.join("fonts.css");
        fs::write(
            &style,
            "@font-face { font-family: A; src: url(\"../fonts/a.woff2?v=1\"); }\n\
             .x { background: url(/img/root.png); }\n\
             .y { background: url(missing.png); }\n",
        )
        .unwrap();
        let out = out_dir.join("bundle.css");

        CssMinifier::default()
            .with_minify(false)
            .minify(&[style.as_path()], &out)
            .unwrap();
        let code = fs::read_to_string(&out).unwrap();
        assert!(code.contains("url(\"../fonts/a.woff2?v=1\")"));
        assert!(code.contains("url(/img/root.png)"));
        assert!(code.contains("url(missing.png)"));
    }

    #[test]
    fn test_import_extensions_are_configurable() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("dot.png"), "png").unwrap();
        let style = dir.path().join("a.css");
        fs::write(&style, ".a{background:url(dot.png)}").unwrap();
        let out = dir.path().join("out.css");

        CssMinifier::new(ImportExtensions::new())
            .with_minify(false)
            .minify(&[style.as_path()], &out)
            .unwrap();
        let code = fs::read_to_string(&out).unwrap();
        assert!(!code.contains("data:"));
        assert!(code.contains("url(\"dot.png\")"));
    }
}
