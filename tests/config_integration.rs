//! Integration tests for engines built from TOML configuration

use std::fs;
use std::sync::Arc;

use component_tags::{Config, ConfigError, Context, Error, RenderError};
use pretty_assertions::assert_eq;

const CONFIG: &str = r#"
[engine]
static_url = "/assets/"
string_if_invalid = ""

[templates]
"alert.html" = "<div role=\"alert\" {{ attributes }}>{{ icon }}{{ content }}</div>"

[components.alert]
template = "alert.html"
media = { css = ["alert.css"] }

[[components.alert.attributes]]
field = "level"
choices = { info = "alert-info", danger = "alert-danger" }
default = "info"
mode = "class"

[[components.alert.attributes]]
field = "icon"
mode = "context"

[[components.alert.attributes]]
field = "dismiss_label"
name = "aria-label"

[components.badge]
inline = "<span {{ attributes }}>{{ content }}</span>"
isolated = false

[[components.badge.attributes]]
field = "count"
required = true
"#;

fn engine() -> Arc<component_tags::Engine> {
    Arc::new(
        Config::from_str(CONFIG)
            .expect("valid config")
            .into_engine()
            .expect("valid components"),
    )
}

#[test]
fn test_configured_component_renders() {
    let engine = engine();
    let mut ctx = Context::new();
    let html = engine
        .render_str(
            r#"{% alert level="danger" icon="!" dismiss_label="Close" %}Oops{% endalert %}"#,
            &mut ctx,
        )
        .expect("renders");
    insta::assert_snapshot!(html, @r#"<div role="alert" class="alert-danger" aria-label="Close">!Oops</div>"#);
}

#[test]
fn test_explicit_attribute_name_used() {
    let engine = engine();
    let alert = engine
        .library()
        .component_type("alert")
        .expect("alert registered");
    assert_eq!(
        alert.attribute("dismiss_label").map(|spec| spec.name()),
        Some("aria-label")
    );
}

#[test]
fn test_non_isolated_component_sees_caller() {
    let engine = engine();
    let mut ctx = Context::new();
    ctx.set("unread", 3i64);
    let html = engine
        .render_str("{% badge count=unread %}{{ unread }}{% endbadge %}", &mut ctx)
        .expect("renders");
    assert_eq!(html, r#"<span count="3">3</span>"#);
}

#[test]
fn test_required_attribute_from_config() {
    let engine = engine();
    let mut ctx = Context::new();
    let err = engine
        .render_str("{% badge %}x{% endbadge %}", &mut ctx)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Render(RenderError::RequiredValueMissing { ref attribute }) if attribute == "count"
    ));
}

#[test]
fn test_templates_from_configured_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::create_dir_all(dir.path().join("components")).expect("create dir");
    fs::write(
        dir.path().join("components/chip.html"),
        "<em {{ attributes }}>{{ content }}</em>",
    )
    .expect("write template");

    let config = format!(
        r#"
[engine]
dirs = [{:?}]

[components.chip]
templates = ["components/missing.html", "components/chip.html"]
"#,
        dir.path().display().to_string()
    );
    let engine = Arc::new(
        Config::from_str(&config)
            .expect("valid config")
            .into_engine()
            .expect("valid components"),
    );
    let mut ctx = Context::new();
    let html = engine
        .render_str(r#"{% chip id="x" %}hi{% endchip %}"#, &mut ctx)
        .expect("renders");
    assert_eq!(html, r#"<em id="x">hi</em>"#);
}

#[test]
fn test_missing_named_template() {
    let engine = Arc::new(
        Config::from_str(
            r#"
[components.ghost]
template = "ghost.html"
"#,
        )
        .expect("valid config")
        .into_engine()
        .expect("valid components"),
    );
    let mut ctx = Context::new();
    let err = engine
        .render_str("{% ghost %}{% endghost %}", &mut ctx)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Render(RenderError::TemplateNotFound { ref names }) if names == &vec!["ghost.html".to_string()]
    ));
}

#[test]
fn test_empty_choice_set_rejected() {
    let config = Config::from_str(
        r#"
[components.bad]
inline = ""

[[components.bad.attributes]]
field = "x"
required = true
choices = {}
"#,
    )
    .expect("valid toml");
    assert!(matches!(
        config.into_engine(),
        Err(ConfigError::InvalidConfiguration { .. })
    ));
}
