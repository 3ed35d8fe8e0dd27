//! Integration tests for component tags

use std::sync::Arc;

use component_tags::component::{AttributeSpec, Choices, ComponentType, Media, RenderMode};
use component_tags::engine::{Context, Engine, EngineConfig, MemoryLoader};
use component_tags::{Error, RenderError, Value};
use pretty_assertions::assert_eq;

fn button() -> ComponentType {
    ComponentType::builder("button")
        .template_name("components/button.html")
        .attribute(
            "color",
            AttributeSpec::new()
                .with_choices(
                    Choices::new()
                        .with("primary", "btn-primary")
                        .with("secondary", "btn-secondary"),
                )
                .with_default("primary")
                .render_as(RenderMode::Class),
        )
        .attribute(
            "size",
            AttributeSpec::new()
                .with_choices(Choices::new().with("sm", "small").with("lg", "large"))
                .render_as(RenderMode::Context),
        )
        .media(Media::new().with_css("components/button.css"))
        .build()
        .expect("valid component")
}

fn card() -> ComponentType {
    ComponentType::builder("card")
        .inline_template(concat!(
            "<div {{ attributes }}>",
            "<header>{{ slot_header }}</header>",
            "<main>{{ content }}</main>",
            "</div>"
        ))
        .attribute("title", AttributeSpec::new().required(true).render_as(RenderMode::Context))
        .media(
            Media::new()
                .with_css("components/card.css")
                .with_js("components/card.js"),
        )
        .build()
        .expect("valid component")
}

fn engine() -> Arc<Engine> {
    let loader = MemoryLoader::new().with_template(
        "components/button.html",
        "<button {{ attributes }}>{{ size }}{{ content }}</button>",
    );
    let engine = Engine::new()
        .with_config(EngineConfig::new().with_static_url("/static/"))
        .with_loader(loader)
        .with_component(button())
        .expect("registers button")
        .with_component(card())
        .expect("registers card");
    Arc::new(engine)
}

fn render(source: &str, ctx: &mut Context) -> Result<String, Error> {
    engine().render_str(source, ctx)
}

#[test]
fn test_button_default_color() {
    let mut ctx = Context::new();
    let html = render("{% button %}Save{% endbutton %}", &mut ctx).expect("renders");
    insta::assert_snapshot!(html, @r#"<button class="btn-primary">Save</button>"#);
}

#[test]
fn test_button_explicit_color() {
    let mut ctx = Context::new();
    let html = render(r#"{% button color="secondary" %}Save{% endbutton %}"#, &mut ctx)
        .expect("renders");
    assert_eq!(html, r#"<button class="btn-secondary">Save</button>"#);
}

#[test]
fn test_button_unknown_color() {
    let mut ctx = Context::new();
    let err = render(r#"{% button color="unknown" %}Save{% endbutton %}"#, &mut ctx)
        .unwrap_err();
    match err {
        Error::Render(RenderError::ChoiceNotFound {
            attribute,
            value,
            choices,
        }) => {
            assert_eq!(attribute, "color");
            assert_eq!(value, "unknown");
            assert_eq!(choices, vec!["primary", "secondary"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_context_mode_attribute_is_a_variable() {
    let mut ctx = Context::new();
    let html = render(r#"{% button size="lg" %}Go{% endbutton %}"#, &mut ctx).expect("renders");
    assert_eq!(html, r#"<button class="btn-primary">largeGo</button>"#);
}

#[test]
fn test_class_argument_joins_declared_class() {
    let mut ctx = Context::new();
    ctx.set("extra", Value::from(vec!["wide", "rounded"]));
    let html = render("{% button class=extra %}Go{% endbutton %}", &mut ctx).expect("renders");
    assert_eq!(html, r#"<button class="btn-primary wide rounded">Go</button>"#);
}

#[test]
fn test_free_form_attributes_are_escaped() {
    let mut ctx = Context::new();
    ctx.set("tip", "Say \"hi\" & <wave>");
    let html = render(
        r#"{% button data_tip=tip disabled=True %}Go{% endbutton %}"#,
        &mut ctx,
    )
    .expect("renders");
    assert_eq!(
        html,
        r#"<button class="btn-primary" data_tip="Say &quot;hi&quot; &amp; &lt;wave&gt;" disabled="true">Go</button>"#
    );
}

#[test]
fn test_slot_rendered_into_parent_template() {
    let mut ctx = Context::new();
    let html = render(
        r#"{% card title="Hi" id="c" %}{% slot "header" %}<b>{{ title }}</b>{% endslot %}Body{% endcard %}"#,
        &mut ctx,
    )
    .expect("renders");
    assert_eq!(
        html,
        r#"<div id="c"><header><b>Hi</b></header><main>Body</main></div>"#
    );
}

#[test]
fn test_required_attribute_missing() {
    let mut ctx = Context::new();
    let err = render("{% card %}Body{% endcard %}", &mut ctx).unwrap_err();
    assert!(matches!(
        err,
        Error::Render(RenderError::RequiredValueMissing { ref attribute }) if attribute == "title"
    ));
}

#[test]
fn test_isolated_body_still_sees_caller_variables() {
    let mut ctx = Context::new();
    ctx.set("user", "Ada");
    let html = render(
        r#"{% card title="T" %}Hello {{ user }}{% endcard %}"#,
        &mut ctx,
    )
    .expect("renders");
    assert_eq!(
        html,
        r#"<div ><header></header><main>Hello Ada</main></div>"#
    );
}

#[test]
fn test_nested_components() {
    let mut ctx = Context::new();
    let html = render(
        r#"{% card title="T" %}{% button color="secondary" %}Ok{% endbutton %}{% endcard %}"#,
        &mut ctx,
    )
    .expect("renders");
    assert_eq!(
        html,
        r#"<div ><header></header><main><button class="btn-secondary">Ok</button></main></div>"#
    );
}

#[test]
fn test_media_collected_once_in_order() {
    let mut ctx = Context::new();
    let html = render(
        concat!(
            "{% component_css %}",
            "{% button %}a{% endbutton %}",
            r#"{% card title="t" %}{% button %}b{% endbutton %}{% endcard %}"#,
        ),
        &mut ctx,
    )
    .expect("renders");
    let head = html.split("<button").next().unwrap_or_default();
    assert_eq!(
        head,
        concat!(
            r#"<link href="/static/components/button.css" media="all" rel="stylesheet">"#,
            r#"<link href="/static/components/card.css" media="all" rel="stylesheet">"#,
        )
    );
    assert_eq!(
        ctx.media().js().to_vec(),
        vec!["components/card.js".to_string()]
    );
}

#[test]
fn test_component_js_tag() {
    let mut ctx = Context::new();
    let html = render(
        r#"{% component_js %}{% card title="t" %}{% endcard %}"#,
        &mut ctx,
    )
    .expect("renders");
    assert!(html.starts_with(r#"<script src="/static/components/card.js"></script><div"#));
}

#[test]
fn test_failed_component_aborts_render() {
    let mut ctx = Context::new();
    let result = render(
        r#"before {% button color="nope" %}x{% endbutton %} after"#,
        &mut ctx,
    );
    assert!(result.is_err());
}

fn labelled(label: &str) -> ComponentType {
    ComponentType::builder("card")
        .inline_template(format!("{label}:{{{{ content }}}}"))
        .build()
        .expect("valid component")
}

#[test]
fn test_same_named_types_keep_their_own_templates() {
    let mut engine = Engine::new();
    engine
        .library_mut()
        .register("first", labelled("A"))
        .register("second", labelled("B"));
    let engine = Arc::new(engine);

    let mut ctx = Context::new();
    let html = engine
        .render_str("{% first %}x{% endfirst %}|{% second %}y{% endsecond %}", &mut ctx)
        .expect("renders");
    assert_eq!(html, "A:x|B:y");

    let mut other = Context::new();
    let html = engine
        .render_str("{% second %}z{% endsecond %}", &mut other)
        .expect("renders");
    assert_eq!(html, "B:z");
}

#[test]
fn test_reused_context_starts_with_empty_media() {
    let mut ctx = Context::new();
    render(r#"{% card title="t" %}{% endcard %}"#, &mut ctx).expect("renders");
    let html = render("{% component_css %}no components here", &mut ctx).expect("renders");
    assert_eq!(html, "no components here");
    assert!(ctx.media().is_empty());
}

#[test]
fn test_reused_context_follows_the_rendering_engine() {
    let first = Arc::new(
        Engine::new()
            .with_component(labelled("A"))
            .expect("registers"),
    );
    let second = Arc::new(
        Engine::new()
            .with_config(EngineConfig::new().with_string_if_invalid("MISSING"))
            .with_component(labelled("B"))
            .expect("registers"),
    );

    let mut ctx = Context::new();
    first
        .render_str("{% card %}{% endcard %}", &mut ctx)
        .expect("renders");
    let html = second
        .render_str("{% card %}{% endcard %}[{{ nope }}]", &mut ctx)
        .expect("renders");
    assert_eq!(html, "B:[MISSING]");
}
