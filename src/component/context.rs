//! Component render scope
//!
//! [`ComponentContext`] wraps a [`Context`] with attribute accumulation. Values
//! are collected under the reserved `attributes` key until [`make`] turns them
//! into a single `key="value"` string and renders the component body into
//! `content`.
//!
//! [`make`]: ComponentContext::make

use crate::engine::escape::escape_html;
use crate::engine::{Context, Lookup, NodeList};
use crate::error::RenderError;
use crate::parser::ast::Expr;
use crate::value::{Map, Value};

/// Context key holding the attribute mapping, then the finalized string
pub const ATTRIBUTES_KEY: &str = "attributes";
/// Context key holding the rendered body
pub const CONTENT_KEY: &str = "content";
/// Attribute accumulated as a list and joined with spaces
pub const CLASS_KEY: &str = "class";

pub struct ComponentContext<'a> {
    scope: Context,
    parent: Option<&'a Context>,
    body: Option<&'a NodeList>,
}

impl<'a> ComponentContext<'a> {
    pub fn new(initial: &'a Context, isolated: bool) -> Self {
        Self::with_values(initial, Map::new(), isolated)
    }

    /// Build the scope for one component render
    ///
    /// Isolated scopes start from `values` plus the configured inherited keys
    /// and reach the caller only through an explicit parent. Non-isolated scopes
    /// merge `values` into a copy of the caller's top layer.
    pub fn with_values(initial: &'a Context, values: Map, isolated: bool) -> Self {
        if isolated {
            let mut seed = Map::new();
            for key in inherited_keys(initial) {
                if let Some(value) = initial.get(&key) {
                    seed.insert(key, value.clone());
                }
            }
            seed.extend(values);
            seed.insert(ATTRIBUTES_KEY.to_string(), Value::Map(Map::new()));
            Self {
                scope: initial.isolated(seed),
                parent: Some(initial),
                body: None,
            }
        } else {
            let mut scope = initial.clone();
            scope.update(values);
            scope.set(ATTRIBUTES_KEY, Value::Map(Map::new()));
            Self {
                scope,
                parent: None,
                body: None,
            }
        }
    }

    /// Body rendered into `content` by [`make`](Self::make)
    pub fn with_body(mut self, body: &'a NodeList) -> Self {
        self.body = Some(body);
        self
    }

    pub fn is_isolated(&self) -> bool {
        self.parent.is_some()
    }

    /// Get a value from this scope's own stack
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.scope.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.scope.contains(key)
    }

    pub fn push(&mut self) {
        self.scope.push();
    }

    pub fn pop(&mut self) -> Option<Map> {
        self.scope.pop()
    }

    pub fn resolve(&self, value: impl Into<Expr>) -> Result<Value, RenderError> {
        value.into().resolve(self)
    }

    /// Resolve `value` and store it in the top layer
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Expr>,
    ) -> Result<(), RenderError> {
        let value = self.resolve(value)?;
        self.scope.set(key, value);
        Ok(())
    }

    /// Resolve `value` and store it in the nearest layer defining `key`
    pub fn set_upward(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Expr>,
    ) -> Result<(), RenderError> {
        let value = self.resolve(value)?;
        self.scope.set_upward(key, value);
        Ok(())
    }

    /// Resolve `value` and store it as an HTML attribute; `class` is appended
    /// to the class list instead, and a later write to any other name replaces
    /// the earlier one
    ///
    /// After [`make`](Self::make) the finalized string is discarded and
    /// accumulation starts over from an empty mapping.
    pub fn add_attribute(
        &mut self,
        name: &str,
        value: impl Into<Expr>,
    ) -> Result<(), RenderError> {
        if name == CLASS_KEY {
            return self.add_class([value]);
        }
        let value = self.resolve(value)?;
        let mut attributes = self.take_attributes();
        attributes.insert(name.to_string(), value);
        self.scope.set(ATTRIBUTES_KEY, Value::Map(attributes));
        Ok(())
    }

    /// Resolve each value and append it to the class list
    ///
    /// A list value contributes each of its items. Like
    /// [`add_attribute`](Self::add_attribute), it starts a fresh mapping once
    /// the attributes have been finalized.
    pub fn add_class<I, E>(&mut self, values: I) -> Result<(), RenderError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        let mut resolved = Vec::new();
        for value in values {
            match self.resolve(value)? {
                Value::List(items) => resolved.extend(items),
                other => resolved.push(other),
            }
        }
        let mut attributes = self.take_attributes();
        let classes = attributes.entry(CLASS_KEY.to_string()).or_insert(Value::Null);
        match classes {
            Value::List(items) => items.extend(resolved),
            Value::Null => *classes = Value::List(resolved),
            _ => {
                let mut items = vec![std::mem::take(classes)];
                items.extend(resolved);
                *classes = Value::List(items);
            }
        }
        self.scope.set(ATTRIBUTES_KEY, Value::Map(attributes));
        Ok(())
    }

    /// The accumulated attributes, or an empty map once finalized
    pub fn attributes(&self) -> Map {
        self.scope
            .get(ATTRIBUTES_KEY)
            .and_then(Value::as_map)
            .cloned()
            .unwrap_or_default()
    }

    /// Finalize the attributes into a string and render the body into `content`
    ///
    /// Calling it again leaves the attribute string unchanged.
    pub fn make(&mut self) -> Result<&mut Context, RenderError> {
        let current = self
            .scope
            .get(ATTRIBUTES_KEY)
            .cloned()
            .unwrap_or(Value::Map(Map::new()));
        self.scope.set(ATTRIBUTES_KEY, format_attributes(&current));
        if let Some(body) = self.body {
            let mut view = self.render_view();
            let content = body.render(&mut view)?;
            self.scope.set(CONTENT_KEY, Value::Safe(content));
        }
        Ok(&mut self.scope)
    }

    /// Context for rendering nested content
    ///
    /// For an isolated scope this is the caller's stack with this scope's
    /// variables pushed on top, mirroring the lookup fallback to the parent.
    pub fn render_view(&self) -> Context {
        match self.parent {
            Some(parent) => {
                let mut view = parent.clone();
                view.push_layer(self.scope.flatten());
                view
            }
            None => self.scope.clone(),
        }
    }

    /// Finalize and merge the whole stack into one mapping
    pub fn flatten(&mut self) -> Result<Map, RenderError> {
        Ok(self.make()?.flatten())
    }

    pub fn into_context(self) -> Context {
        self.scope
    }

    /// Remove the attribute mapping for modification; a finalized string is dropped
    fn take_attributes(&mut self) -> Map {
        match self.scope.remove(ATTRIBUTES_KEY) {
            Some(Value::Map(map)) => map,
            _ => match self.scope.get(ATTRIBUTES_KEY) {
                Some(Value::Map(map)) => map.clone(),
                _ => Map::new(),
            },
        }
    }
}

impl Lookup for ComponentContext<'_> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.scope
            .get(name)
            .cloned()
            .or_else(|| self.parent.and_then(|parent| parent.lookup(name)))
    }
}

fn inherited_keys(ctx: &Context) -> Vec<String> {
    match ctx.engine() {
        Some(engine) => engine.config().inherited_keys.clone(),
        None => vec!["request".to_string()],
    }
}

/// Serialize an attribute mapping into `key="value"` pairs
///
/// Keys keep first-insertion order, null values are omitted and the class list
/// is joined on single spaces. Already finalized (safe) input is returned as is.
pub fn format_attributes(attributes: &Value) -> Value {
    let map = match attributes {
        Value::Map(map) => map,
        Value::Safe(_) => return attributes.clone(),
        Value::Null => return Value::safe(""),
        other => return Value::Safe(escape_html(&other.to_string())),
    };
    let pairs: Vec<String> = map
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::List(items) if key == CLASS_KEY => {
                    let classes: Vec<String> = items
                        .iter()
                        .filter(|item| !item.is_null())
                        .map(attribute_text)
                        .collect();
                    if classes.is_empty() {
                        return None;
                    }
                    classes.join(" ")
                }
                other => attribute_text(other),
            };
            Some(format!(r#"{}="{}""#, key, text))
        })
        .collect();
    Value::Safe(pairs.join(" "))
}

fn attribute_text(value: &Value) -> String {
    match value {
        Value::Safe(s) => s.clone(),
        other => escape_html(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Engine, EngineConfig, Node};
    use crate::parser::ast::Spanned;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn finalized(ctx: &mut ComponentContext<'_>) -> String {
        let scope = ctx.make().expect("make succeeds");
        scope.get(ATTRIBUTES_KEY).map(|v| v.to_string()).unwrap_or_default()
    }

    #[test]
    fn test_add_attribute_last_write_wins() {
        let parent = Context::new();
        let mut ctx = ComponentContext::new(&parent, true);
        ctx.add_attribute("data-x", "1").expect("literal");
        ctx.add_attribute("data-x", "2").expect("literal");
        assert_eq!(finalized(&mut ctx), r#"data-x="2""#);
    }

    #[test]
    fn test_add_class_single_calls_equal_one_call() {
        let parent = Context::new();

        let mut one_by_one = ComponentContext::new(&parent, true);
        one_by_one.add_class(["a"]).expect("literal");
        one_by_one.add_class(["b"]).expect("literal");
        one_by_one.add_class(["c"]).expect("literal");

        let mut at_once = ComponentContext::new(&parent, true);
        at_once.add_class(["a", "b", "c"]).expect("literal");

        assert_eq!(one_by_one.attributes(), at_once.attributes());
        assert_eq!(finalized(&mut at_once), r#"class="a b c""#);
    }

    #[test]
    fn test_class_attribute_delegates_to_class_list() {
        let parent = Context::new();
        let mut ctx = ComponentContext::new(&parent, true);
        ctx.add_class(["btn"]).expect("literal");
        ctx.add_attribute("class", "wide").expect("literal");
        assert_eq!(finalized(&mut ctx), r#"class="btn wide""#);
    }

    #[test]
    fn test_scalar_class_becomes_list() {
        let parent = Context::new();
        let mut ctx = ComponentContext::new(&parent, true);
        let mut attrs = Map::new();
        attrs.insert("class".to_string(), Value::from("first"));
        ctx.set(ATTRIBUTES_KEY, Value::Map(attrs)).expect("literal");
        ctx.add_class(["second"]).expect("literal");
        assert_eq!(finalized(&mut ctx), r#"class="first second""#);
    }

    #[test]
    fn test_make_is_idempotent() {
        let parent = Context::new();
        let mut ctx = ComponentContext::new(&parent, true);
        ctx.add_attribute("title", "a \"quoted\" <b>").expect("literal");
        ctx.add_attribute("hidden", Value::Null).expect("literal");
        let once = format_attributes(&Value::Map(ctx.attributes()));
        assert_eq!(format_attributes(&once), once);

        let first = finalized(&mut ctx);
        let second = finalized(&mut ctx);
        assert_eq!(first, r#"title="a &quot;quoted&quot; &lt;b&gt;""#);
        assert_eq!(first, second);
    }

    #[test]
    fn test_insertion_order_kept() {
        let parent = Context::new();
        let mut ctx = ComponentContext::new(&parent, true);
        ctx.add_attribute("id", "x").expect("literal");
        ctx.add_class(["c"]).expect("literal");
        ctx.add_attribute("role", "button").expect("literal");
        assert_eq!(finalized(&mut ctx), r#"id="x" class="c" role="button""#);
    }

    #[test]
    fn test_isolated_hides_unseeded_parent_keys() {
        let mut parent = Context::new();
        parent.set("secret", "s");
        parent.set("request", "req");
        let mut seed = Map::new();
        seed.insert("given".to_string(), Value::from("g"));

        let ctx = ComponentContext::with_values(&parent, seed, true);
        assert!(ctx.is_isolated());
        assert!(!ctx.contains("secret"));
        assert!(ctx.contains("given"));
        assert!(ctx.contains("request"));
    }

    #[test]
    fn test_isolated_resolves_through_parent() {
        let mut parent = Context::new();
        parent.set("label", "from parent");
        let mut ctx = ComponentContext::new(&parent, true);
        ctx.add_attribute("title", Expr::var("label")).expect("parent lookup");
        assert_eq!(finalized(&mut ctx), r#"title="from parent""#);
    }

    #[test]
    fn test_non_isolated_sees_everything() {
        let mut parent = Context::new();
        parent.set("a", "1");
        parent.push();
        parent.set("b", "2");
        let ctx = ComponentContext::new(&parent, false);
        assert!(!ctx.is_isolated());
        assert!(ctx.contains("a"));
        assert!(ctx.contains("b"));
    }

    #[test]
    fn test_set_resolves_lazily() {
        let mut parent = Context::new();
        parent.set("name", "Ada");
        let mut ctx = ComponentContext::new(&parent, false);
        ctx.set("who", Expr::var("name")).expect("resolves");
        assert_eq!(ctx.get("who"), Some(&Value::from("Ada")));
        assert!(ctx.set("bad", Expr::var("nope")).is_err());
    }

    #[test]
    fn test_body_sees_component_and_caller_variables() {
        let mut parent = Context::new();
        parent.set("user", "Ada");
        let body = NodeList::from(vec![
            Node::Variable(Spanned::new(Expr::var("user"), 0..0)),
            Node::Text(":".to_string()),
            Node::Variable(Spanned::new(Expr::var("label"), 0..0)),
        ]);
        let mut ctx = ComponentContext::new(&parent, true).with_body(&body);
        ctx.set("label", "Save").expect("literal");
        let scope = ctx.make().expect("make succeeds");
        assert_eq!(scope.get(CONTENT_KEY), Some(&Value::safe("Ada:Save")));
        assert!(!scope.contains("user"));
    }

    #[test]
    fn test_flatten_includes_attributes() {
        let parent = Context::new();
        let mut ctx = ComponentContext::new(&parent, true);
        ctx.add_attribute("id", "x").expect("literal");
        let flat = ctx.flatten().expect("make succeeds");
        assert_eq!(flat.get(ATTRIBUTES_KEY), Some(&Value::safe(r#"id="x""#)));
    }

    #[test]
    fn test_set_upward_writes_defining_layer() {
        let parent = Context::new();
        let mut ctx = ComponentContext::new(&parent, true);
        ctx.set("count", "1").expect("literal");
        ctx.push();
        ctx.set_upward("count", "2").expect("literal");
        ctx.set_upward("fresh", Expr::var("count")).expect("resolves");

        let top = ctx.pop().expect("pushed layer");
        assert!(!top.contains_key("count"));
        assert_eq!(top.get("fresh"), Some(&Value::from("2")));
        assert_eq!(ctx.get("count"), Some(&Value::from("2")));
    }

    #[test]
    fn test_configured_inherited_keys_seed_isolated_scope() {
        let engine = Arc::new(
            Engine::new().with_config(EngineConfig::new().with_inherited_keys(["user", "locale"])),
        );
        let mut parent = Context::new();
        parent.begin_render(&engine);
        parent.set("user", "Ada");
        parent.set("locale", "en");
        parent.set("request", "req");

        let ctx = ComponentContext::new(&parent, true);
        assert_eq!(ctx.get("user"), Some(&Value::from("Ada")));
        assert_eq!(ctx.get("locale"), Some(&Value::from("en")));
        assert!(!ctx.contains("request"));
    }

    #[test]
    fn test_accumulation_after_make_starts_over() {
        let parent = Context::new();
        let mut ctx = ComponentContext::new(&parent, true);
        ctx.add_attribute("id", "x").expect("literal");
        assert_eq!(finalized(&mut ctx), r#"id="x""#);

        ctx.add_class(["late"]).expect("literal");
        assert_eq!(finalized(&mut ctx), r#"class="late""#);
    }
}
