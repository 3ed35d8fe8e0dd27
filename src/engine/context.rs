//! Layered render context
//!
//! A [`Context`] is a stack of mappings searched from the top down. Every context
//! derived from the same top-level render (clones and isolated scopes) shares one
//! [`RenderState`], which holds the media accumulator and the per-render template
//! cache.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::component::{ComponentId, Media};
use crate::value::{Map, Value};

use super::{Engine, Template};

/// Variable lookup used by expression evaluation
pub trait Lookup {
    /// Find the value bound to `name`, if any
    fn lookup(&self, name: &str) -> Option<Value>;
}

/// Cache key for templates resolved by a component during one render pass:
/// the component type plus the candidate template names
pub type TemplateCacheKey = (ComponentId, Vec<String>);

/// State shared by every context of one top-level render
#[derive(Default)]
pub struct RenderState {
    engine: Option<Arc<Engine>>,
    media: Media,
    templates: HashMap<TemplateCacheKey, Arc<Template>>,
    depth: usize,
}

/// A stack of variable layers
#[derive(Clone)]
pub struct Context {
    layers: Vec<Map>,
    state: Rc<RefCell<RenderState>>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.layers == other.layers
    }
}

impl Context {
    /// Create a context with a single empty layer
    pub fn new() -> Self {
        Self::from_map(Map::new())
    }

    /// Create a context whose only layer is `values`
    pub fn from_map(values: Map) -> Self {
        Self {
            layers: vec![values],
            state: Rc::new(RefCell::new(RenderState::default())),
        }
    }

    /// Return a new context holding only `seed`, sharing this context's render state
    ///
    /// No layer of `self` is visible from the returned context.
    pub fn isolated(&self, seed: Map) -> Self {
        Self {
            layers: vec![seed],
            state: Rc::clone(&self.state),
        }
    }

    /// Push an empty layer
    pub fn push(&mut self) {
        self.layers.push(Map::new());
    }

    /// Push a layer holding `values`
    pub fn push_layer(&mut self, values: Map) {
        self.layers.push(values);
    }

    /// Pop the top layer; the bottom layer is never removed
    pub fn pop(&mut self) -> Option<Map> {
        if self.layers.len() > 1 {
            self.layers.pop()
        } else {
            None
        }
    }

    /// Run `f` inside a temporary layer that is popped afterwards
    pub fn scoped<T>(&mut self, values: Map, f: impl FnOnce(&mut Self) -> T) -> T {
        self.push_layer(values);
        let result = f(self);
        self.layers.pop();
        result
    }

    /// Number of layers in the stack
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Get a value, starting at the top layer and going down
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.layers.iter().rev().find_map(|layer| layer.get(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.layers.iter().any(|layer| layer.contains_key(key))
    }

    /// Set a value in the top layer
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.top_mut().insert(key.into(), value.into());
    }

    /// Set a value in the nearest layer that already defines `key`, otherwise in
    /// the top layer
    pub fn set_upward(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        match self
            .layers
            .iter()
            .rposition(|layer| layer.contains_key(&key))
        {
            Some(index) => {
                self.layers[index].insert(key, value.into());
            }
            None => {
                self.top_mut().insert(key, value.into());
            }
        }
    }

    /// Remove a value from the top layer
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.top_mut().shift_remove(key)
    }

    /// Merge `values` into the top layer
    pub fn update(&mut self, values: Map) {
        self.top_mut().extend(values);
    }

    /// Merge every layer into one mapping; upper layers win
    pub fn flatten(&self) -> Map {
        let mut flat = Map::new();
        for layer in &self.layers {
            for (key, value) in layer {
                flat.insert(key.clone(), value.clone());
            }
        }
        flat
    }

    fn top_mut(&mut self) -> &mut Map {
        if self.layers.is_empty() {
            self.layers.push(Map::new());
        }
        let last = self.layers.len() - 1;
        &mut self.layers[last]
    }

    /// The engine rendering this context, if one is bound
    pub fn engine(&self) -> Option<Arc<Engine>> {
        self.state.borrow().engine.clone()
    }

    /// Start a top-level render with `engine`
    ///
    /// Media, cached templates and nesting depth from earlier renders of this
    /// context are dropped. Contexts cloned before the call keep the old state.
    pub fn begin_render(&mut self, engine: &Arc<Engine>) {
        self.state = Rc::new(RefCell::new(RenderState {
            engine: Some(Arc::clone(engine)),
            ..RenderState::default()
        }));
    }

    /// Bind an engine unless one is already bound
    pub fn bind_engine(&self, engine: &Arc<Engine>) {
        let mut state = self.state.borrow_mut();
        if state.engine.is_none() {
            state.engine = Some(Arc::clone(engine));
        }
    }

    /// Contribute component assets to this render's media accumulator
    pub fn add_media(&self, media: &Media) {
        self.state.borrow_mut().media.merge(media);
    }

    /// Assets accumulated so far in this render
    pub fn media(&self) -> Media {
        self.state.borrow().media.clone()
    }

    pub(crate) fn cached_template(&self, key: &TemplateCacheKey) -> Option<Arc<Template>> {
        self.state.borrow().templates.get(key).cloned()
    }

    pub(crate) fn cache_template(&self, key: TemplateCacheKey, template: Arc<Template>) {
        self.state.borrow_mut().templates.insert(key, template);
    }

    /// Record entry into a nested component render, returning the new nesting level
    pub(crate) fn enter_component(&self) -> usize {
        let mut state = self.state.borrow_mut();
        state.depth += 1;
        state.depth
    }

    pub(crate) fn leave_component(&self) {
        let mut state = self.state.borrow_mut();
        state.depth = state.depth.saturating_sub(1);
    }
}

impl Lookup for Context {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl From<Map> for Context {
    fn from(values: Map) -> Self {
        Self::from_map(values)
    }
}
