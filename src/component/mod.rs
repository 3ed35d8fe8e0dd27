//! Component tags
//!
//! A [`ComponentType`] declares typed attributes, a template and media. Once
//! registered in a [`Library`](crate::engine::Library) it becomes a block tag:
//!
//! ```text
//! {% button color="secondary" data_id=item.id with label="Save" %}
//!   {% slot "icon" %}<i class="save"></i>{% endslot %}
//!   Save changes
//! {% endbutton %}
//! ```
//!
//! Rendering an invocation resolves declared attributes against the caller's
//! context, turns undeclared keyword arguments into HTML attributes, sets the
//! `with` options as plain variables, renders the body into `content` and each
//! slot into `slot_<name>`, then renders the component's template.

mod attribute;
mod context;
mod media;
mod node;
mod parser;
mod slot;

pub use attribute::{AttributeSpec, Choices, RenderMode};
pub use context::{format_attributes, ComponentContext, ATTRIBUTES_KEY, CLASS_KEY, CONTENT_KEY};
pub use media::{Media, MediaKind, MediaNode};
pub use node::{ComponentId, ComponentNode, ComponentType, ComponentTypeBuilder, TemplateSource};
pub use parser::{extract_slots, parse_component, split_bits, ComponentArgs};
pub use slot::{SlotKey, SlotNode};
