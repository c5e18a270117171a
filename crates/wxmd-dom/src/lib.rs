//! # wxmd-dom
//!
//! Detached HTML fragments for the wxmd transformation pipelines.
//!
//! A [`Fragment`] is parsed from an HTML string, rewritten in place through
//! stable [`NodeId`] handles and serialized back to HTML. The [`query`] module
//! provides the two-phase "collect matches, then mutate" helper both pipelines
//! rely on.
//!
//! ## Example
//!
//! ```rust
//! use wxmd_dom::{query, Fragment, Selector};
//!
//! let mut fragment = Fragment::parse(r#"<p><a href="x">hi</a></p>"#);
//! let root = fragment.root();
//! query::for_each(&mut fragment, root, &Selector::tag("a"), |fragment, a| {
//!     let span = fragment.create_element_with_class("span", "link");
//!     fragment.move_children(a, span);
//!     fragment.replace(a, span);
//! });
//! assert_eq!(fragment.to_html(), r#"<p><span class="link">hi</span></p>"#);
//! ```

mod html;
pub mod node;
pub mod query;
mod selector;

pub use node::{escape_text, Element, Fragment, NodeData, NodeId, NodeRef, VOID_ELEMENTS};
pub use selector::Selector;
