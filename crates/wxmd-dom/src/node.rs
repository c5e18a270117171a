//! Arena-backed detached document fragment.
//!
//! A [`Fragment`] owns every node it contains. Nodes are addressed by
//! [`NodeId`], which stays valid while the tree is rearranged: detaching a node
//! only unlinks it, so handles collected before a mutation can still be used
//! after it.

/// Handle of a node inside a [`Fragment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Void (self-closing) HTML elements
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

/// Elements whose text children are serialized without escaping
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// Payload of a node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// The fragment root
    Fragment,
    /// An element with its tag name and attributes
    Element(Element),
    /// A text node (unescaped)
    Text(String),
    /// A comment
    Comment(String),
}

/// An HTML element: lowercase tag name plus ordered attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
}

impl Element {
    /// Create an element without attributes
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            attrs: Vec::new(),
        }
    }

    /// Create an element with attributes
    pub fn with_attrs(name: &str, attrs: Vec<(&str, &str)>) -> Self {
        let mut element = Self::new(name);
        for (key, value) in attrs {
            element.set_attr(key, value);
        }
        element
    }

    /// Lowercase tag name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Check if an attribute exists
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(slot) = self
            .attrs
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            slot.1 = value.to_string();
            return;
        }
        self.attrs.push((name.to_lowercase(), value.to_string()));
    }

    /// Remove an attribute, returning its previous value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self
            .attrs
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))?;
        Some(self.attrs.remove(index).1)
    }

    /// Iterate over attributes in source order
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over the whitespace-separated class tokens
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Add a class token unless it is already present
    pub fn add_class(&mut self, class: &str) {
        if class.is_empty() || self.has_class(class) {
            return;
        }
        let value = match self.attr("class").map(str::trim) {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, class),
            _ => class.to_string(),
        };
        self.set_attr("class", &value);
    }

    /// Check if this is a void element
    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }

    /// Serialized start tag, e.g. `<span class="x">`
    pub fn start_tag(&self) -> String {
        let mut out = String::new();
        self.write_start_tag(&mut out);
        out
    }

    fn write_start_tag(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in self.attrs() {
            out.push(' ');
            out.push_str(name);
            if !value.is_empty() {
                out.push_str("=\"");
                escape_attr(value, out);
                out.push('"');
            }
        }
        out.push('>');
    }
}

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A detached, in-memory tree of HTML nodes.
#[derive(Debug, Clone)]
pub struct Fragment {
    slots: Vec<Slot>,
}

impl Fragment {
    /// Create an empty fragment
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                data: NodeData::Fragment,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The fragment root
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Payload of a node
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.slots[id.0].data
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.slots[id.0].data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.slots[id.0].data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Lowercase tag name, `None` for non-elements
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::name)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.slots[id.0].children
    }

    /// Element children only
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.element(child).is_some())
    }

    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.element_children(id).next()
    }

    /// Read-only view of a node with navigation helpers
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { fragment: self, id }
    }

    /// Whether `id` is `ancestor` or lies somewhere below it
    pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Whether the node is reachable from the fragment root
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.is_within(id, self.root())
    }

    /// All nodes below `id` in document order (pre-order, `id` excluded)
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            result.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        result
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.slots.push(Slot {
            data,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.slots.len() - 1)
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.create(Element::new(name))
    }

    /// Create a detached node from an element value
    pub fn create(&mut self, element: Element) -> NodeId {
        self.push(NodeData::Element(element))
    }

    /// Create a detached element with a class attribute
    pub fn create_element_with_class(&mut self, name: &str, class: &str) -> NodeId {
        let id = self.create_element(name);
        if let Some(element) = self.element_mut(id) {
            element.add_class(class);
        }
        id
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    pub(crate) fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Comment(text.to_string()))
    }

    /// Unlink a node from its parent. The node and its subtree stay usable.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.slots[id.0].parent.take() {
            self.slots[parent.0].children.retain(|&child| child != id);
        }
    }

    /// Append `child` as the last child of `parent`, moving it if attached.
    ///
    /// Appending a node into its own subtree is ignored.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        if child == self.root() || self.is_within(parent, child) {
            return;
        }
        self.detach(child);
        self.slots[child.0].parent = Some(parent);
        self.slots[parent.0].children.push(child);
    }

    /// Insert `child` right before `reference` under the same parent.
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        if child == reference || child == self.root() || self.is_within(parent, child) {
            return;
        }
        self.detach(child);
        let index = self.slots[parent.0]
            .children
            .iter()
            .position(|&c| c == reference)
            .unwrap_or(self.slots[parent.0].children.len());
        self.slots[child.0].parent = Some(parent);
        self.slots[parent.0].children.insert(index, child);
    }

    /// Put `new` where `old` is and detach `old`. No-op if `old` has no parent.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        if old == new || self.parent(old).is_none() {
            return;
        }
        self.insert_before(old, new);
        if self.parent(new).is_some() {
            self.detach(old);
        }
    }

    /// Detach every child of `id`
    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.slots[id.0].children);
        for child in children {
            self.slots[child.0].parent = None;
        }
    }

    /// Move every child of `from` to the end of `to`
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let children = self.children(from).to_vec();
        for child in children {
            self.append(to, child);
        }
    }

    /// Copy the subtree rooted at `id` into a new detached subtree
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let copy = self.push(self.data(id).clone());
        let mut stack: Vec<(NodeId, NodeId)> = self
            .children(id)
            .iter()
            .rev()
            .map(|&child| (child, copy))
            .collect();
        while let Some((source, parent)) = stack.pop() {
            let node = self.push(self.data(source).clone());
            self.append(parent, node);
            stack.extend(self.children(source).iter().rev().map(|&child| (child, node)));
        }
        copy
    }

    /// Copy a subtree from another fragment, returning the detached copy.
    /// Importing another fragment's root yields an element-less wrapper; use
    /// [`Fragment::import_children`] for that case.
    pub fn import(&mut self, other: &Fragment, id: NodeId) -> NodeId {
        let copy = self.push(other.data(id).clone());
        let mut stack: Vec<(NodeId, NodeId)> = other
            .children(id)
            .iter()
            .rev()
            .map(|&child| (child, copy))
            .collect();
        while let Some((source, parent)) = stack.pop() {
            let node = self.push(other.data(source).clone());
            self.append(parent, node);
            stack.extend(other.children(source).iter().rev().map(|&child| (child, node)));
        }
        copy
    }

    /// Copy every child of `other`'s node `id` to the end of `parent`
    pub fn import_children(&mut self, parent: NodeId, other: &Fragment, id: NodeId) {
        for &child in other.children(id) {
            let copy = self.import(other, child);
            self.append(parent, copy);
        }
    }

    /// Replace the children of `id` with nodes parsed from `html`
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) {
        let parsed = Fragment::parse(html);
        self.clear_children(id);
        self.import_children(id, &parsed, parsed.root());
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        if let NodeData::Text(text) = self.data(id) {
            return text.clone();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|node| match self.data(node) {
                NodeData::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Serialize the children of `id`
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_html(child, &mut out);
        }
        out
    }

    /// Serialize `id` including its own tag
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    /// Serialize the whole fragment
    pub fn to_html(&self) -> String {
        self.inner_html(self.root())
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        enum Step {
            Open(NodeId),
            Close(NodeId),
        }

        let mut stack = vec![Step::Open(id)];
        while let Some(step) = stack.pop() {
            let node = match step {
                Step::Close(node) => {
                    if let Some(element) = self.element(node) {
                        out.push_str("</");
                        out.push_str(element.name());
                        out.push('>');
                    }
                    continue;
                }
                Step::Open(node) => node,
            };

            match self.data(node) {
                NodeData::Fragment => {
                    stack.extend(self.children(node).iter().rev().map(|&c| Step::Open(c)));
                }
                NodeData::Text(text) => {
                    let raw = self
                        .parent(node)
                        .and_then(|p| self.tag_name(p))
                        .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));
                    if raw {
                        out.push_str(text);
                    } else {
                        escape_text(text, out);
                    }
                }
                NodeData::Comment(text) => {
                    out.push_str("<!--");
                    out.push_str(text);
                    out.push_str("-->");
                }
                NodeData::Element(element) => {
                    element.write_start_tag(out);
                    if !element.is_void() {
                        stack.push(Step::Close(node));
                        stack.extend(self.children(node).iter().rev().map(|&c| Step::Open(c)));
                    }
                }
            }
        }
    }
}

impl Default for Fragment {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape text content for HTML output
pub fn escape_text(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

/// Escape HTML attribute value
fn escape_attr(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

/// A borrowed node with parent and sibling navigation.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    fragment: &'a Fragment,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn fragment(&self) -> &'a Fragment {
        self.fragment
    }

    pub fn is_element(&self) -> bool {
        self.fragment.element(self.id).is_some()
    }

    pub fn is_text(&self) -> bool {
        matches!(self.fragment.data(self.id), NodeData::Text(_))
    }

    /// Lowercase tag name, empty for non-elements
    pub fn tag_name(&self) -> &'a str {
        self.fragment.tag_name(self.id).unwrap_or("")
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.fragment.element(self.id)?.attr(name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.fragment.parent(self.id).map(|id| self.fragment.node(id))
    }

    /// Tag name of the parent element, if any
    pub fn parent_tag(&self) -> Option<&'a str> {
        self.fragment.parent(self.id).and_then(|id| self.fragment.tag_name(id))
    }

    /// Whether any ancestor element has the given tag
    pub fn has_ancestor(&self, tag: &str) -> bool {
        let mut current = self.parent();
        while let Some(node) = current {
            if node.tag_name() == tag {
                return true;
            }
            current = node.parent();
        }
        false
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let fragment = self.fragment;
        fragment.children(self.id).iter().map(move |&id| fragment.node(id))
    }

    pub fn element_children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.children().filter(|n| n.is_element())
    }

    pub fn first_element_child(&self) -> Option<NodeRef<'a>> {
        self.element_children().next()
    }

    fn siblings(&self) -> &'a [NodeId] {
        match self.fragment.parent(self.id) {
            Some(parent) => self.fragment.children(parent),
            None => &[],
        }
    }

    pub fn previous_sibling(&self) -> Option<NodeRef<'a>> {
        let siblings = self.siblings();
        let index = siblings.iter().position(|&id| id == self.id)?;
        index
            .checked_sub(1)
            .map(|i| self.fragment.node(siblings[i]))
    }

    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        let siblings = self.siblings();
        let index = siblings.iter().position(|&id| id == self.id)?;
        siblings.get(index + 1).map(|&id| self.fragment.node(id))
    }

    /// Position among the parent's element children (0-based)
    pub fn element_index(&self) -> usize {
        self.siblings()
            .iter()
            .filter(|&&id| self.fragment.element(id).is_some())
            .position(|&id| id == self.id)
            .unwrap_or(0)
    }

    pub fn text_content(&self) -> String {
        self.fragment.text_content(self.id)
    }

    pub fn inner_html(&self) -> String {
        self.fragment.inner_html(self.id)
    }

    pub fn outer_html(&self) -> String {
        self.fragment.outer_html(self.id)
    }
}
