//! Image layout fixes.
//!
//! The target editor strips raw `width`/`height` attributes but honors inline
//! styles, so numeric dimensions are moved into the `style` attribute.

use once_cell::sync::Lazy;
use regex::Regex;
use wxmd_dom::{Element, Fragment, NodeId};

static LEADING_INT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("valid leading integer pattern"));

/// Integer prefix of an attribute value: `"120"`, `" 120px"` and `"120.5"`
/// all give 120, `"auto"` gives `None`.
pub fn parse_dimension(value: &str) -> Option<i64> {
    LEADING_INT
        .captures(value)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Set `property` in a `style` attribute value, replacing an earlier
/// declaration of the same property.
pub fn set_style_property(style: Option<&str>, property: &str, value: &str) -> String {
    let mut declarations: Vec<(String, String)> = style
        .unwrap_or("")
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
        })
        .collect();

    match declarations
        .iter_mut()
        .find(|(name, _)| name.eq_ignore_ascii_case(property))
    {
        Some(slot) => slot.1 = value.to_string(),
        None => declarations.push((property.to_string(), value.to_string())),
    }

    declarations
        .iter()
        .map(|(name, value)| format!("{}:{}", name, value))
        .collect::<Vec<_>>()
        .join(";")
}

/// Move integer `width`/`height` attributes into inline pixel styles.
/// Returns whether anything changed.
pub fn normalize_dimensions(element: &mut Element) -> bool {
    let mut changed = false;
    for property in ["width", "height"] {
        let Some(pixels) = element.attr(property).and_then(parse_dimension) else {
            continue;
        };
        let style = set_style_property(element.attr("style"), property, &format!("{}px", pixels));
        element.set_attr("style", &style);
        element.remove_attr(property);
        changed = true;
    }
    changed
}

/// Add `class` to the image's parent element when the image is its first
/// element child.
pub fn mark_wrapper(fragment: &mut Fragment, img: NodeId, class: &str) -> bool {
    let Some(parent) = fragment.parent(img) else {
        return false;
    };
    if fragment.first_element_child(parent) != Some(img) {
        return false;
    }
    match fragment.element_mut(parent) {
        Some(element) => {
            element.add_class(class);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimension() {
        assert_eq!(parse_dimension("120"), Some(120));
        assert_eq!(parse_dimension(" 80px"), Some(80));
        assert_eq!(parse_dimension("120.5"), Some(120));
        assert_eq!(parse_dimension("auto"), None);
        assert_eq!(parse_dimension(""), None);
    }

    #[test]
    fn test_set_style_property() {
        assert_eq!(set_style_property(None, "width", "10px"), "width:10px");
        assert_eq!(
            set_style_property(Some("color: red; width: 5px;"), "width", "10px"),
            "color:red;width:10px"
        );
    }

    #[test]
    fn test_normalize_dimensions() {
        let mut img = Element::with_attrs("img", vec![("src", "a.png"), ("width", "120"), ("height", "80")]);
        assert!(normalize_dimensions(&mut img));
        assert_eq!(img.attr("style"), Some("width:120px;height:80px"));
        assert!(!img.has_attr("width"));
        assert!(!img.has_attr("height"));
    }

    #[test]
    fn test_non_numeric_dimensions_are_kept() {
        let mut img = Element::with_attrs("img", vec![("width", "100%"), ("height", "auto")]);
        assert!(normalize_dimensions(&mut img));
        assert_eq!(img.attr("style"), Some("width:100px"));
        assert_eq!(img.attr("height"), Some("auto"));

        let mut plain = Element::with_attrs("img", vec![("src", "x")]);
        assert!(!normalize_dimensions(&mut plain));
        assert!(!plain.has_attr("style"));
    }

    #[test]
    fn test_mark_wrapper_only_for_first_element_child() {
        let mut fragment = Fragment::parse(r#"<p><img src="a"></p><p>text <b>b</b><img src="b"></p>"#);
        let root = fragment.root();
        let images: Vec<NodeId> = fragment
            .descendants(root)
            .into_iter()
            .filter(|&id| fragment.tag_name(id) == Some("img"))
            .collect();
        assert!(mark_wrapper(&mut fragment, images[0], "img-wrap"));
        assert!(!mark_wrapper(&mut fragment, images[1], "img-wrap"));
        assert_eq!(
            fragment.to_html(),
            r#"<p class="img-wrap"><img src="a"></p><p>text <b>b</b><img src="b"></p>"#
        );
    }
}
