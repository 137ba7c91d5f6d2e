//! Final prop cleanup before a widget is instantiated.

use super::registry::WidgetKind;
use super::value::PropBag;

/// Removes props a widget kind must never receive.
pub trait PropSanitizer {
    fn sanitize(&self, props: PropBag, kind: WidgetKind) -> PropBag;
}

/// Strips the config-only keys the prop resolver consumes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSanitizer;

impl DefaultSanitizer {
    fn config_only_keys(kind: WidgetKind) -> &'static [&'static str] {
        match kind {
            WidgetKind::Table => &["enableFooter", "footerColumns"],
            WidgetKind::List => &["box"],
            WidgetKind::Dropdown => &["label"],
            WidgetKind::Map => &["dataSource"],
            _ => &[],
        }
    }
}

impl PropSanitizer for DefaultSanitizer {
    fn sanitize(&self, mut props: PropBag, kind: WidgetKind) -> PropBag {
        props.remove("formKeys");
        for key in Self::config_only_keys(kind) {
            props.remove(key);
        }
        props
    }
}
